//! End-to-end delegation scenarios across a master and several children.

mod delegation;
