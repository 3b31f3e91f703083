//! Delegating object instantiation.
//!
//! A [`MasterFactory`] is a registry mapping named types to the
//! [`ChildFactory`] responsible for them. Callers request instances from the
//! master; the master routes each request to the owning child. A child asked
//! for a type it does not declare delegates back up to its master, so one
//! factory's creation routine can depend on types owned by another.
//!
//! - [`ChildFactory`] - the capability contract concrete factories implement
//! - [`MasterFactory`] - the central registry and dispatcher
//! - [`Param`] / [`Instance`] - constructor parameters and opaque results
//! - [`FactoryError`] - registration and instantiation failures
//!
//! Registration is one-time and append-only: factories are constructed
//! independently, registered exactly once, and the routing table only grows
//! for the life of the master. Everything is single-threaded and
//! synchronous; callers that share a master across threads add their own
//! synchronization.

mod child;
mod error;
mod master;
mod param;

pub use child::{ChildFactory, MasterSlot};
pub use error::FactoryError;
pub use master::{MasterFactory, TypeCollision, WeakMaster};
pub use param::{Instance, Param};

#[cfg(test)]
mod tests;
