use std::cell::RefCell;

use crate::error::FactoryError;
use crate::master::{MasterFactory, WeakMaster};
use crate::param::{Instance, Param};


/// Holder for the master back-reference inside a child factory.
///
/// Concrete factories embed one of these and expose it through
/// [`ChildFactory::master_slot`]; the master writes it during registration.
/// The reference is non-owning: once every master handle is dropped, the
/// slot reads as unbound again.
#[derive(Default)]
pub struct MasterSlot(RefCell<Option<WeakMaster>>);

impl MasterSlot {
	/// Creates an empty slot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores the back-reference. A later bind replaces an earlier one.
	pub fn bind(&self, master: WeakMaster) {
		*self.0.borrow_mut() = Some(master);
	}

	/// Returns the master, if one was bound and is still alive.
	pub fn get(&self) -> Option<MasterFactory> {
		self.0.borrow().as_ref().and_then(WeakMaster::upgrade)
	}
}

/// A factory responsible for a fixed set of named types.
///
/// Implementors supply the declared type list and the creation routine; the
/// public entry point [`ChildFactory::instantiate`] is provided here and
/// handles the declared-type check, result validation, and upward delegation
/// to the registering master.
pub trait ChildFactory {
	/// Diagnostic name for this factory, used in error payloads and the
	/// master's routing-table rendering.
	fn name(&self) -> &str;

	/// Types this factory declares it can instantiate.
	///
	/// Must stay stable once the factory is registered; the master snapshots
	/// this set at registration time and never re-reads it.
	fn types(&self) -> Vec<String>;

	/// The slot holding the master back-reference.
	fn master_slot(&self) -> &MasterSlot;

	/// Creation routine for declared types.
	///
	/// `Ok(None)` means the routine produced nothing; [`instantiate`]
	/// reports that as [`FactoryError::IllegalReturnValue`]. A `ty` this
	/// factory never declared is a bug in the implementor and should be
	/// answered with [`FactoryError::UnknownType`].
	///
	/// [`instantiate`]: ChildFactory::instantiate
	fn create(&self, ty: &str, params: &[Param]) -> Result<Option<Instance>, FactoryError>;

	/// Public instantiation entry point.
	///
	/// Declared types go through [`ChildFactory::create`]; anything else is
	/// forwarded unchanged to the master. With no master bound the request
	/// fails with [`FactoryError::CannotInstantiate`].
	fn instantiate(&self, ty: &str, params: &[Param]) -> Result<Instance, FactoryError> {
		if !self.types().iter().any(|t| t == ty) {
			// we don't know this type, ask the master
			return match self.master() {
				Some(master) => master.instantiate(ty, params),
				None => Err(FactoryError::CannotInstantiate(ty.to_owned())),
			};
		}

		match self.create(ty, params)? {
			Some(instance) => Ok(instance),
			None => Err(FactoryError::IllegalReturnValue(ty.to_owned())),
		}
	}

	/// Stores the master back-reference.
	///
	/// Called exclusively by the master during registration, at most once
	/// per factory in normal operation.
	fn set_master(&self, master: &MasterFactory) {
		self.master_slot().bind(master.downgrade());
	}

	/// Returns the registering master while it is alive.
	fn master(&self) -> Option<MasterFactory> {
		self.master_slot().get()
	}
}
