use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::child::ChildFactory;
use crate::error::FactoryError;
use crate::param::{Instance, Param};


/// Records a type claimed by two different child factories.
///
/// Re-registering a type is not an error: the later registration takes the
/// type over and routing follows the last writer. The record is kept so
/// callers can audit routing they might otherwise depend on unknowingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCollision {
	/// The contested type identifier.
	pub ty: String,
	/// Name of the factory that previously owned the type.
	pub previous: String,
	/// Name of the factory that now owns the type.
	pub winner: String,
}

/// Central registry routing named types to the child factory that owns them.
///
/// A master cannot create anything itself: it knows which factory is
/// responsible for which type and delegates instantiation. Cloning is
/// shallow; clones share one registry.
#[derive(Clone, Default)]
pub struct MasterFactory {
	inner: Rc<MasterInner>,
}

#[derive(Default)]
struct MasterInner {
	type_map: RefCell<FxHashMap<String, Rc<dyn ChildFactory>>>,
	collisions: RefCell<Vec<TypeCollision>>,
}

impl MasterFactory {
	/// Creates a master factory with an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a non-owning handle for child back-references.
	pub fn downgrade(&self) -> WeakMaster {
		WeakMaster {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Registers a child factory and claims its declared types.
	///
	/// Fails with [`FactoryError::AlreadyRegistered`] when this exact
	/// instance is already present (identity, not structural equality) and
	/// with [`FactoryError::NoTypes`] when the factory declares nothing;
	/// either failure leaves the routing table unchanged. A type already
	/// claimed by a different factory is silently taken over (last
	/// registration wins); the take-over is logged and recorded, see
	/// [`MasterFactory::collisions`].
	pub fn register(&self, factory: Rc<dyn ChildFactory>) -> Result<(), FactoryError> {
		if self.is_registered(&factory) {
			return Err(FactoryError::AlreadyRegistered(factory.name().to_owned()));
		}

		factory.set_master(self);

		let types = factory.types();
		if types.is_empty() {
			return Err(FactoryError::NoTypes(factory.name().to_owned()));
		}

		let mut map = self.inner.type_map.borrow_mut();
		for ty in types {
			if let Some(prev) = map.insert(ty.clone(), Rc::clone(&factory))
				&& !Rc::ptr_eq(&prev, &factory)
			{
				tracing::warn!(
					"type {:?} re-registered: {:?} takes over from {:?}",
					ty,
					factory.name(),
					prev.name()
				);
				self.inner.collisions.borrow_mut().push(TypeCollision {
					ty,
					previous: prev.name().to_owned(),
					winner: factory.name().to_owned(),
				});
			}
		}

		Ok(())
	}

	/// Returns an instance of `ty` by delegating to the owning child
	/// factory, forwarding `params` unchanged.
	///
	/// Fails with [`FactoryError::CannotInstantiate`] when no factory owns
	/// `ty`. The registry borrow is released before delegating, so a child's
	/// creation routine may call back into the master to resolve its own
	/// dependencies.
	pub fn instantiate(&self, ty: &str, params: &[Param]) -> Result<Instance, FactoryError> {
		let factory = self.inner.type_map.borrow().get(ty).cloned();
		match factory {
			Some(factory) => factory.instantiate(ty, params),
			None => Err(FactoryError::CannotInstantiate(ty.to_owned())),
		}
	}

	/// All type identifiers currently routed, duplicate-free. Order is not
	/// meaningful.
	pub fn types(&self) -> Vec<String> {
		self.inner.type_map.borrow().keys().cloned().collect()
	}

	/// Returns true when `ty` has an owning factory.
	pub fn has_type(&self, ty: &str) -> bool {
		self.inner.type_map.borrow().contains_key(ty)
	}

	/// Number of routed types.
	pub fn len(&self) -> usize {
		self.inner.type_map.borrow().len()
	}

	/// Returns true if nothing has been registered yet.
	pub fn is_empty(&self) -> bool {
		self.inner.type_map.borrow().is_empty()
	}

	/// Recorded take-overs of a type by a later registration.
	pub fn collisions(&self) -> Vec<TypeCollision> {
		self.inner.collisions.borrow().clone()
	}

	/// Renders the routing table grouped by owning factory.
	pub fn describe(&self) -> String {
		self.to_string()
	}

	fn is_registered(&self, factory: &Rc<dyn ChildFactory>) -> bool {
		self.inner
			.type_map
			.borrow()
			.values()
			.any(|f| Rc::ptr_eq(f, factory))
	}
}

impl fmt::Display for MasterFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let map = self.inner.type_map.borrow();

		// Group types by owning factory instance, not by name: two distinct
		// factories may share a diagnostic name.
		let mut groups: Vec<(Rc<dyn ChildFactory>, Vec<&str>)> = Vec::new();
		for (ty, factory) in map.iter() {
			match groups.iter_mut().find(|(owner, _)| Rc::ptr_eq(owner, factory)) {
				Some((_, types)) => types.push(ty.as_str()),
				None => groups.push((Rc::clone(factory), vec![ty.as_str()])),
			}
		}
		for (_, types) in &mut groups {
			types.sort_unstable();
		}
		groups.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));

		writeln!(f, "master factory routing {} type(s)", map.len())?;
		for (factory, types) in &groups {
			writeln!(f)?;
			writeln!(f, "factory {:?} can instantiate:", factory.name())?;
			for ty in types {
				writeln!(f, "- {ty}")?;
			}
		}
		Ok(())
	}
}

/// Non-owning handle to a [`MasterFactory`].
///
/// Child factories hold one of these as their back-reference. It never keeps
/// the master alive; [`WeakMaster::upgrade`] returns `None` once the master
/// is gone.
#[derive(Clone)]
pub struct WeakMaster {
	inner: Weak<MasterInner>,
}

impl WeakMaster {
	/// Returns the master if it is still alive.
	pub fn upgrade(&self) -> Option<MasterFactory> {
		self.inner.upgrade().map(|inner| MasterFactory { inner })
	}
}
