use thiserror::Error;

/// Errors surfaced during registration and instantiation.
///
/// Every condition is synchronous and non-retryable; the library never
/// recovers on its own, callers decide whether to. Values are cheap to clone
/// and comparable so callers can match on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
	/// The requested type has no owning factory: it is unknown to the
	/// master, or unknown to a child factory with no master to ask.
	#[error("cannot instantiate type {0:?}")]
	CannotInstantiate(String),
	/// A creation routine finished without producing an instance.
	#[error("creation routine for type {0:?} did not produce an instance")]
	IllegalReturnValue(String),
	/// The same child factory instance was registered a second time.
	#[error("child factory {0:?} is already registered")]
	AlreadyRegistered(String),
	/// A child factory declared zero types at registration time.
	#[error("child factory {0:?} declares no types")]
	NoTypes(String),
	/// A creation routine received a type it does not implement. This is a
	/// bug in the concrete factory: its declared type list and its dispatch
	/// disagree.
	#[error("factory {factory:?} has no creation routine for type {ty:?}")]
	UnknownType {
		/// Name of the offending factory.
		factory: String,
		/// The type the routine could not dispatch.
		ty: String,
	},
}
