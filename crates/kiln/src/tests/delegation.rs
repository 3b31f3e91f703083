use std::cell::RefCell;
use std::rc::Rc;

use crate::{ChildFactory, FactoryError, Instance, MasterFactory, MasterSlot, Param};

/// Plain service with no required constructor parameters.
#[derive(Debug, Clone, PartialEq)]
struct ServiceA {
	label: String,
}

/// Composite service built around a [`ServiceA`] resolved through the master.
#[derive(Debug, Clone, PartialEq)]
struct ServiceB {
	a: ServiceA,
	count: i64,
}

#[derive(Debug, PartialEq)]
struct ServiceX {
	serial: u32,
}

struct LibraryFactory {
	master: MasterSlot,
}

impl LibraryFactory {
	fn new() -> Rc<Self> {
		Rc::new(Self {
			master: MasterSlot::new(),
		})
	}
}

impl ChildFactory for LibraryFactory {
	fn name(&self) -> &str {
		"library"
	}

	fn types(&self) -> Vec<String> {
		vec!["library_a".to_owned(), "library_b".to_owned()]
	}

	fn master_slot(&self) -> &MasterSlot {
		&self.master
	}

	fn create(&self, ty: &str, params: &[Param]) -> Result<Option<Instance>, FactoryError> {
		match ty {
			"library_a" => Ok(Some(Box::new(ServiceA {
				label: params
					.first()
					.and_then(Param::as_str)
					.unwrap_or("default")
					.to_owned(),
			}))),
			"library_b" => {
				// resolve the component through the master, so that another
				// factory could just as well own it
				let master = match self.master() {
					Some(master) => master,
					None => return Err(FactoryError::CannotInstantiate(ty.to_owned())),
				};
				let a = master.instantiate("library_a", &[])?;
				let a = match a.downcast::<ServiceA>() {
					Ok(a) => *a,
					Err(_) => {
						return Err(FactoryError::IllegalReturnValue("library_a".to_owned()));
					}
				};
				Ok(Some(Box::new(ServiceB {
					a,
					count: params.first().and_then(Param::as_int).unwrap_or(0),
				})))
			}
			_ => Err(FactoryError::UnknownType {
				factory: self.name().to_owned(),
				ty: ty.to_owned(),
			}),
		}
	}
}

struct FrameworkFactory {
	master: MasterSlot,
	built: RefCell<u32>,
}

impl FrameworkFactory {
	fn new() -> Rc<Self> {
		Rc::new(Self {
			master: MasterSlot::new(),
			built: RefCell::new(0),
		})
	}
}

impl ChildFactory for FrameworkFactory {
	fn name(&self) -> &str {
		"framework"
	}

	fn types(&self) -> Vec<String> {
		vec!["framework_x".to_owned()]
	}

	fn master_slot(&self) -> &MasterSlot {
		&self.master
	}

	fn create(&self, ty: &str, _params: &[Param]) -> Result<Option<Instance>, FactoryError> {
		match ty {
			"framework_x" => {
				let mut built = self.built.borrow_mut();
				*built += 1;
				Ok(Some(Box::new(ServiceX { serial: *built })))
			}
			_ => Err(FactoryError::UnknownType {
				factory: self.name().to_owned(),
				ty: ty.to_owned(),
			}),
		}
	}
}

#[test]
fn master_routes_across_factories() {
	let master = MasterFactory::new();
	let library = LibraryFactory::new();
	let framework = FrameworkFactory::new();
	master.register(Rc::clone(&library) as Rc<dyn ChildFactory>).unwrap();
	master.register(Rc::clone(&framework) as Rc<dyn ChildFactory>).unwrap();

	let mut types = master.types();
	types.sort_unstable();
	assert_eq!(types, ["framework_x", "library_a", "library_b"]);

	// routing through the master matches asking the owner directly
	let params = [Param::Str("svc".to_owned())];
	let direct = library.instantiate("library_a", &params).unwrap();
	let routed = master.instantiate("library_a", &params).unwrap();
	assert_eq!(
		routed.downcast_ref::<ServiceA>(),
		direct.downcast_ref::<ServiceA>()
	);
}

#[test]
fn composite_type_resolves_its_dependency_through_the_master() {
	let master = MasterFactory::new();
	master.register(LibraryFactory::new()).unwrap();

	let instance = master.instantiate("library_b", &[Param::Int(5)]).unwrap();
	let b = instance.downcast_ref::<ServiceB>().unwrap();
	assert_eq!(b.count, 5);
	assert_eq!(
		b.a,
		ServiceA {
			label: "default".to_owned(),
		}
	);
}

#[test]
fn child_forwards_foreign_types_to_the_master() {
	let master = MasterFactory::new();
	let framework = FrameworkFactory::new();
	master.register(LibraryFactory::new()).unwrap();
	master.register(Rc::clone(&framework) as Rc<dyn ChildFactory>).unwrap();

	// framework never declared library_a; the request comes back through
	// the master to the library factory
	let instance = framework.instantiate("library_a", &[]).unwrap();
	assert!(instance.downcast_ref::<ServiceA>().is_some());
}

#[test]
fn each_request_constructs_a_fresh_instance() {
	let master = MasterFactory::new();
	master.register(FrameworkFactory::new()).unwrap();

	let first = master.instantiate("framework_x", &[]).unwrap();
	let second = master.instantiate("framework_x", &[]).unwrap();
	assert_eq!(first.downcast_ref::<ServiceX>().unwrap().serial, 1);
	assert_eq!(second.downcast_ref::<ServiceX>().unwrap().serial, 2);
}

#[test]
fn unregistered_composite_dependency_surfaces_the_failure() {
	// a library factory that never met a master cannot resolve the
	// dependency of its composite type
	let library = LibraryFactory::new();

	let result = library.instantiate("library_b", &[]);
	assert!(matches!(
		result,
		Err(FactoryError::CannotInstantiate(ty)) if ty == "library_b"
	));
}
