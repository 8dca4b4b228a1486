// src/registry/tests.rs

use super::*;
use test_log::test;

fn registry() -> ObjectRegistry<()> {
    ObjectRegistry::new()
}

#[test]
fn resolve_after_register_returns_the_name() {
    let mut reg = registry();
    let h = Handle::new(1);
    reg.register(h, "tex", ElementId(7), ()).unwrap();
    let record = reg.resolve(h).unwrap();
    assert_eq!(record.name, "tex");
    assert_eq!(record.display, ElementId(7));
    assert!(!record.deleted);
    assert_eq!(reg.len(), 1);
}

#[test]
fn resolve_of_unknown_handle_fails() {
    let reg = registry();
    assert_eq!(
        reg.resolve(Handle::new(3)).unwrap_err(),
        RegistryError::UnknownHandle(Handle::new(3))
    );
}

#[test]
fn duplicate_registration_fails() {
    let mut reg = registry();
    let h = Handle::new(0);
    reg.register(h, "a", ElementId(0), ()).unwrap();
    assert_eq!(
        reg.register(h, "b", ElementId(1), ()).unwrap_err(),
        RegistryError::DuplicateHandle(h)
    );
    assert_eq!(reg.resolve(h).unwrap().name, "a");
}

#[test]
fn unregister_hides_the_record() {
    let mut reg = registry();
    let h = Handle::new(2);
    reg.register(h, "buf", ElementId(4), ()).unwrap();
    assert_eq!(reg.unregister(h).unwrap(), ElementId(4));
    assert_eq!(
        reg.resolve(h).unwrap_err(),
        RegistryError::UnknownHandle(h)
    );
    assert!(reg.is_empty());
    // Names stay available for anything still displaying the handle.
    assert_eq!(reg.name_of(h).as_deref(), Some("buf"));
}

#[test]
fn second_unregister_fails() {
    let mut reg = registry();
    let h = Handle::new(2);
    reg.register(h, "buf", ElementId(4), ()).unwrap();
    reg.unregister(h).unwrap();
    assert_eq!(
        reg.unregister(h).unwrap_err(),
        RegistryError::AlreadyDeleted(h)
    );
    assert_eq!(
        reg.unregister(Handle::new(9)).unwrap_err(),
        RegistryError::UnknownHandle(Handle::new(9))
    );
}

#[test]
fn deleted_handle_can_be_registered_again() {
    let mut reg = registry();
    let h = Handle::new(5);
    reg.register(h, "old", ElementId(1), ()).unwrap();
    reg.unregister(h).unwrap();
    reg.register(h, "new", ElementId(2), ()).unwrap();
    assert_eq!(reg.resolve(h).unwrap().name, "new");
}

#[test]
fn live_records_come_in_handle_order() {
    let mut reg = registry();
    for (i, name) in ["c", "a", "b"].iter().enumerate().rev() {
        reg.register(Handle::new(i as u32), name, ElementId(i as u32), ())
            .unwrap();
    }
    reg.unregister(Handle::new(1)).unwrap();
    let names: Vec<&str> = reg.live().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["c", "b"]);
}
