// src/intercept/tests.rs

use super::*;
use crate::gl::constants::{BLEND, DEPTH_TEST};
use crate::gl::SoftGl;
use test_log::test;

/// Records what behaviors saw.
#[derive(Default)]
struct Log {
    entries: Vec<String>,
}

fn interceptor() -> Interceptor<Log> {
    Interceptor::new(Box::new(SoftGl::new()))
}

fn enabled(interceptor: &mut Interceptor<Log>, cap: u32) -> bool {
    interceptor
        .api()
        .invoke("getParameter", &[Value::from(cap)])
        .unwrap()
        .truthy()
}

#[test]
fn unwrapped_calls_pass_through() {
    let mut interceptor = interceptor();
    let mut log = Log::default();
    interceptor
        .call(&mut log, "enable", &[Value::from(BLEND)])
        .unwrap();
    assert!(enabled(&mut interceptor, BLEND));
    assert!(log.entries.is_empty());
}

#[test]
fn behavior_runs_around_the_original() {
    let mut interceptor = interceptor();
    interceptor
        .wrap(
            "enable",
            behavior(|log: &mut Log, mut original, args| {
                log.entries.push(format!("before {}", original.operation()));
                let result = original.call(args)?;
                let now = original
                    .api()
                    .invoke("getParameter", &[args[0].clone()])?;
                log.entries.push(format!("after {:?}", now));
                Ok(result)
            }),
        )
        .unwrap();
    let mut log = Log::default();
    interceptor
        .call(&mut log, "enable", &[Value::from(DEPTH_TEST)])
        .unwrap();
    assert_eq!(log.entries, vec!["before enable", "after Bool(true)"]);
}

#[test]
fn behavior_may_skip_the_original() {
    let mut interceptor = interceptor();
    interceptor
        .wrap("enable", behavior(|_: &mut Log, _original, _args| Ok(Value::Null)))
        .unwrap();
    let mut log = Log::default();
    interceptor
        .call(&mut log, "enable", &[Value::from(BLEND)])
        .unwrap();
    assert!(!enabled(&mut interceptor, BLEND));
}

#[test]
fn wrapping_twice_fails() {
    let mut interceptor = interceptor();
    let noop = || behavior(|_: &mut Log, mut original, args| original.call(args));
    interceptor.wrap("disable", noop()).unwrap();
    assert!(matches!(
        interceptor.wrap("disable", noop()),
        Err(SessionError::AlreadyWrapped(ref op)) if op == "disable"
    ));
    assert!(interceptor.is_wrapped("disable"));
}

#[test]
fn unknown_operations_cannot_be_wrapped() {
    let mut interceptor = interceptor();
    let result = interceptor.wrap(
        "texImage3D",
        behavior(|_: &mut Log, mut original, args| original.call(args)),
    );
    assert!(matches!(result, Err(SessionError::NotAnOperation(_))));
    assert!(interceptor.wrapped().is_empty());
}

#[test]
fn errors_from_the_original_propagate() {
    let mut interceptor = interceptor();
    interceptor
        .wrap("enable", behavior(|_: &mut Log, mut original, args| original.call(args)))
        .unwrap();
    let mut log = Log::default();
    let err = interceptor
        .call(&mut log, "enable", &[Value::Int(7)])
        .unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));
}

#[test]
fn wrappers_are_per_interceptor() {
    let mut first = interceptor();
    let mut second = interceptor();
    first
        .wrap("enable", behavior(|_: &mut Log, _original, _args| Ok(Value::Null)))
        .unwrap();
    let mut log = Log::default();
    second
        .call(&mut log, "enable", &[Value::from(BLEND)])
        .unwrap();
    assert!(enabled(&mut second, BLEND));
    assert_eq!(first.wrapped(), vec!["enable"]);
    assert!(second.wrapped().is_empty());
}
