use std::sync::Arc;

use wirebox::prelude::*;
use wirebox::{Injectable, submit_definition};

#[derive(Injectable)]
struct Clock;

#[derive(Injectable)]
struct Scheduler {
    clock: Arc<Clock>,
    #[inject(value = "tickMillis")]
    tick: u64,
}

submit_definition!(Clock);
submit_definition!(Scheduler);

#[test]
fn submitted_definitions_are_collected() {
    let keys: Vec<TypeKey> = wirebox::submission::submitted()
        .iter()
        .map(Definition::key)
        .collect();

    assert_eq!(keys.len(), 2);
    assert!(keys.contains(&TypeKey::of::<Clock>()));
    assert!(keys.contains(&TypeKey::of::<Scheduler>()));
}

#[test]
fn submitted_definitions_build() {
    let mut container = Container::new();
    container
        .register_value("tickMillis", 250u64)
        .unwrap()
        .register_submitted()
        .unwrap();
    assert_eq!(container.definition_count(), 2);

    let store = container.build().unwrap();
    let scheduler = store.resolve::<Scheduler>().unwrap();

    assert_eq!(scheduler.tick, 250);
    assert!(Arc::ptr_eq(&scheduler.clock, &store.get::<Clock>().unwrap()));
    assert_eq!(store.generation_of::<Scheduler>(), Some(2));
}

#[test]
fn submitted_and_explicit_registration_do_not_duplicate() {
    let mut container = Container::new();
    container
        .register_value("tickMillis", 10u64)
        .unwrap()
        .register::<Clock>()
        .unwrap()
        .register_submitted()
        .unwrap();

    assert_eq!(container.definition_count(), 2);
    assert_eq!(container.build().unwrap().len(), 2);
}
