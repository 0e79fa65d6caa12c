//! Typed trait mocks generated by `#[mockable]`.

use feta::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: u32,
    name: String,
}

#[mockable]
pub trait UserStore {
    fn find(&self, id: u32) -> Option<User>;
    fn rename(&self, id: u32, name: &str) -> bool;
    fn count(&self) -> usize;
    fn clear(&self);
}

struct InMemory {
    users: Vec<User>,
}

impl UserStore for InMemory {
    fn find(&self, id: u32) -> Option<User> {
        self.users.iter().find(|user| user.id == id).cloned()
    }

    fn rename(&self, id: u32, name: &str) -> bool {
        self.find(id).is_some() && !name.is_empty()
    }

    fn count(&self) -> usize {
        self.users.len()
    }

    fn clear(&self) {}
}

#[mockable(FakeClock)]
pub trait Clock {
    fn now_ms(&self) -> u64;
}

fn store() -> InMemory {
    InMemory {
        users: vec![User {
            id: 1,
            name: "ada".to_string(),
        }],
    }
}

/// Code under test, written against the trait
fn greeting(store: &dyn UserStore, id: u32) -> String {
    match store.find(id) {
        Some(user) => format!("Hello {}", user.name),
        None => "Hello stranger".to_string(),
    }
}

#[test]
fn registered_object_delegates_to_real_impl() {
    let store = UserStoreMock::from_object(UserStoreMock::register(store()));
    assert_eq!(store.count(), 1);
    assert!(store.rename(1, "grace"));
    assert!(!store.rename(2, "grace"));
    assert_eq!(greeting(&store, 1), "Hello ada");
    store.clear();
}

#[test]
fn stubbed_method_drives_code_under_test() {
    let store = UserStoreMock::from_object(mock(&UserStoreMock::register(store())));
    when(store.object(), "find")
        .assert_params([7])
        .then_return(json!({"id": 7, "name": "lin"}));

    assert_eq!(greeting(&store, 7), "Hello lin");
    assert_eq!(store.object().call_count("find"), Some(1));
}

#[test]
#[should_panic(expected = "method count was called but never mocked")]
fn unstubbed_trait_method_panics() {
    let store = UserStoreMock::from_object(mock(&UserStoreMock::register(store())));
    let _ = store.count();
}

#[test]
#[should_panic(expected = "Assertion error")]
fn rejected_arguments_panic() {
    let store = UserStoreMock::new();
    when(store.object(), "rename")
        .assert_params([json!(1), json!("grace")])
        .then_return(true);
    store.rename(1, "hopper");
}

#[test]
fn restore_returns_to_real_impl() {
    let store = UserStoreMock::from_object(mock(&UserStoreMock::register(store())));
    when(store.object(), "count").then_return(99);
    assert_eq!(store.count(), 99);

    restore(store.object()).unwrap();
    assert_eq!(store.count(), 1);
}

#[test]
fn blank_mock_with_void_method() {
    let store = UserStoreMock::default();
    when(store.object(), "clear").then_return_void();
    store.clear();
    store.clear();
    assert_eq!(store.object().call_count("clear"), Some(2));
    restore(store.object()).unwrap();
}

#[test]
fn custom_mock_name() {
    let clock = FakeClock::new();
    when(clock.object(), "now_ms").then_return(1_000);
    assert_eq!(clock.now_ms(), 1_000);
}

#[test]
fn registered_object_label() {
    assert_eq!(UserStoreMock::register(store()).label(), "user_store");
}
