//! Fluent assertions with expected/received output
//!
//! ```rust,ignore
//! expect!(res.status()).to_equal(204);
//! expect!(res.json()).to_have_key("id");
//! expect!(lists).to_have_length(2);
//! ```

use serde_json::Value;
use std::fmt::Debug;

fn header(location: &str) -> String {
    format!("\nassertion failed at {}\n", location)
}

/// Wrapper created by the `expect!` macro
pub struct Expect<T> {
    value: T,
    location: &'static str,
}

impl<T> Expect<T> {
    pub fn new(value: T, location: &'static str) -> Self {
        Self { value, location }
    }
}

impl<T: Debug + PartialEq> Expect<T> {
    pub fn to_equal(&self, expected: T) {
        if self.value != expected {
            panic!(
                "{}\n  expect!(actual).to_equal(expected)\n\n  Expected: {:?}\n  Received: {:?}\n",
                header(self.location),
                expected,
                self.value
            );
        }
    }

    pub fn to_not_equal(&self, unexpected: T) {
        if self.value == unexpected {
            panic!(
                "{}\n  expect!(actual).to_not_equal(value)\n\n  Expected NOT: {:?}\n  Received: {:?}\n",
                header(self.location),
                unexpected,
                self.value
            );
        }
    }
}

impl Expect<bool> {
    pub fn to_be_true(&self) {
        if !self.value {
            panic!(
                "{}\n  expect!(value).to_be_true()\n\n  Expected: true\n  Received: false\n",
                header(self.location)
            );
        }
    }

    pub fn to_be_false(&self) {
        if self.value {
            panic!(
                "{}\n  expect!(value).to_be_false()\n\n  Expected: false\n  Received: true\n",
                header(self.location)
            );
        }
    }
}

impl<T: Debug> Expect<Option<T>> {
    pub fn to_be_some(&self) {
        if self.value.is_none() {
            panic!(
                "{}\n  expect!(option).to_be_some()\n\n  Expected: Some(_)\n  Received: None\n",
                header(self.location)
            );
        }
    }

    pub fn to_be_none(&self) {
        if let Some(v) = &self.value {
            panic!(
                "{}\n  expect!(option).to_be_none()\n\n  Expected: None\n  Received: Some({:?})\n",
                header(self.location),
                v
            );
        }
    }
}

impl<T: Debug, E: Debug> Expect<Result<T, E>> {
    pub fn to_be_ok(&self) {
        if let Err(e) = &self.value {
            panic!(
                "{}\n  expect!(result).to_be_ok()\n\n  Expected: Ok(_)\n  Received: Err({:?})\n",
                header(self.location),
                e
            );
        }
    }

    pub fn to_be_err(&self) {
        if let Ok(v) = &self.value {
            panic!(
                "{}\n  expect!(result).to_be_err()\n\n  Expected: Err(_)\n  Received: Ok({:?})\n",
                header(self.location),
                v
            );
        }
    }
}

impl Expect<String> {
    pub fn to_contain(&self, substring: &str) {
        if !self.value.contains(substring) {
            panic!(
                "{}\n  expect!(string).to_contain(substring)\n\n  Expected to contain: {:?}\n  Received: {:?}\n",
                header(self.location),
                substring,
                self.value
            );
        }
    }
}

impl<T: Debug + PartialEq> Expect<Vec<T>> {
    pub fn to_have_length(&self, expected: usize) {
        if self.value.len() != expected {
            panic!(
                "{}\n  expect!(vec).to_have_length({})\n\n  Actual length: {}\n  Received: {:?}\n",
                header(self.location),
                expected,
                self.value.len(),
                self.value
            );
        }
    }

    pub fn to_contain(&self, item: &T) {
        if !self.value.contains(item) {
            panic!(
                "{}\n  expect!(vec).to_contain(item)\n\n  Expected to contain: {:?}\n  Received: {:?}\n",
                header(self.location),
                item,
                self.value
            );
        }
    }

    pub fn to_be_empty(&self) {
        if !self.value.is_empty() {
            panic!(
                "{}\n  expect!(vec).to_be_empty()\n\n  Expected: []\n  Received: {:?}\n",
                header(self.location),
                self.value
            );
        }
    }
}

// JSON matchers, for response bodies
impl Expect<Value> {
    /// Assert that the value is an object with `key` set
    pub fn to_have_key(&self, key: &str) {
        if self.value.get(key).is_none() {
            panic!(
                "{}\n  expect!(json).to_have_key({:?})\n\n  Received: {}\n",
                header(self.location),
                key,
                self.value
            );
        }
    }

    /// Assert that the value is an object without `key`
    pub fn to_not_have_key(&self, key: &str) {
        if self.value.get(key).is_some() {
            panic!(
                "{}\n  expect!(json).to_not_have_key({:?})\n\n  Received: {}\n",
                header(self.location),
                key,
                self.value
            );
        }
    }

    /// Assert that every key/value of `subset` appears in the value
    pub fn to_contain_subset(&self, subset: Value) {
        if !contains_subset(&self.value, &subset) {
            panic!(
                "{}\n  expect!(json).to_contain_subset(subset)\n\n  Expected subset: {}\n  Received: {}\n",
                header(self.location),
                subset,
                self.value
            );
        }
    }

    /// Assert that the value is an array of `expected` items
    pub fn to_have_length(&self, expected: usize) {
        match self.value.as_array() {
            Some(items) if items.len() == expected => {}
            _ => panic!(
                "{}\n  expect!(json).to_have_length({})\n\n  Received: {}\n",
                header(self.location),
                expected,
                self.value
            ),
        }
    }
}

fn contains_subset(value: &Value, subset: &Value) -> bool {
    match (value, subset) {
        (Value::Object(have), Value::Object(want)) => want
            .iter()
            .all(|(k, v)| have.get(k).is_some_and(|h| contains_subset(h, v))),
        (have, want) => have == want,
    }
}

impl<T: Debug + PartialOrd> Expect<T> {
    pub fn to_be_greater_than(&self, expected: T) {
        if self.value <= expected {
            panic!(
                "{}\n  expect!(value).to_be_greater_than(expected)\n\n  Expected: > {:?}\n  Received: {:?}\n",
                header(self.location),
                expected,
                self.value
            );
        }
    }
}
