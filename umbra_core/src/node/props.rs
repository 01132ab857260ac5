// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed props objects and the untyped property bags they are parsed from.
//!
//! The core never looks inside a [`Props`] value. Two nodes have "the same
//! props" when they share the same [`SharedProps`] allocation; everything else
//! is the business of the component descriptor that produced them.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// An immutable, typed properties object produced by a component descriptor.
pub trait Props: Any + Send + Sync + fmt::Debug {}

/// Reference-counted handle to a props object.
pub type SharedProps = Arc<dyn Props>;

/// Returns the concrete props behind `props` if it is a `T`.
#[must_use]
pub fn downcast_props<T: Props>(props: &SharedProps) -> Option<&T> {
    let any: &dyn Any = props.as_ref();
    any.downcast_ref::<T>()
}

/// Untyped key/value properties as delivered by the declarative layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawProps(Map<String, Value>);

impl RawProps {
    /// Creates an empty property bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    /// Returns `true` if no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `key` as a number.
    #[must_use]
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Returns `key` as a boolean.
    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Returns `key` as a string.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns a bag where the entries of `patch` override the entries of
    /// `self`. A `null` in the patch removes the key.
    #[must_use]
    pub fn merged(&self, patch: &Self) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in &patch.0 {
            if value.is_null() {
                merged.remove(key);
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }
        Self(merged)
    }

    /// Returns the bag as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Value> for RawProps {
    /// Non-object values produce an empty bag.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}
