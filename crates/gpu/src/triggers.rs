use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

pub const TRIGGER_RADIUS: &str = "radius";
pub const TRIGGER_COLOR: &str = "color";
pub const TRIGGER_FILTER: &str = "filter";

/// Cache-invalidation keys per GPU attribute.
///
/// Each value holds only the config fields that feed that attribute. The
/// renderer recomputes an attribute iff its value differs from the previous
/// frame's; keys are kept in a `BTreeMap` so the diff order is stable.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UpdateTriggers {
    entries: BTreeMap<String, Value>,
}

impl UpdateTriggers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Keys whose value differs from `previous`, including keys present on
    /// only one side.
    pub fn changed_since<'a>(&'a self, previous: &'a UpdateTriggers) -> Vec<&'a str> {
        let mut out: Vec<&str> = Vec::new();
        for (k, v) in &self.entries {
            if previous.entries.get(k) != Some(v) {
                out.push(k.as_str());
            }
        }
        for k in previous.entries.keys() {
            if !self.entries.contains_key(k) {
                out.push(k.as_str());
            }
        }
        out.sort_unstable();
        out
    }
}
