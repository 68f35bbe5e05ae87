// Copyright 2025 Cowboy AI, LLC.

//! Per-instance field storage

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde_json::Value;

/// Named fields of one constructed instance
///
/// Locks are held only for the duration of a single accessor, so member
/// bodies may freely call back into the composite while reading or writing.
#[derive(Debug, Default)]
pub struct InstanceState {
    fields: RwLock<BTreeMap<String, Value>>,
}

impl InstanceState {
    /// Create state from initial field values
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields: RwLock::new(fields),
        }
    }

    /// Read a field
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    /// Write a field, returning the previous value
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.write().insert(name.into(), value)
    }

    /// Update a field in place; missing fields start as `Value::Null`
    pub fn update<F>(&self, name: &str, f: F) -> Value
    where
        F: FnOnce(&mut Value),
    {
        let mut fields = self.fields.write();
        let slot = fields.entry(name.to_string()).or_insert(Value::Null);
        f(slot);
        slot.clone()
    }

    /// Copy of every field
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.fields.read().clone()
    }

    /// Whether a field exists
    pub fn contains(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_update() {
        let state = InstanceState::new(BTreeMap::from([("count".to_string(), json!(1))]));
        assert_eq!(state.get("count"), Some(json!(1)));
        assert_eq!(state.set("count", json!(2)), Some(json!(1)));

        let updated = state.update("count", |v| *v = json!(v.as_i64().unwrap_or(0) + 10));
        assert_eq!(updated, json!(12));

        let fresh = state.update("missing", |v| {
            assert!(v.is_null());
            *v = json!("x");
        });
        assert_eq!(fresh, json!("x"));
        assert!(state.contains("missing"));
        assert_eq!(state.snapshot().len(), 2);
    }
}
