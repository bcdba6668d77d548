// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Structural deep merge of option objects
//!
//! Precedence: the right-hand value wins on any conflict between non-objects.
//! Two objects merge key by key, recursively. Arrays and every other
//! non-object value are replaced wholesale, never concatenated.

use serde_json::{Map, Value};

/// Deep-merge `overlay` onto `base`, returning a fresh value
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_maps(base, overlay)),
        (_, overlay) => overlay.clone(),
    }
}

/// Deep-merge a sequence of layers, lowest precedence first
pub fn deep_merge_all<'a, I>(layers: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    layers
        .into_iter()
        .fold(Value::Object(Map::new()), |acc, layer| deep_merge(&acc, layer))
}

fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let next = match merged.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
