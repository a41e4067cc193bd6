//! Declarative dot-path field mapper
//!
//! Resolves `MappingRule` dot-paths against a source document with an
//! explicit iterative walk. Resolution short-circuits to the rule's default
//! (or null) on any missing intermediate segment; it never fails and never
//! omits a target field.

use serde_json::{Map, Value};
use syncbridge_domain::{MappingRule, MappingSet};

/// Resolve a dot-path against `source`.
///
/// Each segment steps into an object field; numeric segments additionally
/// index into arrays. Any missing segment, null intermediate, or type
/// mismatch short-circuits to `None`.
#[must_use]
pub fn resolve_path<'a>(source: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = source;

    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Apply an ordered rule set to `source`, producing the target document.
///
/// Later rules targeting the same field overwrite earlier ones (the set is
/// ordered by design). Unresolvable paths fall back to the rule default or
/// null.
#[must_use]
pub fn apply_rules(source: &Value, rules: &[MappingRule]) -> Value {
    let mut target = Map::with_capacity(rules.len());

    for rule in rules {
        let value = resolve_path(source, &rule.source_field)
            .cloned()
            .or_else(|| rule.default_value.clone())
            .unwrap_or(Value::Null);
        target.insert(rule.target_field.clone(), value);
    }

    Value::Object(target)
}

/// Apply a configured rule set to `source`.
#[must_use]
pub fn apply_set(source: &Value, set: &MappingSet) -> Value {
    apply_rules(source, &set.rules)
}
