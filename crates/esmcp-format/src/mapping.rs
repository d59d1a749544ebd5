//! Mapping summaries.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Field count and type histogram over the top-level properties of a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    pub field_count: usize,
    /// Type name to occurrences, in first-seen order.
    pub field_types: IndexMap<String, usize>,
}

/// Summarize a `mappings` object. Fields without a `type` (object fields)
/// count as `unknown`.
pub fn summarize_mappings(mappings: &Value) -> MappingSummary {
    let Some(properties) = mappings.get("properties").and_then(Value::as_object) else {
        return MappingSummary::default();
    };

    let mut field_types: IndexMap<String, usize> = IndexMap::new();
    for definition in properties.values() {
        let field_type = definition
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        *field_types.entry(field_type.to_string()).or_default() += 1;
    }

    MappingSummary {
        field_count: properties.len(),
        field_types,
    }
}
