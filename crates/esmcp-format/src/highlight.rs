//! Highlight field selection.

use serde_json::{json, Map, Value};
use tracing::debug;

pub const PRE_TAG: &str = "<em>";
pub const POST_TAG: &str = "</em>";

const VECTOR_TYPE: &str = "dense_vector";

/// Top-level fields worth highlighting: free-text fields and fields that
/// carry a vector sub-field. Returned in mapping order.
pub fn highlight_fields(mappings: &Value) -> Vec<String> {
    let Some(properties) = mappings.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    let fields: Vec<String> = properties
        .iter()
        .filter(|(_, definition)| is_highlightable(definition))
        .map(|(name, _)| name.clone())
        .collect();

    debug!("Highlighting {} of {} fields", fields.len(), properties.len());
    fields
}

fn is_highlightable(definition: &Value) -> bool {
    if definition.get("type").and_then(Value::as_str) == Some("text") {
        return true;
    }
    if definition.get(VECTOR_TYPE).is_some() {
        return true;
    }
    definition
        .get("fields")
        .and_then(Value::as_object)
        .is_some_and(|sub| {
            sub.values()
                .any(|d| d.get("type").and_then(Value::as_str) == Some(VECTOR_TYPE))
        })
}

/// The `highlight` request block for `fields`, or `None` when there is
/// nothing to highlight.
pub fn highlight_block(fields: &[String]) -> Option<Value> {
    if fields.is_empty() {
        return None;
    }

    let field_map: Map<String, Value> = fields
        .iter()
        .map(|f| (f.clone(), Value::Object(Map::new())))
        .collect();

    Some(json!({
        "fields": field_map,
        "pre_tags": [PRE_TAG],
        "post_tags": [POST_TAG],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_vector_fields() {
        let mappings = json!({
            "properties": {
                "title": {"type": "text"},
                "sku": {"type": "keyword"},
                "embedding_holder": {"type": "object", "dense_vector": {"dims": 3}},
                "summary": {
                    "type": "keyword",
                    "fields": {"vec": {"type": "dense_vector", "dims": 384}}
                },
                "price": {"type": "float"}
            }
        });

        assert_eq!(
            highlight_fields(&mappings),
            vec!["title", "embedding_holder", "summary"]
        );
    }

    #[test]
    fn test_no_highlightable_fields() {
        let mappings = json!({"properties": {"sku": {"type": "keyword"}, "price": {"type": "float"}}});
        let fields = highlight_fields(&mappings);
        assert!(fields.is_empty());
        assert!(highlight_block(&fields).is_none());

        assert!(highlight_fields(&json!({})).is_empty());
    }

    #[test]
    fn test_highlight_block_shape() {
        let block = highlight_block(&["title".to_string()]).unwrap();
        assert_eq!(
            block,
            json!({
                "fields": {"title": {}},
                "pre_tags": ["<em>"],
                "post_tags": ["</em>"]
            })
        );
    }
}
