//! Text rendering of cluster responses.

use std::fmt;

use serde_json::Value;

use esmcp_core::{Hit, IndexStats, Result, SearchResponse};

use crate::pagination::IndexPage;

/// Separator between the header and each hit block of a search.
const HIT_SEPARATOR: &str = "\n\n---\n\n";

/// Separator between highlighted fragments of one field.
const FRAGMENT_SEPARATOR: &str = " ... ";

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Bytes as MiB with two decimals, e.g. `2.00`.
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MIB)
}

/// Bytes as MiB rounded to two decimals.
pub fn round_mib(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MIB * 100.0).round() / 100.0
}

/// Header line plus JSON digest of one catalog page.
pub fn render_index_page(page: &IndexPage) -> Result<String> {
    if page.total_indices == 0 {
        return Ok("No indices found.".to_string());
    }

    Ok(format!(
        "Found {} indices (page {} of {}, showing {})\n\n{}",
        page.total_indices,
        page.current_page,
        page.total_pages,
        page.indices_on_page,
        serde_json::to_string_pretty(page)?
    ))
}

pub fn render_mappings(index: &str, mappings: &Value) -> Result<String> {
    Ok(format!(
        "Mappings for index: {}\n\n{}",
        index,
        serde_json::to_string_pretty(mappings)?
    ))
}

/// Render a DSL search: a summary line, then one block per hit with
/// highlighted fields first and the remaining source fields after.
pub fn render_search(response: &SearchResponse, from: impl fmt::Display) -> Result<String> {
    let total = response
        .total()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut blocks = Vec::with_capacity(response.hits.hits.len() + 1);
    blocks.push(format!(
        "Total results: {}, showing {} from position {}",
        total,
        response.hits.hits.len(),
        from
    ));

    for hit in &response.hits.hits {
        blocks.push(render_hit(hit)?);
    }

    Ok(blocks.join(HIT_SEPARATOR))
}

fn render_hit(hit: &Hit) -> Result<String> {
    let mut lines = Vec::new();

    for (field, fragments) in &hit.highlight {
        if !fragments.is_empty() {
            lines.push(format!(
                "{} (highlighted): {}",
                field,
                fragments.join(FRAGMENT_SEPARATOR)
            ));
        }
    }

    for (field, value) in &hit.source {
        if !hit.highlight.contains_key(field) {
            lines.push(format!("{}: {}", field, serde_json::to_string(value)?));
        }
    }

    Ok(lines.join("\n"))
}

/// Render a query-string search as a numbered list, continuing the
/// numbering from `from`.
pub fn render_query_string_results(
    response: &SearchResponse,
    from: u64,
    size: u64,
) -> Result<String> {
    let total = response.total().unwrap_or(response.hits.hits.len() as u64);
    if total == 0 {
        return Ok("Found 0 documents.\n".to_string());
    }

    let mut out = format!(
        "Found {} documents. Showing {}-{}:\n\n",
        total,
        from.saturating_add(1),
        from.saturating_add(size).min(total)
    );

    for (i, hit) in response.hits.hits.iter().enumerate() {
        let score = hit
            .score
            .map(|s| Value::from(s).to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let position = from.saturating_add(i as u64).saturating_add(1);
        out.push_str(&format!("Result {}. Score: {}\n", position, score));
        out.push_str(&format!("ID: {}\n", hit.id));
        out.push_str("Content:\n");
        out.push_str(&serde_json::to_string_pretty(&Value::Object(hit.source.clone()))?);
        out.push_str("\n\n");
    }

    Ok(out)
}

pub fn render_index_stats(index: &str, stats: &IndexStats) -> String {
    format!(
        "Statistics for index: {}\n\n\
         Documents: {}\n\
         Size: {} MB\n\
         Indexing operations: {}\n\
         Search operations: {}\n",
        index,
        stats.docs_count,
        format_mib(stats.size_in_bytes),
        stats.index_total,
        stats.query_total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{paginate_indices, PageRequest};
    use esmcp_core::IndexDescriptor;
    use serde_json::{json, Map};

    fn source(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_mib_formatting() {
        assert_eq!(format_mib(2_097_152), "2.00");
        assert_eq!(format_mib(0), "0.00");
        assert_eq!(round_mib(1_572_864), 1.5);
        assert_eq!(round_mib(1_000_000), 0.95);
    }

    #[test]
    fn test_index_stats() {
        let stats = IndexStats {
            docs_count: 25,
            size_in_bytes: 2_097_152,
            index_total: 30,
            query_total: 4,
        };
        let text = render_index_stats("articles", &stats);
        assert!(text.starts_with("Statistics for index: articles\n\n"));
        assert!(text.contains("Documents: 25\n"));
        assert!(text.contains("Size: 2.00 MB\n"));
        assert!(text.contains("Indexing operations: 30\n"));
        assert!(text.contains("Search operations: 4\n"));
    }

    #[test]
    fn test_highlighted_hit() {
        let hit = Hit::new(
            "1",
            2.5,
            source(&[("title", json!("Rust in action")), ("price", json!(39.5))]),
        )
        .with_highlight(
            "title",
            vec!["<em>Rust</em> in".to_string(), "in <em>action</em>".to_string()],
        );
        let response = SearchResponse::from_hits(1, vec![hit]);

        let text = render_search(&response, 0).unwrap();
        let blocks: Vec<&str> = text.split(HIT_SEPARATOR).collect();
        assert_eq!(blocks[0], "Total results: 1, showing 1 from position 0");
        assert_eq!(
            blocks[1],
            "title (highlighted): <em>Rust</em> in ... in <em>action</em>\nprice: 39.5"
        );
        assert!(!text.contains("title: "));
    }

    #[test]
    fn test_search_total_forms() {
        let scalar: SearchResponse =
            serde_json::from_value(json!({"hits": {"total": 3, "hits": []}})).unwrap();
        assert!(render_search(&scalar, 5)
            .unwrap()
            .starts_with("Total results: 3, showing 0 from position 5"));

        let missing: SearchResponse = serde_json::from_value(json!({"hits": {"hits": []}})).unwrap();
        assert!(render_search(&missing, 0)
            .unwrap()
            .starts_with("Total results: unknown"));
    }

    #[test]
    fn test_empty_highlight_is_skipped() {
        let hit = Hit::new("1", 1.0, source(&[("title", json!("x")), ("n", json!(1))]))
            .with_highlight("title", Vec::new());
        let text = render_hit(&hit).unwrap();
        assert_eq!(text, "n: 1");
    }

    #[test]
    fn test_query_string_results() {
        let hits = vec![
            Hit::new("a", 1.0, source(&[("title", json!("first"))])),
            Hit::new("b", 0.5, source(&[("title", json!("second"))])),
        ];
        let response = SearchResponse::from_hits(12, hits);

        let text = render_query_string_results(&response, 10, 2).unwrap();
        assert!(text.starts_with("Found 12 documents. Showing 11-12:\n\n"));
        assert!(text.contains("Result 11. Score: 1.0\nID: a\nContent:\n"));
        assert!(text.contains("Result 12. Score: 0.5\nID: b\n"));
        assert!(text.contains("\"title\": \"second\""));
    }

    #[test]
    fn test_query_string_results_far_offset() {
        let hits = vec![Hit::new("a", 1.0, source(&[("title", json!("first"))]))];
        let response = SearchResponse::from_hits(1, hits);

        let text = render_query_string_results(&response, u64::MAX, u64::MAX).unwrap();
        assert!(text.starts_with(&format!("Found 1 documents. Showing {}-1:", u64::MAX)));
        assert!(text.contains(&format!("Result {}. Score: 1.0", u64::MAX)));
    }

    #[test]
    fn test_query_string_no_results() {
        let response = SearchResponse::from_hits(0, Vec::new());
        assert_eq!(
            render_query_string_results(&response, 0, 10).unwrap(),
            "Found 0 documents.\n"
        );
    }

    #[test]
    fn test_index_page() {
        let indices = vec![IndexDescriptor::new("articles", 25, "12kb")];
        let page = paginate_indices(indices, PageRequest::from_raw(None, None, 10));
        let text = render_index_page(&page).unwrap();

        assert!(text.starts_with("Found 1 indices (page 1 of 1, showing 1)\n\n"));
        let digest: Value = serde_json::from_str(text.split_once("\n\n").unwrap().1).unwrap();
        assert_eq!(digest["indices"][0]["index"], json!("articles"));
        assert_eq!(digest["indices"][0]["docs_count"], json!(25));

        let empty = paginate_indices(Vec::new(), PageRequest::from_raw(None, None, 10));
        assert_eq!(render_index_page(&empty).unwrap(), "No indices found.");
    }

    #[test]
    fn test_mappings() {
        let text = render_mappings("articles", &json!({"properties": {}})).unwrap();
        assert!(text.starts_with("Mappings for index: articles\n\n{"));
    }
}
