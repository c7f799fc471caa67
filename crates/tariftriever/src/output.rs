//! Plain-text rendering of resolutions and miss statistics

use std::fmt::Write;
use tariftriever_misses::MissStats;
use tariftriever_search::{Method, Resolution};

/// Longest description shown before truncating
const DESCRIPTION_WIDTH: usize = 70;

pub fn render_resolution(query: &str, resolution: &Resolution) -> String {
    let mut out = String::new();

    if resolution.is_miss() {
        let _ = writeln!(out, "No tariff code found for \"{query}\" (recorded as a miss)");
        return out;
    }

    let method = resolution.method().map_or("none", Method::as_str);
    let _ = writeln!(
        out,
        "{} result(s) for \"{query}\" via {method} (catalog generation {})",
        resolution.results.len(),
        resolution.catalog_generation
    );

    for (rank, result) in (1_usize..).zip(&resolution.results) {
        let _ = writeln!(
            out,
            "{rank:>3}. {code:<10}  {score:.3}  {confidence:<6}  {method:<8}  {description}",
            code = result.code(),
            score = result.score,
            confidence = result.confidence().to_string(),
            method = result.method.as_str(),
            description = truncate(&result.entry.description, DESCRIPTION_WIDTH),
        );
    }
    out
}

pub fn render_stats(stats: &MissStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total misses:      {}", stats.total);
    let _ = writeln!(out, "Last 7 days:       {}", stats.last_7_days);

    if !stats.by_language.is_empty() {
        let _ = writeln!(out, "\nBy language:");
        for entry in &stats.by_language {
            let _ = writeln!(out, "  {:<6} {}", entry.language, entry.count);
        }
    }

    if !stats.top_queries.is_empty() {
        let _ = writeln!(out, "\nRepeated queries:");
        for entry in &stats.top_queries {
            let _ = writeln!(out, "  {:>5}  {}", entry.count, entry.query);
        }
    }

    if !stats.recent.is_empty() {
        let _ = writeln!(out, "\nRecent:");
        for record in &stats.recent {
            let _ = writeln!(
                out,
                "  {}  [{}] {}",
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.language,
                record.query_text
            );
        }
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tariftriever_common::Language;
    use tariftriever_misses::MissRecord;
    use tariftriever_search::Query;
    use tariftriever_search::test_utils::TestHarness;

    #[tokio::test]
    async fn test_render_prefix_family() {
        let harness = TestHarness::new();
        let resolution = harness
            .resolver
            .resolve(&Query::new("020", Language::Ru))
            .await
            .unwrap();

        let text = render_resolution("020", &resolution);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.first().unwrap().starts_with("4 result(s) for \"020\" via exact"));
        assert!(lines.get(1).unwrap().contains("0201"));
        assert!(lines.get(1).unwrap().contains("0.750"));
        assert!(lines.get(4).unwrap().contains("02061000"));
    }

    #[tokio::test]
    async fn test_render_miss() {
        let harness = TestHarness::new();
        let resolution = harness
            .resolver
            .resolve(&Query::new("xyzzyqwerty", Language::Ru))
            .await
            .unwrap();

        assert_eq!(
            render_resolution("xyzzyqwerty", &resolution),
            "No tariff code found for \"xyzzyqwerty\" (recorded as a miss)\n"
        );
    }

    #[test]
    fn test_render_stats_sections() {
        let records = vec![
            MissRecord::new("кирпич", Language::Ru, None, "cli"),
            MissRecord::new("кирпич", Language::Ru, None, "cli"),
        ];
        let now = records.first().unwrap().timestamp;
        let stats = MissStats::from_records(&records, 1, now);

        let text = render_stats(&stats);
        assert!(text.contains("Total misses:      2"));
        assert!(text.contains("Repeated queries:"));
        assert!(text.contains("[ru] кирпич"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("Яблоки свежие", 7), "Яблоки…");
        assert_eq!(truncate("Чай", 7), "Чай");
    }
}
