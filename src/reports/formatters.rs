use crate::types::LcaOutcome;
use anyhow::Result;

/// Trait for report formatters
pub trait ReportFormatter {
    fn format(&self, outcome: &LcaOutcome) -> Result<String>;
}

/// One-line verdict shared by the human-readable formats
pub fn verdict(outcome: &LcaOutcome) -> String {
    match outcome.ancestor() {
        Some(ancestor) => format!(
            "The most recent common ancestor of {} and {} is {}.",
            outcome.first, outcome.second, ancestor
        ),
        None => format!("No common ancestor found for {} and {}.", outcome.first, outcome.second),
    }
}

fn or_dash<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Markdown formatter
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, outcome: &LcaOutcome) -> Result<String> {
        let (depth, candidates) = match &outcome.lca {
            Some(lca) => (lca.depth.to_string(), lca.candidates.to_string()),
            None => ("-".to_string(), "0".to_string()),
        };

        Ok(format!(
            r#"# Common Ancestor Report

**{}**

| | {} | {} |
|---|---|---|
| Root | {} | {} |
| Generations from ancestor | {} | {} |

- **Common ancestors found**: {}
- **Ancestor depth from root**: {}
- **Graph**: {} people, {} edges

---
*Generated at: {}*
"#,
            verdict(outcome),
            outcome.first,
            outcome.second,
            or_dash(&outcome.first_root),
            or_dash(&outcome.second_root),
            or_dash(&outcome.generations_first),
            or_dash(&outcome.generations_second),
            candidates,
            depth,
            outcome.node_count,
            outcome.edge_count,
            outcome.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
    }
}

/// JSON formatter
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, outcome: &LcaOutcome) -> Result<String> {
        Ok(serde_json::to_string_pretty(outcome)?)
    }
}

/// Plain text formatter
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, outcome: &LcaOutcome) -> Result<String> {
        let mut lines = vec![verdict(outcome)];

        if let Some(lca) = &outcome.lca {
            lines.push(format!(
                "Generations: {} from {}, {} from {} (depth {} from root, {} common ancestors)",
                or_dash(&outcome.generations_first),
                outcome.first,
                or_dash(&outcome.generations_second),
                outcome.second,
                lca.depth,
                lca.candidates
            ));
        }
        lines.push(format!(
            "Graph: {} people, {} edges",
            outcome.node_count, outcome.edge_count
        ));

        Ok(lines.join("\n"))
    }
}
