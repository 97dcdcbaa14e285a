use crate::reports::formatters::{JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter};
use crate::types::LcaOutcome;
use anyhow::Result;

/// Message printed when either ancestor list could not be fetched
pub const MISSING_DATA_MESSAGE: &str = "Could not fetch family tree data for one or both individuals.";

/// Report generator for creating various output formats
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate report in the specified format
    pub fn generate(&self, outcome: &LcaOutcome, format: &str) -> Result<String> {
        let formatter: Box<dyn ReportFormatter> = match format.to_lowercase().as_str() {
            "json" => Box::new(JsonFormatter),
            "markdown" => Box::new(MarkdownFormatter),
            "text" => Box::new(TextFormatter),
            _ => return Err(anyhow::anyhow!("Unsupported format: {}", format)),
        };

        formatter.format(outcome)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
