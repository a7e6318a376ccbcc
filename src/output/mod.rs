mod json;
mod markdown;

pub use json::report_json;
pub use markdown::markdown_table;

use crate::error::Result;
use crate::model::ScanResult;

/// Output format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `{"f-secure": ...}` JSON envelope
    Json,
    /// Markdown table
    Table,
}

impl OutputFormat {
    pub fn from_table_flag(table: bool) -> Self {
        if table {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    }
}

/// Renders the result as it is printed on stdout.
pub fn render_result(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => report_json(result),
        OutputFormat::Table => Ok(markdown_table(result)),
    }
}
