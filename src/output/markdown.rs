use crate::model::ScanResult;
use tabled::{settings::Style, Table, Tabled};

const HEADING: &str = "#### F-Secure";

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Infected")]
    infected: bool,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Engine")]
    engine: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

/// Renders the result as a Markdown section.
///
/// The `Result` column carries the Aquarius verdict only.
pub fn markdown_table(result: &ScanResult) -> String {
    let row = ResultRow {
        infected: result.infected(),
        result: result.findings().aquarius.clone(),
        engine: result.engine().to_string(),
        updated: result.updated().to_string(),
    };

    let table = Table::new([row]).with(Style::markdown()).to_string();
    format!("{}\n{}", HEADING, table)
}
