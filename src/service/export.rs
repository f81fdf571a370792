use std::str::FromStr;

use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::models::ambassadormodel::RankedAmbassador;

pub const CSV_HEADERS: [&str; 6] = ["Rank", "Name", "Handle", "Country", "Invites", "Score"];
pub const CSV_FILENAME: &str = "ambassador-leaderboard.csv";

/// Which rows an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    /// Every row passing the current filter, in sort order.
    #[default]
    All,
    /// Only the rows on the current page.
    Page,
}

impl FromStr for ExportScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ExportScope::All),
            "page" => Ok(ExportScope::Page),
            other => Err(format!("Unknown export scope: {}", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// Fields containing commas, quotes or newlines are quoted; inner quotes are doubled.
pub fn leaderboard_to_csv(rows: &[RankedAmbassador]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        let amb = &row.ambassador;
        writer.write_record([
            row.rank.to_string(),
            amb.name.clone(),
            amb.handle.clone(),
            amb.country.clone(),
            amb.invites.to_string(),
            amb.score.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    let mut csv = String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))?;
    // no trailing newline after the last record
    if csv.ends_with('\n') {
        csv.pop();
    }
    Ok(csv)
}
