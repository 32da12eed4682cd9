//! Semicolon-delimited CSV parser for the accident extract.

use anyhow::{Context, Result};
use csv::ReaderBuilder;

/// Raw text table: headers plus rows of optional cells (`None` = empty cell).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses CSV bytes into a [`Table`].
///
/// Cells are trimmed, empty cells become `None`, and short rows are padded to
/// the header width.
///
/// # Errors
///
/// Returns an error if the header row is missing or the CSV framing is broken.
pub fn parse_table(bytes: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        anyhow::bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error on line {}", idx + 2))?;
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
            .collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    Ok(Table { headers, rows })
}
