use crate::sheets::range::A1Range;
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod error;
pub mod google;
pub mod range;
pub mod sink;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetRef {
    pub title: String,
}

/// A single written cell. Numbers stay numbers on the sheet; everything else is text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// The spreadsheet operations the sink relies on. All writes use RAW input.
#[async_trait::async_trait]
pub trait SheetsApi: Send + Sync {
    async fn find_worksheet(&self, title: &str) -> Result<Option<WorksheetRef>>;

    async fn add_worksheet(&self, title: &str, rows: u32, cols: u32) -> Result<WorksheetRef>;

    /// Displayed values of a single column, top to bottom. Trailing empty cells are omitted.
    async fn column_values(&self, range: &A1Range) -> Result<Vec<String>>;

    async fn update(&self, range: &A1Range, rows: &[Vec<CellValue>]) -> Result<()>;

    /// Clear values in `range` only; formatting and cells outside the range are untouched.
    async fn clear(&self, range: &A1Range) -> Result<()>;

    /// Append `rows` after the last non-empty row of the table inside `range`, overwriting
    /// empty cells rather than inserting sheet rows.
    async fn append(&self, range: &A1Range, rows: &[Vec<CellValue>]) -> Result<()>;
}
