use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized RHODL observation.
///
/// On disk the fields keep the upstream names (`rhodl_ratio`, `price`) so snapshots written by
/// earlier runs stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// UTC calendar date derived from `timestamp_ms`.
    pub date: NaiveDate,
    #[serde(rename = "rhodl_ratio")]
    pub value: f64,
    #[serde(rename = "price")]
    pub reference_price: f64,
    pub timestamp_ms: i64,
}

impl Record {
    /// Date in the `YYYY-MM-DD` form used as the sheet key.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
