use crate::domain::record::Record;
use crate::ingest::error::RowError;
use crate::ingest::types::RhodlRow;
use crate::time::utc;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Map raw API rows to records sorted ascending by UTC date, one record per date.
///
/// Rows are keyed by date in input order, so when two rows fall on the same UTC date the later
/// one overwrites the earlier.
pub fn normalize(rows: &[Value]) -> Result<Vec<Record>, RowError> {
    let mut by_date = BTreeMap::<NaiveDate, Record>::new();

    for (index, raw) in rows.iter().enumerate() {
        let row = RhodlRow::from_value(index, raw)?;
        let date = utc::date_from_millis(row.timestamp_ms).map_err(|err| RowError {
            index,
            field: "timestamp",
            detail: err.to_string(),
        })?;

        by_date.insert(
            date,
            Record {
                date,
                value: row.rhodl_ratio,
                reference_price: row.price.unwrap_or(0.0),
                timestamp_ms: row.timestamp_ms,
            },
        );
    }

    Ok(by_date.into_values().collect())
}
