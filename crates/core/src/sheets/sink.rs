use crate::domain::record::Record;
use crate::sheets::range::A1Range;
use crate::sheets::{CellValue, SheetsApi, WorksheetRef};
use anyhow::{Context, Result};
use std::collections::HashSet;

pub const WORKSHEET_TITLE: &str = "RHODL Ratio Raw Data";
pub const HEADER: [&str; 2] = ["Date", "RHODL Ratio"];

const NEW_WORKSHEET_ROWS: u32 = 1000;
const NEW_WORKSHEET_COLS: u32 = 26;

const DATE_COL: u32 = 0;
const VALUE_COL: u32 = 1;

/// Find the target worksheet, creating it with a header row when it does not exist yet.
pub async fn open_target_worksheet(api: &dyn SheetsApi) -> Result<WorksheetRef> {
    if let Some(ws) = api
        .find_worksheet(WORKSHEET_TITLE)
        .await
        .context("failed to look up target worksheet")?
    {
        return Ok(ws);
    }

    tracing::info!(title = WORKSHEET_TITLE, "worksheet missing; creating it");
    let ws = api
        .add_worksheet(WORKSHEET_TITLE, NEW_WORKSHEET_ROWS, NEW_WORKSHEET_COLS)
        .await
        .context("failed to create target worksheet")?;
    write_header(api, &ws).await?;
    Ok(ws)
}

/// Replace columns A/B with the header plus every record. Other columns are left as they are.
pub async fn overwrite_columns(
    api: &dyn SheetsApi,
    ws: &WorksheetRef,
    records: &[Record],
) -> Result<usize> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header_row());
    rows.extend(records.iter().map(record_row));

    api.clear(&A1Range::columns(&ws.title, DATE_COL, VALUE_COL))
        .await
        .context("failed to clear columns A:B")?;

    let end_row = rows.len() as u32;
    api.update(
        &A1Range::cells(&ws.title, DATE_COL, 1, VALUE_COL, end_row),
        &rows,
    )
    .await
    .context("failed to write columns A:B")?;

    Ok(records.len())
}

/// Append records whose date is not yet present in column A. Returns the number of rows added.
pub async fn append_missing(
    api: &dyn SheetsApi,
    ws: &WorksheetRef,
    records: &[Record],
) -> Result<usize> {
    let existing = api
        .column_values(&A1Range::columns(&ws.title, DATE_COL, DATE_COL))
        .await
        .context("failed to read existing dates")?;

    let existing_dates: HashSet<&str> = if existing.is_empty() {
        write_header(api, ws).await?;
        HashSet::new()
    } else {
        // First cell is the header.
        existing[1..]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    };

    let new_rows: Vec<Vec<CellValue>> = records
        .iter()
        .filter(|r| !existing_dates.contains(r.date_key().as_str()))
        .map(record_row)
        .collect();

    if !new_rows.is_empty() {
        api.append(&A1Range::columns(&ws.title, DATE_COL, VALUE_COL), &new_rows)
            .await
            .context("failed to append rows to columns A:B")?;
    }
    Ok(new_rows.len())
}

async fn write_header(api: &dyn SheetsApi, ws: &WorksheetRef) -> Result<()> {
    api.update(
        &A1Range::cells(&ws.title, DATE_COL, 1, VALUE_COL, 1),
        &[header_row()],
    )
    .await
    .context("failed to write header row")
}

fn header_row() -> Vec<CellValue> {
    HEADER.iter().map(|h| CellValue::text(*h)).collect()
}

fn record_row(r: &Record) -> Vec<CellValue> {
    vec![CellValue::Text(r.date_key()), CellValue::Number(r.value)]
}
