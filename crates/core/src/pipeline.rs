use crate::domain::record::Record;
use crate::ingest::normalize::normalize;
use crate::ingest::provider::RhodlSource;
use crate::ingest::types::parse_envelope;
use crate::sheets::{sink, SheetsApi};
use crate::storage::snapshot;
use anyhow::Context;
use std::future::Future;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Overwrite,
    Append,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: SyncMode,
    pub outfile: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub rows_written: usize,
}

/// Fetch, normalize, persist locally, then sync the worksheet. Stops at the first error.
///
/// `connect` runs only after the snapshot is on disk, so a failed login still leaves the fresh
/// JSON behind.
pub async fn run_pipeline<S, F, Fut>(
    source: &dyn RhodlSource,
    connect: F,
    opts: &RunOptions,
) -> anyhow::Result<RunSummary>
where
    S: SheetsApi,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<S>>,
{
    let records = fetch_and_save(source, &opts.outfile).await?;
    let sheets = connect().await?;
    let rows_written = sync_worksheet(&sheets, opts.mode, &records).await?;
    Ok(RunSummary {
        records: records.len(),
        rows_written,
    })
}

/// Fetch and normalize the series, then write the local snapshot.
pub async fn fetch_and_save(
    source: &dyn RhodlSource,
    outfile: &Path,
) -> anyhow::Result<Vec<Record>> {
    let records = fetch_records(source).await?;

    snapshot::save(outfile, &records)?;
    tracing::info!(
        rows = records.len(),
        path = %outfile.display(),
        "saved snapshot"
    );
    Ok(records)
}

/// Write `records` into columns A/B of the target worksheet using `mode`.
pub async fn sync_worksheet(
    sheets: &dyn SheetsApi,
    mode: SyncMode,
    records: &[Record],
) -> anyhow::Result<usize> {
    let ws = sink::open_target_worksheet(sheets).await?;
    let n = match mode {
        SyncMode::Overwrite => {
            let n = sink::overwrite_columns(sheets, &ws, records).await?;
            tracing::info!(rows = n, worksheet = %ws.title, "overwrote columns A/B");
            n
        }
        SyncMode::Append => {
            let n = sink::append_missing(sheets, &ws, records).await?;
            tracing::info!(added = n, worksheet = %ws.title, "appended new rows to columns A/B");
            n
        }
    };
    Ok(n)
}

async fn fetch_records(source: &dyn RhodlSource) -> anyhow::Result<Vec<Record>> {
    let raw = source.fetch_rhodl().await?;
    let rows = parse_envelope(raw)?;
    let records = normalize(&rows)
        .with_context(|| format!("failed to normalize {} response", source.provider_name()))?;
    tracing::debug!(raw_rows = rows.len(), records = records.len(), "normalized rows");
    Ok(records)
}
