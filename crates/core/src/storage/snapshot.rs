use crate::domain::record::Record;
use anyhow::Context;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub const DEFAULT_OUTFILE: &str = "json_data/rhodl_daily.json";

/// Write the full record list as pretty-printed JSON, replacing whatever was at `path`.
pub fn save(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let file = fs::File::create(path)
        .with_context(|| format!("failed to create snapshot file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("failed to serialize snapshot to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush snapshot file {}", path.display()))?;
    Ok(())
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Record>> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open snapshot file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("snapshot file is not a valid record list: {}", path.display()))
}
