use crate::{clean::CleanTable, query::Query};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Write `table` as `<dir>/<MM-DD-YYYY>.csv`, creating `dir` if needed.
pub fn write_csv(table: &CleanTable, dir: &Path, query: &Query) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {:?}", dir))?;
    let path = dir.join(format!("{}.csv", query.file_stem()));

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(&table.headers)
        .context("writing header row")?;
    for (i, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .with_context(|| format!("writing row {}", i + 1))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    info!(path = %path.display(), rows = table.rows.len(), "wrote floorsheet");
    Ok(path)
}
