use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use grreat::{DistrictAssignment, MetricSnapshot, OptimizerState, Termination};
use serde::Serialize;

/// Ensure that a directory exists, creating it if necessary.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// `requested`, or a fresh timestamped directory name.
pub fn output_dir(requested: Option<&Path>) -> PathBuf {
    requested.map(Path::to_path_buf).unwrap_or_else(|| {
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
        PathBuf::from(format!("output-{secs}"))
    })
}

/// Write `value` as pretty JSON to `dir/name`.
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(path)
}

/// District ids as rows of the grid, top to bottom.
pub fn district_rows(assignment: &DistrictAssignment) -> Vec<Vec<u32>> {
    assignment.assignments()
        .chunks(assignment.grid().width())
        .map(<[u32]>::to_vec)
        .collect()
}

#[derive(Serialize)]
pub struct Checkpoint {
    pub step: usize,
    pub state: OptimizerState,
    pub districts: Vec<Vec<u32>>,
    pub snapshot: MetricSnapshot,
}

#[derive(Serialize)]
pub struct RunResult<'a> {
    pub termination: Termination,
    pub steps: usize,
    pub districts: Vec<Vec<u32>>,
    pub snapshot: &'a MetricSnapshot,
}
