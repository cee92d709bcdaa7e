//! Table stores: where a classified region ends up.
//!
//! Every store receives the whole region at once and either writes all of
//! it or nothing. File-backed stores stage into a temporary file beside the
//! target and rename it into place only after the last byte is written.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::data::model::SurveyRecord;
use crate::data::schema::Column;
use crate::error::{PipelineError, Result};
use crate::region::RegionInfo;

pub mod csv_file;
pub mod memory;
pub mod parquet_file;

pub use csv_file::CsvStore;
pub use memory::MemoryStore;
pub use parquet_file::ParquetStore;

// ---------------------------------------------------------------------------
// RegionFrame – what a store is handed
// ---------------------------------------------------------------------------

/// A region's normalized, classified records plus the region they belong to.
#[derive(Debug, Clone, Copy)]
pub struct RegionFrame<'a> {
    pub region: &'a RegionInfo,
    pub records: &'a [SurveyRecord],
}

impl<'a> RegionFrame<'a> {
    pub fn new(region: &'a RegionInfo, records: &'a [SurveyRecord]) -> Self {
        RegionFrame { region, records }
    }

    /// `StdTime` for one record, derived from the region and its year.
    pub fn std_time(&self, record: &SurveyRecord) -> Option<DateTime<Utc>> {
        self.region.std_time(record.year)
    }
}

// ---------------------------------------------------------------------------
// Materializer trait
// ---------------------------------------------------------------------------

/// Persists one region's table with the requested column order.
///
/// Implementations must not leave a partial table behind on failure, and
/// must not retry.
pub trait Materializer {
    fn materialize(&mut self, frame: &RegionFrame<'_>, column_order: &[Column]) -> Result<()>;

    /// Where the region's table lands, if it is a file.
    fn table_path(&self, _region: &RegionInfo) -> Option<PathBuf> {
        None
    }
}

/// Reject empty or duplicated column orders before anything is written.
pub fn check_column_order(column_order: &[Column]) -> Result<()> {
    if column_order.is_empty() {
        return Err(PipelineError::Config("column order is empty".into()));
    }
    let mut seen = BTreeSet::new();
    for col in column_order {
        if !seen.insert(*col) {
            return Err(PipelineError::Config(format!(
                "column {col} appears more than once in the column order"
            )));
        }
    }
    Ok(())
}

/// `<dir>/<CODE>.<ext>`
pub(crate) fn table_file(dir: &Path, region: &RegionInfo, extension: &str) -> PathBuf {
    dir.join(format!("{}.{extension}", region.code))
}

/// Stage `write` into a temp file next to `path`, then rename over `path`.
///
/// On any error the temp file is dropped (and deleted) and `path` is left
/// as it was.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    stage(path, write)?.commit()
}

/// A fully written temp file waiting to be renamed onto its target.
///
/// Dropping it without `commit` deletes the temp file.
#[derive(Debug)]
pub(crate) struct Staged {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl Staged {
    pub(crate) fn target(&self) -> &Path {
        &self.target
    }

    pub(crate) fn commit(self) -> Result<()> {
        let target = self.target;
        self.tmp
            .persist(&target)
            .map_err(|e| PipelineError::persistence(&target, e.error))?;
        Ok(())
    }
}

/// Write into a temp file in `path`'s directory and sync it, without
/// touching `path` itself.
pub(crate) fn stage<F>(path: &Path, write: F) -> Result<Staged>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| PipelineError::persistence(path, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PipelineError::persistence(path, e))?;
    write(tmp.as_file_mut())?;
    tmp.flush().map_err(|e| PipelineError::persistence(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PipelineError::persistence(path, e))?;
    Ok(Staged {
        tmp,
        target: path.to_path_buf(),
    })
}
