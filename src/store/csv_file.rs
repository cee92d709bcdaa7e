use std::path::PathBuf;

use log::info;

use super::{check_column_order, table_file, write_atomically, Materializer, RegionFrame};
use crate::data::schema::Column;
use crate::error::{PipelineError, Result};
use crate::region::RegionInfo;

/// Writes `<dir>/<CODE>.csv` with a header row of canonical column names.
///
/// Missing values are empty cells; `StdTime` is RFC 3339 in UTC.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvStore { dir: dir.into() }
    }
}

impl Materializer for CsvStore {
    fn materialize(&mut self, frame: &RegionFrame<'_>, column_order: &[Column]) -> Result<()> {
        check_column_order(column_order)?;
        let path = table_file(&self.dir, frame.region, "csv");

        write_atomically(&path, |file| {
            let fail = |e: csv::Error| PipelineError::persistence(&path, e);
            let mut writer = csv::Writer::from_writer(file);

            writer
                .write_record(column_order.iter().map(|c| c.name()))
                .map_err(fail)?;
            for rec in frame.records {
                let std_time = frame.std_time(rec);
                writer
                    .write_record(column_order.iter().map(|c| rec.value(*c, std_time).to_string()))
                    .map_err(fail)?;
            }
            writer
                .flush()
                .map_err(|e| PipelineError::persistence(&path, e))
        })?;

        info!("wrote {} rows to {}", frame.records.len(), path.display());
        Ok(())
    }

    fn table_path(&self, region: &RegionInfo) -> Option<PathBuf> {
        Some(table_file(&self.dir, region, "csv"))
    }
}
