use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Array, StringArray, TimestampMillisecondArray, UInt16Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;

use super::{check_column_order, table_file, write_atomically, Materializer, RegionFrame};
use crate::data::schema::Column;
use crate::error::{PipelineError, Result};
use crate::region::RegionInfo;

/// Writes `<dir>/<CODE>.parquet`, one typed column per canonical field.
///
/// Region code and name are stored in the file's key-value metadata.
#[derive(Debug, Clone)]
pub struct ParquetStore {
    dir: PathBuf,
}

impl ParquetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ParquetStore { dir: dir.into() }
    }
}

/// Arrow schema for a column order.
pub fn table_schema(column_order: &[Column]) -> Schema {
    Schema::new(
        column_order
            .iter()
            .map(|c| Field::new(c.name(), c.data_type(), c.nullable()))
            .collect::<Vec<_>>(),
    )
}

/// Build the Arrow array for one column of the frame.
fn column_array(frame: &RegionFrame<'_>, column: Column) -> ArrayRef {
    let records = frame.records;
    match column.data_type() {
        DataType::UInt16 => Arc::new(UInt16Array::from_iter_values(
            records.iter().map(|r| r.year),
        )),
        DataType::Float64 => Arc::new(Float64Array::from_iter(
            records.iter().map(|r| r.value(column, None).as_f64()),
        )),
        DataType::Timestamp(..) => Arc::new(
            TimestampMillisecondArray::from_iter(
                records
                    .iter()
                    .map(|r| frame.std_time(r).map(|t| t.timestamp_millis())),
            )
            .with_timezone("UTC"),
        ),
        _ => Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.value(column, None).to_string()),
        )),
    }
}

/// One record batch holding the whole frame.
pub fn record_batch(frame: &RegionFrame<'_>, column_order: &[Column]) -> Result<RecordBatch> {
    let schema = Arc::new(table_schema(column_order));
    let columns: Vec<ArrayRef> = column_order
        .iter()
        .map(|c| column_array(frame, *c))
        .collect();
    RecordBatch::try_new(schema, columns).map_err(|e| {
        PipelineError::persistence(format!("{}.parquet", frame.region.code), e)
    })
}

impl Materializer for ParquetStore {
    fn materialize(&mut self, frame: &RegionFrame<'_>, column_order: &[Column]) -> Result<()> {
        check_column_order(column_order)?;
        let path = table_file(&self.dir, frame.region, "parquet");
        let batch = record_batch(frame, column_order)?;

        let props = WriterProperties::builder()
            .set_key_value_metadata(Some(vec![
                KeyValue::new("dismap.region.code".to_string(), frame.region.code.clone()),
                KeyValue::new("dismap.region.name".to_string(), frame.region.name.clone()),
            ]))
            .build();

        write_atomically(&path, |file| {
            let fail = |e: parquet::errors::ParquetError| PipelineError::persistence(&path, e);
            let mut writer =
                ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(fail)?;
            writer.write(&batch).map_err(fail)?;
            writer.close().map_err(fail)?;
            Ok(())
        })?;

        info!("wrote {} rows to {}", frame.records.len(), path.display());
        Ok(())
    }

    fn table_path(&self, region: &RegionInfo) -> Option<PathBuf> {
        Some(table_file(&self.dir, region, "parquet"))
    }
}
