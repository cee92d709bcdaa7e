use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use super::model::SurveyRecord;
use super::schema::{is_missing_token, Column, ColumnType, RAW_SCHEMA};
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one region's CSV into survey records, in file order.
///
/// Layout: UTF-8, comma-delimited, header row with the lowercase names in
/// [`RAW_SCHEMA`]. Extra columns are ignored; a missing one is an error.
/// Only the raw fields are filled in, derived fields stay at their defaults.
pub fn load_csv(path: &Path) -> Result<Vec<SurveyRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PipelineError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => PipelineError::malformed(path, format!("cannot open: {e}")),
    })?;

    let records = read_records(file, path)?;
    info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse survey records from any reader. `source` only labels errors.
pub fn read_records<R: Read>(input: R, source: &Path) -> Result<Vec<SurveyRecord>> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::malformed(source, format!("reading CSV header: {e}")))?
        .clone();
    let layout = HeaderLayout::resolve(&headers, source)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let line = row_no as u64 + 1;
        let row = result.map_err(|e| PipelineError::MalformedInput {
            path: source.to_path_buf(),
            line: Some(line),
            column: None,
            message: e.to_string(),
        })?;
        records.push(layout.parse_row(&row, line, source)?);
    }

    debug!("{}: {} data rows", source.display(), records.len());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Position of every schema column within the file's header.
struct HeaderLayout {
    positions: [usize; RAW_SCHEMA.len()],
}

impl HeaderLayout {
    fn resolve(headers: &StringRecord, source: &Path) -> Result<Self> {
        let mut positions = [0usize; RAW_SCHEMA.len()];
        let mut missing = Vec::new();

        for (slot, raw) in positions.iter_mut().zip(RAW_SCHEMA.iter()) {
            match headers.iter().position(|h| h.trim() == raw.header) {
                Some(idx) => *slot = idx,
                None => missing.push(raw.header),
            }
        }

        if !missing.is_empty() {
            return Err(PipelineError::malformed(
                source,
                format!("CSV missing required column(s): {}", missing.join(", ")),
            ));
        }
        Ok(HeaderLayout { positions })
    }

    fn parse_row(&self, row: &StringRecord, line: u64, source: &Path) -> Result<SurveyRecord> {
        let mut rec = SurveyRecord::default();

        for (&idx, raw) in self.positions.iter().zip(RAW_SCHEMA.iter()) {
            let cell = row.get(idx).unwrap_or("");
            let bad = |message: String| PipelineError::MalformedInput {
                path: source.to_path_buf(),
                line: Some(line),
                column: Some(raw.column.name().to_string()),
                message,
            };

            match raw.ty {
                ColumnType::Text => set_text(&mut rec, raw.column, cell),
                ColumnType::UInt16 => {
                    rec.year = parse_u16(cell).map_err(bad)?;
                }
                ColumnType::Float64 => {
                    let v = parse_f64(cell).map_err(bad)?;
                    set_float(&mut rec, raw.column, v);
                }
            }
        }
        Ok(rec)
    }
}

// -- cell coercion helpers --

fn set_text(rec: &mut SurveyRecord, column: Column, cell: &str) {
    let value = cell.to_string();
    match column {
        Column::Region => rec.region = value,
        Column::SampleId => rec.sample_id = value,
        Column::Species => rec.species = value,
        Column::CommonName => rec.common_name = value,
        Column::Stratum => rec.stratum = value,
        _ => {}
    }
}

fn set_float(rec: &mut SurveyRecord, column: Column, v: Option<f64>) {
    match column {
        Column::Wtcpue => rec.wtcpue = v,
        Column::StratumArea => rec.stratum_area = v,
        Column::Latitude => rec.latitude = v,
        Column::Longitude => rec.longitude = v,
        Column::Depth => rec.depth = v,
        _ => {}
    }
}

fn parse_u16(cell: &str) -> std::result::Result<u16, String> {
    if is_missing_token(cell) {
        return Err("value is required".to_string());
    }
    cell.trim()
        .parse::<u16>()
        .map_err(|_| format!("'{cell}' is not an unsigned 16-bit integer"))
}

/// Missing tokens become `None`; `inf`/`-inf` parse and are left for the
/// normalizer to sanitize.
fn parse_f64(cell: &str) -> std::result::Result<Option<f64>, String> {
    if is_missing_token(cell) {
        return Ok(None);
    }
    cell.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("'{cell}' is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "region,sampleid,year,spp,wtcpue,common,stratum,stratumarea,lat,lon,depth\n";

    fn read(body: &str) -> Result<Vec<SurveyRecord>> {
        read_records(body.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn reads_and_renames_columns() {
        let csv = format!(
            "{HEADER}Aleutian Islands,AI-1,2010,Gadus chalcogrammus,12.5,walleye pollock,211,4000.5,52.1,-175.2,120\n"
        );
        let recs = read(&csv).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.region, "Aleutian Islands");
        assert_eq!(r.sample_id, "AI-1");
        assert_eq!(r.year, 2010);
        assert_eq!(r.species, "Gadus chalcogrammus");
        assert_eq!(r.common_name, "walleye pollock");
        assert_eq!(r.wtcpue, Some(12.5));
        assert_eq!(r.stratum, "211");
        assert_eq!(r.stratum_area, Some(4000.5));
        assert_eq!(r.latitude, Some(52.1));
        assert_eq!(r.longitude, Some(-175.2));
        assert_eq!(r.depth, Some(120.0));
        assert!(r.species_common_name.is_empty());
    }

    #[test]
    fn header_order_is_free_and_extras_ignored() {
        let csv = "depth,lon,lat,stratumarea,stratum,common,wtcpue,spp,year,sampleid,region,haulid\n\
                   80,-90.1,28.2,10,A,red snapper,3,Lutjanus campechanus,2015,G-7,Gulf of Mexico,x\n";
        let recs = read(csv).unwrap();
        assert_eq!(recs[0].year, 2015);
        assert_eq!(recs[0].species, "Lutjanus campechanus");
        assert_eq!(recs[0].depth, Some(80.0));
    }

    #[test]
    fn missing_column_is_malformed() {
        let csv = "region,sampleid,year,spp,common,stratum,stratumarea,lat,lon,depth\n";
        match read(csv) {
            Err(PipelineError::MalformedInput { message, .. }) => {
                assert!(message.contains("wtcpue"), "{message}");
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_wtcpue_is_malformed() {
        let csv = format!("{HEADER}AI,1,2010,A b,heavy,c,1,1,1,1,1\n");
        match read(&csv) {
            Err(PipelineError::MalformedInput { line, column, .. }) => {
                assert_eq!(line, Some(1));
                assert_eq!(column.as_deref(), Some("WTCPUE"));
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn year_out_of_range_is_malformed() {
        let csv = format!("{HEADER}AI,1,70000,A b,1,c,1,1,1,1,1\n");
        assert!(matches!(
            read(&csv),
            Err(PipelineError::MalformedInput { .. })
        ));
    }

    #[test]
    fn missing_year_is_malformed() {
        let csv = format!("{HEADER}AI,1,NA,A b,1,c,1,1,1,1,1\n");
        assert!(matches!(
            read(&csv),
            Err(PipelineError::MalformedInput { .. })
        ));
    }

    #[test]
    fn infinity_and_missing_floats() {
        let csv = format!(
            "{HEADER}AI,1,2010,A b,inf,Na,1,NA,,1,1\nAI,2,2010,A b,-inf,c,1,1,1,1,NaN\n"
        );
        let recs = read(&csv).unwrap();
        assert_eq!(recs[0].wtcpue, Some(f64::INFINITY));
        assert_eq!(recs[0].stratum_area, None);
        assert_eq!(recs[0].latitude, None);
        assert_eq!(recs[0].common_name, "Na");
        assert_eq!(recs[1].wtcpue, Some(f64::NEG_INFINITY));
        assert_eq!(recs[1].depth, None);
    }

    #[test]
    fn ragged_row_is_malformed() {
        let csv = format!("{HEADER}AI,1,2010\n");
        assert!(matches!(
            read(&csv),
            Err(PipelineError::MalformedInput { line: Some(1), .. })
        ));
    }

    #[test]
    fn absent_file_is_missing() {
        let err = load_csv(Path::new("/nonexistent/dir/AI.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingFile { .. }));
    }
}
