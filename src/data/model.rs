use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::schema::Column;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the materialized table
// ---------------------------------------------------------------------------

/// A typed cell, as handed to a store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    UInt(u16),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::UInt(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Timestamp(t) => {
                write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            // Empty cell, so CSV readers see a null rather than a literal.
            FieldValue::Null => Ok(()),
        }
    }
}

impl FieldValue {
    /// Numeric view, for float columns.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::UInt(i) => Some(f64::from(*i)),
            _ => None,
        }
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(FieldValue::Null, FieldValue::Float)
    }
}

// ---------------------------------------------------------------------------
// CoreSpecies flag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CoreSpecies {
    Yes,
    #[default]
    No,
}

impl CoreSpecies {
    pub fn as_str(self) -> &'static str {
        match self {
            CoreSpecies::Yes => "Yes",
            CoreSpecies::No => "No",
        }
    }
}

impl From<bool> for CoreSpecies {
    fn from(core: bool) -> Self {
        if core {
            CoreSpecies::Yes
        } else {
            CoreSpecies::No
        }
    }
}

impl fmt::Display for CoreSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SurveyRecord – one row of a region's catch data
// ---------------------------------------------------------------------------

/// One trawl-survey catch record.
///
/// The loader fills the raw fields; the derived ones (`species_common_name`,
/// `common_name_species`, `wtcpue_cube_root`) stay empty until
/// [`normalize`](super::normalize::normalize) runs, and `core_species` is only
/// meaningful after [`classify`](super::classify::classify).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurveyRecord {
    pub region: String,
    pub sample_id: String,
    pub year: u16,
    /// Scientific name. Never absent; a missing name is the empty string.
    pub species: String,
    pub common_name: String,
    /// Weight catch-per-unit-effort. `None` is missing, never zero.
    pub wtcpue: Option<f64>,
    pub stratum: String,
    pub stratum_area: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth: Option<f64>,

    pub species_common_name: String,
    pub common_name_species: String,
    pub core_species: CoreSpecies,
    pub wtcpue_cube_root: Option<f64>,
}

impl SurveyRecord {
    /// Cell for `column`. `std_time` is supplied by the caller since it is a
    /// function of the region table, not of the record.
    pub fn value(&self, column: Column, std_time: Option<DateTime<Utc>>) -> FieldValue {
        match column {
            Column::Region => FieldValue::Text(self.region.clone()),
            Column::SampleId => FieldValue::Text(self.sample_id.clone()),
            Column::Species => FieldValue::Text(self.species.clone()),
            Column::CommonName => FieldValue::Text(self.common_name.clone()),
            Column::SpeciesCommonName => FieldValue::Text(self.species_common_name.clone()),
            Column::CommonNameSpecies => FieldValue::Text(self.common_name_species.clone()),
            Column::CoreSpecies => FieldValue::Text(self.core_species.to_string()),
            Column::Year => FieldValue::UInt(self.year),
            Column::StdTime => std_time.map_or(FieldValue::Null, FieldValue::Timestamp),
            Column::Wtcpue => self.wtcpue.into(),
            Column::WtcpueCubeRoot => self.wtcpue_cube_root.into(),
            Column::Stratum => FieldValue::Text(self.stratum.clone()),
            Column::StratumArea => self.stratum_area.into(),
            Column::Depth => self.depth.into(),
            Column::Latitude => self.latitude.into(),
            Column::Longitude => self.longitude.into(),
        }
    }
}
