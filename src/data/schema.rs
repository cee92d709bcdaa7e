use std::fmt;

use arrow::datatypes::{DataType, TimeUnit};

// ---------------------------------------------------------------------------
// Raw input schema: lowercase CSV header → canonical column + declared type
// ---------------------------------------------------------------------------

/// Declared storage type of a raw CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    UInt16,
    Float64,
}

/// One entry of the raw schema.
#[derive(Debug, Clone, Copy)]
pub struct RawColumn {
    pub header: &'static str,
    pub column: Column,
    pub ty: ColumnType,
}

/// Every column a region CSV must carry. Header order in the file is free.
pub const RAW_SCHEMA: [RawColumn; 11] = [
    RawColumn { header: "region", column: Column::Region, ty: ColumnType::Text },
    RawColumn { header: "sampleid", column: Column::SampleId, ty: ColumnType::Text },
    RawColumn { header: "year", column: Column::Year, ty: ColumnType::UInt16 },
    RawColumn { header: "spp", column: Column::Species, ty: ColumnType::Text },
    RawColumn { header: "wtcpue", column: Column::Wtcpue, ty: ColumnType::Float64 },
    RawColumn { header: "common", column: Column::CommonName, ty: ColumnType::Text },
    RawColumn { header: "stratum", column: Column::Stratum, ty: ColumnType::Text },
    RawColumn { header: "stratumarea", column: Column::StratumArea, ty: ColumnType::Float64 },
    RawColumn { header: "lat", column: Column::Latitude, ty: ColumnType::Float64 },
    RawColumn { header: "lon", column: Column::Longitude, ty: ColumnType::Float64 },
    RawColumn { header: "depth", column: Column::Depth, ty: ColumnType::Float64 },
];

/// Cell spellings that mean "no value" in the survey exports.
pub const MISSING_TOKENS: [&str; 6] = ["", "Na", "NA", "NaN", "nan", "N/A"];

pub fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.contains(&s.trim())
}

// ---------------------------------------------------------------------------
// Canonical output columns
// ---------------------------------------------------------------------------

/// A column of the materialized survey table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Region,
    SampleId,
    Species,
    CommonName,
    SpeciesCommonName,
    CommonNameSpecies,
    CoreSpecies,
    Year,
    StdTime,
    Wtcpue,
    WtcpueCubeRoot,
    Stratum,
    StratumArea,
    Depth,
    Latitude,
    Longitude,
}

/// Field order applied to every materialized table.
pub const CANONICAL_ORDER: [Column; 16] = [
    Column::Region,
    Column::SampleId,
    Column::Species,
    Column::CommonName,
    Column::SpeciesCommonName,
    Column::CommonNameSpecies,
    Column::CoreSpecies,
    Column::Year,
    Column::StdTime,
    Column::Wtcpue,
    Column::WtcpueCubeRoot,
    Column::Stratum,
    Column::StratumArea,
    Column::Depth,
    Column::Latitude,
    Column::Longitude,
];

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Region => "Region",
            Column::SampleId => "SampleID",
            Column::Species => "Species",
            Column::CommonName => "CommonName",
            Column::SpeciesCommonName => "SpeciesCommonName",
            Column::CommonNameSpecies => "CommonNameSpecies",
            Column::CoreSpecies => "CoreSpecies",
            Column::Year => "Year",
            Column::StdTime => "StdTime",
            Column::Wtcpue => "WTCPUE",
            Column::WtcpueCubeRoot => "WTCPUECubeRoot",
            Column::Stratum => "Stratum",
            Column::StratumArea => "StratumArea",
            Column::Depth => "Depth",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        CANONICAL_ORDER.iter().copied().find(|c| c.name() == name)
    }

    /// Arrow type used when the column is written to Parquet.
    pub fn data_type(self) -> DataType {
        match self {
            Column::Year => DataType::UInt16,
            Column::StdTime => DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
            Column::Wtcpue
            | Column::WtcpueCubeRoot
            | Column::StratumArea
            | Column::Depth
            | Column::Latitude
            | Column::Longitude => DataType::Float64,
            _ => DataType::Utf8,
        }
    }

    /// Whether the column may hold missing values in storage.
    pub fn nullable(self) -> bool {
        matches!(self.data_type(), DataType::Float64 | DataType::Timestamp(..))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_roundtrip() {
        for col in CANONICAL_ORDER {
            assert_eq!(Column::from_name(col.name()), Some(col));
        }
        assert_eq!(Column::from_name("wtcpue"), None);
    }

    #[test]
    fn raw_schema_renames() {
        let renamed: Vec<&str> = RAW_SCHEMA.iter().map(|r| r.column.name()).collect();
        assert_eq!(
            renamed,
            [
                "Region", "SampleID", "Year", "Species", "WTCPUE", "CommonName", "Stratum",
                "StratumArea", "Latitude", "Longitude", "Depth"
            ]
        );
    }

    #[test]
    fn missing_tokens() {
        assert!(is_missing_token("Na"));
        assert!(is_missing_token(" "));
        assert!(!is_missing_token("Nautilus"));
    }
}
