use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::data::classify::CoreSpeciesRule;
use crate::data::filter::SelectedSpecies;
use crate::error::{PipelineError, Result};
use crate::region::{RegionInfo, RegionTable};

/// Storage format of the materialized tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything a run needs. Built once, then passed by reference to each stage.
///
/// ```toml
/// input_dir = "data/csv"
/// output_dir = "out"
/// format = "parquet"
/// core_species_rule = "any-catch"
/// filter_species = true
/// regions = ["AI", "GMEX"]
///
/// [selected_species]
/// "Lutjanus campechanus" = "red snapper"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub filter_species: bool,
    pub selected_species: SelectedSpecies,
    pub core_species_rule: CoreSpeciesRule,
    /// Region codes to process, in order. Empty means every known region.
    pub regions: Vec<String>,
    pub custom_regions: Vec<RegionInfo>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("out"),
            format: OutputFormat::default(),
            filter_species: false,
            selected_species: SelectedSpecies::new(),
            core_species_rule: CoreSpeciesRule::default(),
            regions: Vec::new(),
            custom_regions: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Read a TOML config. Relative directories are resolved against the
    /// config file's own directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("reading {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml(&text)?;

        if let Some(base) = path.parent() {
            config.input_dir = base.join(&config.input_dir);
            config.output_dir = base.join(&config.output_dir);
        }
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the custom regions. An empty allow-list with the filter on is
    /// allowed and yields zero-row tables.
    pub fn validate(&self) -> Result<()> {
        if self.filter_species && self.selected_species.is_empty() {
            warn!("filter_species is on but selected_species is empty, every table will be empty");
        }
        self.region_table().map(|_| ())
    }

    pub fn region_table(&self) -> Result<RegionTable> {
        RegionTable::with_overrides(&self.custom_regions)
    }

    /// Regions to process, resolved against the table, in configured order.
    /// A code listed twice is processed once, at its first position.
    pub fn selected_regions<'t>(&self, table: &'t RegionTable) -> Result<Vec<&'t RegionInfo>> {
        if self.regions.is_empty() {
            return Ok(table.iter().collect());
        }
        let mut seen = BTreeSet::new();
        let mut selected = Vec::with_capacity(self.regions.len());
        for code in &self.regions {
            if !seen.insert(code.as_str()) {
                warn!("region {code} is listed more than once, processing it once");
                continue;
            }
            selected.push(table.get(code)?);
        }
        Ok(selected)
    }

    pub fn input_path(&self, region: &RegionInfo) -> PathBuf {
        self.input_dir.join(format!("{}.csv", region.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config.format, OutputFormat::Parquet);
        assert_eq!(config.core_species_rule, CoreSpeciesRule::AnyCatch);
        assert!(!config.filter_species);
        assert!(config.regions.is_empty());
    }

    #[test]
    fn full_config() {
        let config = PipelineConfig::from_toml(
            r#"
            input_dir = "csv"
            output_dir = "tables"
            format = "csv"
            core_species_rule = "positive-catch"
            filter_species = true
            regions = ["GMEX", "AI"]

            [selected_species]
            "Lutjanus campechanus" = "red snapper"

            [[custom_regions]]
            code = "GMEX_F"
            name = "Gulf of Mexico Fall"
            month = 10
            day = 15
            utc_offset_hours = -6
            "#,
        )
        .unwrap();

        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.core_species_rule, CoreSpeciesRule::PositiveCatch);
        assert_eq!(
            config.selected_species.get("Lutjanus campechanus").map(String::as_str),
            Some("red snapper")
        );

        let table = config.region_table().unwrap();
        assert!(table.get("GMEX_F").is_ok());
        let codes: Vec<&str> = config
            .selected_regions(&table)
            .unwrap()
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(codes, ["GMEX", "AI"]);
        assert_eq!(
            config.input_path(table.get("AI").unwrap()),
            PathBuf::from("csv/AI.csv")
        );
    }

    #[test]
    fn filter_with_empty_allow_list_is_accepted() {
        let config = PipelineConfig::from_toml("filter_species = true").unwrap();
        assert!(config.filter_species);
        assert!(config.selected_species.is_empty());
    }

    #[test]
    fn invalid_custom_region_is_rejected() {
        let err = PipelineConfig::from_toml(
            r#"
            [[custom_regions]]
            code = "XX"
            name = "Nowhere"
            month = 2
            day = 30
            utc_offset_hours = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn duplicate_regions_are_selected_once() {
        let config =
            PipelineConfig::from_toml(r#"regions = ["GMEX", "AI", "GMEX", "AI"]"#).unwrap();
        let table = config.region_table().unwrap();
        let codes: Vec<&str> = config
            .selected_regions(&table)
            .unwrap()
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(codes, ["GMEX", "AI"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PipelineConfig::from_toml("filter_speces = true").is_err());
    }

    #[test]
    fn unknown_selected_region() {
        let config = PipelineConfig::from_toml(r#"regions = ["AI", "MARS"]"#).unwrap();
        let table = config.region_table().unwrap();
        assert!(matches!(
            config.selected_regions(&table),
            Err(PipelineError::UnknownRegion(_))
        ));
    }
}
