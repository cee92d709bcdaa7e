//! Core-species classification.
//!
//! A species is *core* for a region when it was caught in every year the
//! region was surveyed. Two readings of "caught" are supported, see
//! [`CoreSpeciesRule`].

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{CoreSpecies, SurveyRecord};

/// Which species-year set is compared against the region's years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoreSpeciesRule {
    /// Every year with at least one record of the species, whatever its
    /// WTCPUE. Matches the tables DisMAP has always published.
    #[default]
    AnyCatch,
    /// Only years with a record of WTCPUE > 0.
    PositiveCatch,
}

/// Distinct years present anywhere in a region's record set.
pub type RegionYearIndex = BTreeSet<u16>;

/// Per-species year sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesYearIndex {
    /// Years with any record of the species.
    pub years: BTreeSet<u16>,
    /// Years with a record of WTCPUE > 0.
    pub positive_years: BTreeSet<u16>,
}

impl SpeciesYearIndex {
    fn years_for(&self, rule: CoreSpeciesRule) -> &BTreeSet<u16> {
        match rule {
            CoreSpeciesRule::AnyCatch => &self.years,
            CoreSpeciesRule::PositiveCatch => &self.positive_years,
        }
    }
}

/// What classification decided, kept for the region summary.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub all_years: RegionYearIndex,
    /// Species name → verdict, sorted by name.
    pub verdicts: BTreeMap<String, CoreSpecies>,
}

impl Classification {
    pub fn core_species(&self) -> impl Iterator<Item = &str> {
        self.verdicts
            .iter()
            .filter(|(_, v)| **v == CoreSpecies::Yes)
            .map(|(s, _)| s.as_str())
    }
}

/// The region's surveyed years.
pub fn region_years(records: &[SurveyRecord]) -> RegionYearIndex {
    records.iter().map(|r| r.year).collect()
}

/// Group records by species and collect each species' year sets.
pub fn species_years(records: &[SurveyRecord]) -> BTreeMap<&str, SpeciesYearIndex> {
    let mut index: BTreeMap<&str, SpeciesYearIndex> = BTreeMap::new();
    for rec in records {
        let entry = index.entry(rec.species.as_str()).or_default();
        entry.years.insert(rec.year);
        if rec.wtcpue.is_some_and(|w| w > 0.0) {
            entry.positive_years.insert(rec.year);
        }
    }
    index
}

/// Set `core_species` on every record of the region.
///
/// Only the flag is touched; no record is added, removed or reordered.
/// The comparison is exact set equality on integer years.
pub fn classify(records: &mut [SurveyRecord], rule: CoreSpeciesRule) -> Classification {
    let all_years = region_years(records);

    let verdicts: BTreeMap<String, CoreSpecies> = species_years(records)
        .into_iter()
        .map(|(species, idx)| {
            let any = idx.years == all_years;
            let positive = idx.positive_years == all_years;
            if any != positive {
                debug!(
                    "'{species}': any-catch says {}, positive-catch says {} ({} of {} years with WTCPUE > 0)",
                    CoreSpecies::from(any),
                    CoreSpecies::from(positive),
                    idx.positive_years.len(),
                    all_years.len()
                );
            }
            let core = !all_years.is_empty() && *idx.years_for(rule) == all_years;
            (species.to_string(), CoreSpecies::from(core))
        })
        .collect();

    for rec in records.iter_mut() {
        rec.core_species = verdicts
            .get(&rec.species)
            .copied()
            .unwrap_or_default();
    }

    debug!(
        "{} of {} species are core over {} years",
        verdicts.values().filter(|v| **v == CoreSpecies::Yes).count(),
        verdicts.len(),
        all_years.len()
    );

    Classification {
        all_years,
        verdicts,
    }
}
