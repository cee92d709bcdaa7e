use log::debug;

use super::model::{CoreSpecies, SurveyRecord};
use super::schema::is_missing_token;

/// Outcome counters, for logging and the region summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeStats {
    pub blanked_names: usize,
    pub infinite_wtcpue: usize,
}

/// Normalize loader output in place.
///
/// Steps, applied per record in this order:
/// 1. missing / `Na` species and common names become `""`
/// 2. `SpeciesCommonName` and `CommonNameSpecies` are derived from the names
/// 3. `CoreSpecies` is reset to `No`
/// 4. non-finite WTCPUE becomes missing
/// 5. `WTCPUECubeRoot` is the real cube root of WTCPUE
///
/// Row order and count are untouched. Running it twice is a no-op.
pub fn normalize(records: &mut [SurveyRecord]) -> NormalizeStats {
    let mut stats = NormalizeStats::default();

    for rec in records.iter_mut() {
        if blank_missing(&mut rec.species) | blank_missing(&mut rec.common_name) {
            stats.blanked_names += 1;
        }

        rec.species_common_name = format!("{} ({})", rec.species, rec.common_name);
        rec.common_name_species = format!("{} ({})", rec.common_name, rec.species);

        rec.core_species = CoreSpecies::No;

        if rec.wtcpue.is_some_and(|v| !v.is_finite()) {
            rec.wtcpue = None;
            stats.infinite_wtcpue += 1;
        }

        // cbrt keeps the sign, so a negative biomass stays real
        rec.wtcpue_cube_root = rec.wtcpue.map(f64::cbrt);
    }

    debug!(
        "normalized {} records ({} blanked names, {} non-finite WTCPUE)",
        records.len(),
        stats.blanked_names,
        stats.infinite_wtcpue
    );
    stats
}

fn blank_missing(name: &mut String) -> bool {
    if !name.is_empty() && is_missing_token(name) {
        name.clear();
        true
    } else {
        false
    }
}
