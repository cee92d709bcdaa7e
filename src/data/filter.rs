use std::collections::BTreeMap;

use log::info;

use super::model::SurveyRecord;

// ---------------------------------------------------------------------------
// Species allow-list
// ---------------------------------------------------------------------------

/// Selected species: scientific name → common name.
pub type SelectedSpecies = BTreeMap<String, String>;

/// Drop every record whose species is not on the allow-list.
///
/// Must run after normalization (names are compared post-`Na` blanking) and
/// before classification, since the filtered set defines the region's years.
pub fn retain_selected(records: &mut Vec<SurveyRecord>, selected: &SelectedSpecies) {
    let before = records.len();
    records.retain(|rec| selected.contains_key(&rec.species));
    info!(
        "species filter kept {} of {} records ({} species selected)",
        records.len(),
        before,
        selected.len()
    );
}
