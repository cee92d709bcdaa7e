use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::data::classify::{classify, Classification, CoreSpeciesRule};
use crate::data::filter::retain_selected;
use crate::data::loader::load_csv;
use crate::data::model::SurveyRecord;
use crate::data::normalize::{normalize, NormalizeStats};
use crate::data::schema::CANONICAL_ORDER;
use crate::error::{PipelineError, Result};
use crate::region::{RegionInfo, RegionTable};
use crate::store::{stage, Materializer, RegionFrame, Staged};

// ---------------------------------------------------------------------------
// Region summary
// ---------------------------------------------------------------------------

/// What one region run produced. Logged, and saved as `<CODE>_summary.json`
/// beside file-backed tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: String,
    pub name: String,
    pub source: PathBuf,
    pub rows_loaded: usize,
    pub rows_written: usize,
    pub blanked_names: usize,
    pub infinite_wtcpue: usize,
    pub species_count: usize,
    pub core_species: Vec<String>,
    pub years: Vec<u16>,
    pub rule: CoreSpeciesRule,
    pub table: Option<PathBuf>,
}

/// A region that went through load → normalize → filter → classify.
#[derive(Debug, Clone)]
pub struct PreparedRegion {
    pub records: Vec<SurveyRecord>,
    pub summary: RegionSummary,
}

/// Result of one region within a multi-region run.
#[derive(Debug)]
pub struct RegionOutcome {
    pub code: String,
    pub result: Result<RegionSummary>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Per-region batch pipeline. Holds the run's configuration and nothing else;
/// no state carries over from one region to the next.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    regions: RegionTable,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let regions = config.region_table()?;
        Ok(Pipeline { config, regions })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Load and transform a region without persisting anything.
    pub fn prepare(&self, region: &RegionInfo) -> Result<PreparedRegion> {
        let source = self.config.input_path(region);
        let records = load_csv(&source)?;
        Ok(self.prepare_records(region, &source, records))
    }

    /// Normalize, filter and classify already-loaded records.
    pub fn prepare_records(
        &self,
        region: &RegionInfo,
        source: &Path,
        mut records: Vec<SurveyRecord>,
    ) -> PreparedRegion {
        let rows_loaded = records.len();
        let stats: NormalizeStats = normalize(&mut records);
        if stats.infinite_wtcpue > 0 {
            warn!(
                "{}: {} WTCPUE values were infinite and are now missing",
                region.code, stats.infinite_wtcpue
            );
        }

        if self.config.filter_species {
            retain_selected(&mut records, &self.config.selected_species);
        }

        let rule = self.config.core_species_rule;
        let classification = classify(&mut records, rule);
        let summary = summarize(region, source, rows_loaded, &records, stats, &classification, rule);

        info!(
            "{}: {} rows, {} species, {} core over {} years",
            region.code,
            summary.rows_written,
            summary.species_count,
            summary.core_species.len(),
            summary.years.len()
        );
        PreparedRegion { records, summary }
    }

    /// Process one region end to end and hand it to `store`.
    ///
    /// Nothing is written for the region unless every stage before the
    /// store succeeded. The summary is staged before the table and renamed
    /// into place after it; the table's commit decides the region's result.
    pub fn run_region(
        &self,
        region: &RegionInfo,
        store: &mut dyn Materializer,
    ) -> Result<RegionSummary> {
        info!("processing region {} ({})", region.code, region.name);
        let PreparedRegion {
            records,
            mut summary,
        } = self.prepare(region)?;

        summary.table = store.table_path(region);
        let staged = match &summary.table {
            Some(table) => Some(stage_summary(&summary_path(table, region), &summary)?),
            None => None,
        };

        store.materialize(&RegionFrame::new(region, &records), &CANONICAL_ORDER)?;

        if let Some(staged) = staged {
            commit_summary(staged, region);
        }
        Ok(summary)
    }

    /// Run every selected region in order. A failing region is reported and
    /// the run moves on to the next one.
    pub fn run(&self, store: &mut dyn Materializer) -> Result<Vec<RegionOutcome>> {
        let selected = self.config.selected_regions(&self.regions)?;
        let mut outcomes = Vec::with_capacity(selected.len());

        for region in selected {
            let result = self.run_region(region, store);
            if let Err(e) = &result {
                error!("region {} failed: {e}", region.code);
            }
            outcomes.push(RegionOutcome {
                code: region.code.clone(),
                result,
            });
        }
        Ok(outcomes)
    }
}

fn summarize(
    region: &RegionInfo,
    source: &Path,
    rows_loaded: usize,
    records: &[SurveyRecord],
    stats: NormalizeStats,
    classification: &Classification,
    rule: CoreSpeciesRule,
) -> RegionSummary {
    RegionSummary {
        region: region.code.clone(),
        name: region.name.clone(),
        source: source.to_path_buf(),
        rows_loaded,
        rows_written: records.len(),
        blanked_names: stats.blanked_names,
        infinite_wtcpue: stats.infinite_wtcpue,
        species_count: classification.verdicts.len(),
        core_species: classification.core_species().map(str::to_string).collect(),
        years: classification.all_years.iter().copied().collect(),
        rule,
        table: None,
    }
}

fn summary_path(table: &Path, region: &RegionInfo) -> PathBuf {
    table.with_file_name(format!("{}_summary.json", region.code))
}

fn stage_summary(path: &Path, summary: &RegionSummary) -> Result<Staged> {
    stage(path, |file| {
        serde_json::to_writer_pretty(file, summary)
            .map_err(|e| PipelineError::persistence(path, e))
    })
}

/// Rename the staged summary next to the committed table. A failure here
/// leaves no summary at all rather than one from an earlier run.
fn commit_summary(staged: Staged, region: &RegionInfo) {
    let path = staged.target().to_path_buf();
    if let Err(e) = staged.commit() {
        warn!("{}: table written but summary was not: {e}", region.code);
        if path.is_file() {
            if let Err(e) = fs::remove_file(&path) {
                warn!("{}: could not remove stale {}: {e}", region.code, path.display());
            }
        }
    }
}
