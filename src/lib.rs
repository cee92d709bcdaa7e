//! Builds the DisMAP survey tables from regional bottom-trawl CSV exports.
//!
//! Each region is loaded, normalized, optionally restricted to a species
//! allow-list, classified into core / non-core species, and written to a
//! typed table in a fixed column order.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod store;

pub use config::{OutputFormat, PipelineConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RegionOutcome, RegionSummary};
