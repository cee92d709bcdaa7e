/// Data layer: schema, record model, and the per-region transforms.
///
/// Architecture:
/// ```text
///   <CODE>.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + type-check → Vec<SurveyRecord>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  blank names, derive columns, sanitize WTCPUE
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  optional species allow-list
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  CoreSpecies = Yes / No per species
///   └──────────┘
/// ```

pub mod classify;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod schema;
