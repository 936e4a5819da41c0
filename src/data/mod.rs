/// Data layer: core types, loading, and row predicates.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet      dictionary .csv      gazetteer .txt
///        │                           │                     │
///        ▼                           ▼                     ▼
///   ┌──────────┐              ┌────────────┐         ┌───────────┐
///   │  loader   │ ──────────▶ │ dictionary │         │    geo    │
///   └──────────┘              └────────────┘         └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Row>, column order
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  conjunction of (field, op, value) terms
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
