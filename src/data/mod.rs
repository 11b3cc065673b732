/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, drop incomplete rows → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   Dataset     │  Vec<Row>, island index, Arc-shared
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  species ∈ set ∧ island == choice → FilteredDataset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
