/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset (dates parsed, bad dates → null)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<SalesRecord>, column schema
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range ∧ region ∈ set ∧ category ∈ set → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  metrics, monthly / top-N / category rollups
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod record;
