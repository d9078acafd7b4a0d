/// Data layer: core types, loading, and the listing queries.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → Table (city, area, BHK derived)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   Table   │  Vec<Listing>, column names
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌───────────┐
///   │  filter   │   │ aggregate │  counts, price statistics, top-N, sampling
///   └──────────┘   └───────────┘
///        └───── price ──┘           best-effort price parsing
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod price;
