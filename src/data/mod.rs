//! Data layer: core types, loading, filtering, reshaping and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (cached per path)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  topic / strategy / year predicates → records
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  reshape  │  group by (topic, strategy), order by year → SeriesTable
//!   └──────────┘
//!        │
//!        ├───────────────┐
//!        ▼               ▼
//!   ┌──────────┐   ┌──────────┐
//!   │  scale    │   │  export   │  display copy | CSV of the filtered records
//!   └──────────┘   └──────────┘
//! ```

pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod reshape;
pub mod scale;
