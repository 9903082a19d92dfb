//! Data layer: the table model, loading, and the filter/aggregate engine.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  multiselect predicates → filtered Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  years    │  identifier columns + year columns in range
//!   └──────────┘
//!        │
//!        ├──────────────────┐
//!        ▼                  ▼
//!   ┌──────────┐      ┌───────────┐
//!   │  export   │      │ aggregate │  long form + "Median - ALL"
//!   └──────────┘      └───────────┘
//! ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod years;

pub use aggregate::{aggregate_median, AggregationResult, DisplayLabels, MedianChart};
pub use export::{to_csv, to_xlsx, ExportFormat};
pub use filter::{filter_table, FilterSpec};
pub use model::{CellValue, Column, Table};
pub use years::{select_year_range, YearRange};
