//! Filter, slice, chart and export climate-transition pathway tables.
//!
//! The engine is a set of pure functions over an immutable [`Table`]:
//! [`filter_table`], [`select_year_range`], [`to_xlsx`] and
//! [`aggregate_median`]. [`request::handle`] chains them for one
//! dashboard interaction.

pub mod config;
pub mod data;
pub mod error;
pub mod request;

pub use data::{
    aggregate_median, filter_table, select_year_range, to_xlsx, CellValue, Column, FilterSpec,
    Table, YearRange,
};
pub use error::{EngineError, Result};
