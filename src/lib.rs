//! Load an uploaded CSV or spreadsheet, locate its instrument column and
//! filter rows by the selected value.
//!
//! ```
//! use rusty_scrip::data::{filter, loader, resolve};
//!
//! let csv = b"Name,Price\nAAA,10\nBBB,20\nAAA,30\n";
//! let table = loader::load(csv, "prices.csv")?;
//! let column = resolve::resolve(&table, &["Instrument", "Name"]).unwrap();
//! let rows = filter::filter_equals(&table, column, &"AAA".into())?;
//! assert_eq!(rows.len(), 2);
//! # Ok::<(), rusty_scrip::TableError>(())
//! ```

pub mod cache;
pub mod data;
pub mod error;
pub mod session;
pub mod store;

pub use data::model::{CellValue, Column, ColumnKind, Table};
pub use error::{Result, TableError};
