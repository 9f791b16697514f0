/// Data layer: core types, loading, column resolution and filtering.
///
/// Architecture:
/// ```text
///  bytes + filename (.csv / .xlsx / .json)
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ resolve  │  candidate header names → instrument column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  distinct values, equality / slider filters → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer  │  Table → delimited text
///   └──────────┘
/// ```
///
/// Every stage is a pure function of its inputs; tables are never mutated.

pub mod filter;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod writer;
