use std::collections::BTreeSet;

use log::debug;

use super::model::{CellValue, Column, ColumnKind, Table};
use crate::error::{Result, TableError};

// ---------------------------------------------------------------------------
// Distinct values
// ---------------------------------------------------------------------------

/// Every distinct non-missing value of `column`, for populating a picker.
pub fn distinct_values(table: &Table, column: &str) -> Result<BTreeSet<CellValue>> {
    Ok(table
        .column(column)?
        .values
        .iter()
        .filter(|v| !v.is_null())
        .cloned()
        .collect())
}

// ---------------------------------------------------------------------------
// Row filters
// ---------------------------------------------------------------------------

/// Rows whose `column` cell equals `value`, in their original order.
pub fn filter_equals(table: &Table, column: &str, value: &CellValue) -> Result<Table> {
    let col = table.column(column)?;
    Ok(table.take_rows(&matching_rows(col, |cell| cell.matches(value))))
}

/// Rows whose `column` cell is one of `selected`.
///
/// An empty selection keeps no rows.
pub fn filter_in(table: &Table, column: &str, selected: &BTreeSet<CellValue>) -> Result<Table> {
    let col = table.column(column)?;
    Ok(table.take_rows(&matching_rows(col, |cell| {
        selected.iter().any(|s| cell.matches(s))
    })))
}

/// Outcome of a slider-style numeric filter.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOutcome {
    /// Rows whose value equals the selected number.
    Filtered(Table),
    /// The column holds a single distinct number; the table is returned
    /// unfiltered because there is nothing to choose between.
    SingleValue { value: f64, table: Table },
}

impl RangeOutcome {
    pub fn table(&self) -> &Table {
        match self {
            RangeOutcome::Filtered(table) | RangeOutcome::SingleValue { table, .. } => table,
        }
    }

    pub fn into_table(self) -> Table {
        match self {
            RangeOutcome::Filtered(table) | RangeOutcome::SingleValue { table, .. } => table,
        }
    }
}

/// Smallest and largest value of a numeric column.
pub fn numeric_bounds(table: &Table, column: &str) -> Result<(f64, f64)> {
    let col = numeric_column(table, column)?;
    let mut values = col.values.iter().filter_map(CellValue::as_f64);
    // numeric_column guarantees at least one number
    let first = values.next().unwrap_or_default();
    Ok(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Slider filter over a numeric column: keeps rows equal to `selected`,
/// which the caller picks from [`numeric_bounds`].
///
/// This is an exact-equality filter driven by a range control, not an
/// inclusive range; see [`filter_between`] for the latter.
pub fn filter_range(table: &Table, column: &str, selected: f64) -> Result<RangeOutcome> {
    let (min, max) = numeric_bounds(table, column)?;
    if min == max {
        debug!("'{column}' holds the single value {min}; returning all rows");
        return Ok(RangeOutcome::SingleValue {
            value: min,
            table: table.clone(),
        });
    }
    let col = table.column(column)?;
    let rows = matching_rows(col, |cell| cell.as_f64() == Some(selected));
    Ok(RangeOutcome::Filtered(table.take_rows(&rows)))
}

/// Rows whose numeric `column` value lies in `lo..=hi`.
pub fn filter_between(table: &Table, column: &str, lo: f64, hi: f64) -> Result<Table> {
    let col = numeric_column(table, column)?;
    let rows = matching_rows(col, |cell| {
        cell.as_f64().is_some_and(|v| lo <= v && v <= hi)
    });
    Ok(table.take_rows(&rows))
}

// -- helpers --

fn matching_rows(col: &Column, pred: impl Fn(&CellValue) -> bool) -> Vec<usize> {
    col.values
        .iter()
        .enumerate()
        .filter(|(_, cell)| pred(cell))
        .map(|(i, _)| i)
        .collect()
}

fn numeric_column<'t>(table: &'t Table, column: &str) -> Result<&'t Column> {
    let col = table.column(column)?;
    let kind = col.kind();
    if !kind.is_numeric() {
        return Err(TableError::TypeMismatch {
            column: column.to_string(),
            expected: "numeric",
            found: kind.label(),
        });
    }
    Ok(col)
}
