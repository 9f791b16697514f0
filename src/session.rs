use std::sync::Arc;

use log::debug;

use crate::data::filter::{distinct_values, filter_equals, filter_range, RangeOutcome};
use crate::data::model::{CellValue, Table};
use crate::data::resolve::resolve;
use crate::error::{Result, TableError};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// What one user currently has loaded and selected.
///
/// Owned by the caller and handed to each interaction; nothing here is
/// process-wide.
#[derive(Debug, Default)]
pub struct Session {
    /// Loaded table (None until the user uploads a file).
    pub table: Option<Arc<Table>>,

    /// Filename the table came from.
    pub source_name: Option<String>,

    /// Column used for the instrument picker, if one of the candidates matched.
    pub instrument_column: Option<String>,

    /// Currently selected instrument value.
    pub selection: Option<CellValue>,

    /// Rows matching the selected instrument, before any slider.
    pub selected: Option<Table>,

    /// Rows to display: `selected` narrowed by the last slider position.
    pub visible: Option<Table>,

    /// Status / notice message for the user.
    pub status_message: Option<String>,
}

impl Session {
    /// Ingest a newly loaded table and resolve its instrument column.
    /// Any previous table and selection are discarded.
    pub fn set_table(&mut self, source_name: &str, table: Arc<Table>, candidates: &[&str]) {
        self.instrument_column = resolve(&table, candidates).map(str::to_string);
        self.status_message = match &self.instrument_column {
            Some(col) => {
                debug!("instrument column for {source_name}: {col}");
                None
            }
            None => Some(format!(
                "None of the expected columns were found: {}",
                candidates.join(", ")
            )),
        };
        self.source_name = Some(source_name.to_string());
        self.selection = None;
        self.selected = None;
        self.visible = None;
        self.table = Some(table);
    }

    /// Values for the instrument picker.
    pub fn choices(&self) -> Result<Vec<CellValue>> {
        let (table, column) = self.active()?;
        Ok(distinct_values(table, column)?.into_iter().collect())
    }

    /// Select an instrument value and recompute the visible rows.
    pub fn select(&mut self, value: CellValue) -> Result<&Table> {
        let (table, column) = self.active()?;
        let selected = filter_equals(table, column, &value)?;
        self.selection = Some(value);
        self.status_message = None;
        self.visible = Some(selected.clone());
        Ok(&*self.selected.insert(selected))
    }

    /// Narrow the visible rows with a slider over a numeric column (e.g. strike
    /// price). Applies on top of the current instrument selection when there
    /// is one, never on top of an earlier slider position.
    pub fn select_range(&mut self, column: &str, selected: f64) -> Result<&Table> {
        let base = match &self.selected {
            Some(rows) => rows,
            None => self.table.as_deref().ok_or_else(no_table)?,
        };
        let outcome = filter_range(base, column, selected)?;
        self.status_message = match &outcome {
            RangeOutcome::SingleValue { value, .. } => {
                Some(format!("Only one {column} value available: {value}"))
            }
            RangeOutcome::Filtered(_) => None,
        };
        Ok(&*self.visible.insert(outcome.into_table()))
    }

    /// Drop the selection; the whole table becomes visible again.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.selected = None;
        self.visible = None;
        self.status_message = None;
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    /// Rows to display: the filtered subset if any, else the whole table.
    pub fn current_view(&self) -> Option<&Table> {
        self.visible.as_ref().or(self.table.as_deref())
    }

    fn active(&self) -> Result<(&Table, &str)> {
        let table = self.table.as_deref().ok_or_else(no_table)?;
        let column = self.instrument_column.as_deref().ok_or_else(|| {
            TableError::ColumnNotFound("no instrument column resolved".to_string())
        })?;
        Ok((table, column))
    }
}

fn no_table() -> TableError {
    TableError::NoTable
}
