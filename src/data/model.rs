use std::fmt;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::error::{Result, TableError};

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value: text, number or missing.
/// Distinct values are collected in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Null => serializer.serialize_none(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    /// Numeric view of the value; `None` for text and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Equality used by the row filters. An integer compared with a float
    /// goes through the numeric view; every other pair must match exactly.
    pub fn matches(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Integer(a), CellValue::Float(b))
            | (CellValue::Float(b), CellValue::Integer(a)) => *a as f64 == *b,
            _ => self == other,
        }
    }

    /// Field text for delimited output. Missing values become an empty
    /// field and floats keep their decimal point so they load back as floats.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => format!("{v:?}"),
            CellValue::Null => String::new(),
        }
    }

    /// Interpret user-entered text as a value of a column of `kind`.
    ///
    /// Returns `None` when the text cannot be a value of that column
    /// (e.g. `"abc"` for a numeric column).
    pub fn parse_for(kind: ColumnKind, text: &str) -> Option<CellValue> {
        match kind {
            ColumnKind::Text => Some(CellValue::String(text.to_string())),
            ColumnKind::Integer => {
                if let Ok(i) = text.trim().parse::<i64>() {
                    return Some(CellValue::Integer(i));
                }
                parse_finite(text).map(CellValue::Float)
            }
            ColumnKind::Float => parse_finite(text).map(CellValue::Float),
            ColumnKind::Empty => None,
        }
    }
}

pub(crate) fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Column kinds
// ---------------------------------------------------------------------------

/// Homogeneous type of a loaded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Every cell is missing.
    Empty,
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Empty => "empty",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        }
    }

    /// Kind of a column holding `values`. Text wins over numbers and floats
    /// win over integers.
    pub fn of(values: &[CellValue]) -> ColumnKind {
        values.iter().fold(ColumnKind::Empty, |kind, v| match (kind, v) {
            (_, CellValue::Null) => kind,
            (ColumnKind::Text, _) | (_, CellValue::String(_)) => ColumnKind::Text,
            (ColumnKind::Float, _) | (_, CellValue::Float(_)) => ColumnKind::Float,
            _ => ColumnKind::Integer,
        })
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bring typed cells of one column to a single kind: integers are promoted
/// when floats are present, numbers are stringified when text is present.
pub fn unify_column(values: Vec<CellValue>) -> Vec<CellValue> {
    match ColumnKind::of(&values) {
        ColumnKind::Float => values
            .into_iter()
            .map(|v| match v {
                CellValue::Integer(i) => CellValue::Float(i as f64),
                other => other,
            })
            .collect(),
        ColumnKind::Text => values
            .into_iter()
            .map(|v| match v {
                CellValue::Integer(_) | CellValue::Float(_) => CellValue::String(v.to_string()),
                other => other,
            })
            .collect(),
        ColumnKind::Empty | ColumnKind::Integer => values,
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        ColumnKind::of(&self.values)
    }
}

/// An immutable row/column table. All columns have the same length and
/// column names are unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table, rejecting ragged columns and duplicate names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, |c| c.values.len());
        for (i, col) in columns.iter().enumerate() {
            if col.values.len() != rows {
                return Err(TableError::Parse(format!(
                    "column '{}' has {} values but '{}' has {rows}",
                    col.name,
                    col.values.len(),
                    columns[0].name
                )));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(TableError::Parse(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Table { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Column lookup by exact, case-sensitive name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        (index < self.rows).then(|| self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// A new table holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            rows: indices.len(),
        }
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let names: Vec<&str> = self.column_names().collect();
        let rows: Vec<Vec<&CellValue>> = (0..self.rows).filter_map(|i| self.row(i)).collect();
        let mut s = serializer.serialize_struct("Table", 2)?;
        s.serialize_field("columns", &names)?;
        s.serialize_field("rows", &rows)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_prefers_text_then_float() {
        let ints = vec![CellValue::Integer(1), CellValue::Null];
        assert_eq!(ColumnKind::of(&ints), ColumnKind::Integer);
        let mixed = vec![CellValue::Integer(1), CellValue::Float(2.5)];
        assert_eq!(ColumnKind::of(&mixed), ColumnKind::Float);
        let text = vec![CellValue::Float(2.5), CellValue::from("x")];
        assert_eq!(ColumnKind::of(&text), ColumnKind::Text);
        assert_eq!(ColumnKind::of(&[CellValue::Null]), ColumnKind::Empty);
    }

    #[test]
    fn unify_promotes_integers() {
        let out = unify_column(vec![CellValue::Integer(1), CellValue::Float(2.5), CellValue::Null]);
        assert_eq!(
            out,
            vec![CellValue::Float(1.0), CellValue::Float(2.5), CellValue::Null]
        );
        let out = unify_column(vec![CellValue::Integer(7), CellValue::from("x")]);
        assert_eq!(out, vec![CellValue::from("7"), CellValue::from("x")]);
    }

    #[test]
    fn numeric_match_crosses_integer_and_float() {
        assert!(CellValue::Integer(10).matches(&CellValue::Float(10.0)));
        assert!(CellValue::Float(10.0).matches(&CellValue::Integer(10)));
        assert!(!CellValue::from("10").matches(&CellValue::Integer(10)));
        assert!(CellValue::Null.matches(&CellValue::Null));
    }

    #[test]
    fn large_integers_match_exactly() {
        let a = CellValue::Integer(9_007_199_254_740_992);
        let b = CellValue::Integer(9_007_199_254_740_993);
        assert!(!a.matches(&b));
        assert!(b.matches(&b));
    }

    #[test]
    fn float_field_keeps_decimal_point() {
        assert_eq!(CellValue::Float(3.0).to_field(), "3.0");
        assert_eq!(CellValue::Null.to_field(), "");
    }

    #[test]
    fn parse_for_respects_kind() {
        assert_eq!(
            CellValue::parse_for(ColumnKind::Integer, "42"),
            Some(CellValue::Integer(42))
        );
        assert_eq!(
            CellValue::parse_for(ColumnKind::Integer, "42.5"),
            Some(CellValue::Float(42.5))
        );
        assert_eq!(CellValue::parse_for(ColumnKind::Float, "abc"), None);
        assert_eq!(
            CellValue::parse_for(ColumnKind::Text, "42"),
            Some(CellValue::from("42"))
        );
    }

    #[test]
    fn new_rejects_ragged_and_duplicate_columns() {
        let ragged = Table::new(vec![
            Column::new("a", vec![CellValue::Integer(1)]),
            Column::new("b", vec![]),
        ]);
        assert!(matches!(ragged, Err(TableError::Parse(_))));

        let dup = Table::new(vec![
            Column::new("a", vec![CellValue::Integer(1)]),
            Column::new("a", vec![CellValue::Integer(2)]),
        ]);
        assert!(matches!(dup, Err(TableError::Parse(_))));
    }

    #[test]
    fn take_rows_copies_in_order() {
        let t = Table::new(vec![Column::new(
            "n",
            vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)],
        )])
        .unwrap();
        let sub = t.take_rows(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(
            sub.column("n").unwrap().values,
            vec![CellValue::Integer(3), CellValue::Integer(1)]
        );
        assert_eq!(t.len(), 3);
    }
}
