use std::fmt::Write;

use rusty_scrip::{CellValue, Table};

/// Plain-text grid of the first `limit` rows of `table`.
pub fn format_table(table: &Table, limit: usize) -> String {
    let shown = table.len().min(limit);
    let headers: Vec<&str> = table.column_names().collect();
    let cells: Vec<Vec<String>> = (0..shown)
        .filter_map(|i| table.row(i))
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(c, h)| {
            cells
                .iter()
                .map(|row| row[c].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    if shown < table.len() {
        let _ = writeln!(out, "... {} more rows", table.len() - shown);
    }
    let _ = writeln!(out, "({} rows)", table.len());
    out
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = fields
        .zip(widths)
        .map(|(f, &w)| format!("{f:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_scrip::Column;

    #[test]
    fn aligns_columns_and_reports_hidden_rows() {
        let table = Table::new(vec![
            Column::new("Name", vec!["AAA".into(), "BBBBBB".into(), CellValue::Null]),
            Column::new("Px", vec![1i64.into(), 2i64.into(), 3i64.into()]),
        ])
        .unwrap();
        let text = format_table(&table, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name    Px");
        assert_eq!(lines[1], "------  --");
        assert_eq!(lines[2], "AAA     1");
        assert_eq!(lines[3], "BBBBBB  2");
        assert_eq!(lines[4], "... 1 more rows");
        assert_eq!(lines[5], "(3 rows)");
    }
}
