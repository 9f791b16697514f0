use std::io::Write;

use csv::QuoteStyle;

use super::model::{CellValue, Table};
use crate::error::Result;

/// Write `table` as comma-delimited text: a header row of column names, then
/// one line per row. Missing cells are written as empty fields.
///
/// Header names and text cells are always quoted and numbers never are, so
/// the loader types a column of digit strings as text again.
pub fn write_csv<W: Write>(table: &Table, sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(sink);
    writer.write_record(table.column_names().map(quote))?;

    let single = table.columns().len() == 1;
    for i in 0..table.len() {
        let fields = table.columns().iter().map(|c| match &c.values[i] {
            CellValue::String(s) => quote(s),
            // A lone empty field would be an empty line, which readers skip.
            CellValue::Null if single => quote(""),
            other => other.to_field(),
        });
        writer.write_record(fields)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// [`write_csv`] into an in-memory buffer.
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
