use super::model::Table;

/// Header spellings under which uploads carry the instrument name, in
/// priority order.
pub const INSTRUMENT_CANDIDATES: &[&str] = &[
    "SEM_INSTRUMENT_NAME",
    "Instrument Name",
    "InstrumentName",
    "instrument_name",
    "Instrument",
    "Name",
];

/// Return the first of `candidates` that names a column of `table`.
///
/// `None` means no candidate matched; that is an ordinary outcome, not an error.
pub fn resolve<'a>(table: &Table, candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|c| table.has_column(c))
}
