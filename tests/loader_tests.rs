use rusty_scrip::data::loader::load;
use rusty_scrip::{CellValue, ColumnKind, TableError};

#[test]
fn csv_header_is_taken_verbatim() {
    let csv = b" Instrument Name ,price\nNIFTY,10\n";
    let table = load(csv, "upload.csv").expect("load csv");
    let names: Vec<&str> = table.column_names().collect();
    assert_eq!(names, vec![" Instrument Name ", "price"]);
}

#[test]
fn csv_columns_are_typed() {
    let csv = b"Name,Qty,Price,Note\nAAA,1,10.5,x\nBBB,,20,\n";
    let table = load(csv, "trades.CSV").expect("load csv");
    assert_eq!(table.len(), 2);
    assert_eq!(table.column("Name").unwrap().kind(), ColumnKind::Text);
    assert_eq!(table.column("Qty").unwrap().kind(), ColumnKind::Integer);
    assert_eq!(
        table.column("Price").unwrap().values,
        vec![CellValue::Float(10.5), CellValue::Float(20.0)]
    );
    assert_eq!(
        table.column("Note").unwrap().values,
        vec![CellValue::from("x"), CellValue::Null]
    );
}

#[test]
fn quoted_fields_keep_commas() {
    let csv = b"Name,Desc\nAAA,\"a, b\"\n";
    let table = load(csv, "q.csv").expect("load csv");
    assert_eq!(
        table.column("Desc").unwrap().values,
        vec![CellValue::from("a, b")]
    );
}

#[test]
fn quoted_digits_stay_text() {
    let csv = b"Code,Qty\r\n\"007\",7\r\n\"10\",10\r\n";
    let table = load(csv, "codes.csv").expect("load csv");
    assert_eq!(
        table.column("Code").unwrap().values,
        vec![CellValue::from("007"), CellValue::from("10")]
    );
    assert_eq!(table.column("Qty").unwrap().kind(), ColumnKind::Integer);
}

#[test]
fn header_only_csv_is_an_empty_table() {
    let table = load(b"Name,Price\n", "empty.csv").expect("load csv");
    assert!(table.is_empty());
    assert_eq!(table.columns().len(), 2);
}

#[test]
fn txt_is_unsupported() {
    let err = load(b"Name\nAAA\n", "data.txt").unwrap_err();
    assert_eq!(
        err,
        TableError::UnsupportedFormat {
            extension: "txt".into()
        }
    );
}

#[test]
fn ragged_csv_is_a_parse_error() {
    let err = load(b"a,b\n1,2\n3\n", "bad.csv").unwrap_err();
    assert!(matches!(err, TableError::Parse(_)), "{err:?}");
}

#[test]
fn empty_csv_is_a_parse_error() {
    assert!(matches!(load(b"", "empty.csv"), Err(TableError::Parse(_))));
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let bytes = b"Name\n\xff\xfe\n";
    assert!(matches!(load(bytes, "bin.csv"), Err(TableError::Parse(_))));
}

#[test]
fn duplicate_headers_are_rejected() {
    let err = load(b"Name,Name\nA,B\n", "dup.csv").unwrap_err();
    assert!(matches!(err, TableError::Parse(msg) if msg.contains("duplicate")));
}

const MASTER_XLSX: &[u8] = include_bytes!("fixtures/scrip_master.xlsx");

#[test]
fn spreadsheet_reads_first_sheet_with_typed_columns() {
    let table = load(MASTER_XLSX, "scrip_master.xlsx").expect("load workbook");
    let names: Vec<&str> = table.column_names().collect();
    assert_eq!(
        names,
        vec!["SEM_INSTRUMENT_NAME", "SEM_STRIKE_PRICE", "SEM_LOT_UNITS", "SEM_WEEKLY"]
    );
    assert_eq!(table.len(), 3);

    assert_eq!(
        table.column("SEM_INSTRUMENT_NAME").unwrap().values,
        vec![
            CellValue::from("OPTIDX"),
            CellValue::from("OPTIDX"),
            CellValue::from("FUTIDX"),
        ]
    );

    let strike = table.column("SEM_STRIKE_PRICE").unwrap();
    assert_eq!(strike.kind(), ColumnKind::Float);
    assert_eq!(
        strike.values,
        vec![CellValue::Float(22000.0), CellValue::Float(22050.5), CellValue::Null]
    );

    let lots = table.column("SEM_LOT_UNITS").unwrap();
    assert!(lots.kind().is_numeric());
    let lots: Vec<Option<f64>> = lots.values.iter().map(CellValue::as_f64).collect();
    assert_eq!(lots, vec![Some(50.0), Some(50.0), Some(25.0)]);

    assert_eq!(
        table.column("SEM_WEEKLY").unwrap().values,
        vec![CellValue::from("true"), CellValue::from("false"), CellValue::Null]
    );
}

#[test]
fn corrupt_spreadsheet_is_a_parse_error() {
    let err = load(b"definitely not a workbook", "master.xlsx").unwrap_err();
    assert!(matches!(err, TableError::Parse(_)), "{err:?}");
}

#[test]
fn json_records_load() {
    let json = br#"[{"Name": "AAA", "Price": 10}, {"Name": "BBB", "Price": 20.5}]"#;
    let table = load(json, "prices.json").expect("load json");
    assert_eq!(
        table.column("Price").unwrap().values,
        vec![CellValue::Float(10.0), CellValue::Float(20.5)]
    );
}
