use proptest::prelude::*;
use proptest::test_runner::Config;

use rusty_scrip::data::filter::{distinct_values, filter_equals};
use rusty_scrip::data::loader::load;
use rusty_scrip::data::resolve::resolve;
use rusty_scrip::data::writer::to_csv;
use rusty_scrip::{CellValue, Column, Table};

fn table_strategy() -> impl Strategy<Value = Table> {
    prop::collection::vec(
        (
            "[A-C]{1,2}",
            prop::option::of(-1_000_i64..1_000),
            prop::option::of(-1_000.0_f64..1_000.0),
            prop::option::of("[0-9]{1,4}"),
        ),
        0..24,
    )
    .prop_map(|rows| {
        let names = rows
            .iter()
            .map(|(n, _, _, _)| CellValue::String(n.clone()))
            .collect();
        let qty = rows
            .iter()
            .map(|(_, q, _, _)| q.map_or(CellValue::Null, CellValue::Integer))
            .collect();
        let price = rows
            .iter()
            .map(|(_, _, p, _)| p.map_or(CellValue::Null, CellValue::Float))
            .collect();
        let code = rows
            .iter()
            .map(|(_, _, _, c)| c.clone().map_or(CellValue::Null, CellValue::String))
            .collect();
        Table::new(vec![
            Column::new("Name", names),
            Column::new("Qty", qty),
            Column::new("Price", price),
            Column::new("Code", code),
        ])
        .expect("columns have equal length")
    })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn resolver_returns_first_present_candidate(
        candidates in prop::collection::vec("(Name|Qty|Price|Symbol|Strike)", 0..5)
    ) {
        let table = Table::new(vec![
            Column::new("Name", vec![]),
            Column::new("Qty", vec![]),
            Column::new("Price", vec![]),
        ])
        .unwrap();
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let expected = refs.iter().copied().find(|c| ["Name", "Qty", "Price"].contains(c));
        prop_assert_eq!(resolve(&table, &refs), expected);
    }

    #[test]
    fn equality_filter_is_a_subset_with_only_the_target(
        table in table_strategy(),
        target in "[A-C]{1,2}",
    ) {
        let value = CellValue::String(target);
        let out = filter_equals(&table, "Name", &value).unwrap();

        prop_assert!(out.len() <= table.len());
        let names: Vec<&str> = out.column_names().collect();
        prop_assert_eq!(names, vec!["Name", "Qty", "Price", "Code"]);

        let distinct = distinct_values(&out, "Name").unwrap();
        prop_assert!(distinct.len() <= 1);
        if !out.is_empty() {
            prop_assert!(distinct.contains(&value));
        }

        let again = filter_equals(&out, "Name", &value).unwrap();
        prop_assert_eq!(again, out);
    }

    #[test]
    fn csv_round_trip_preserves_cells(table in table_strategy()) {
        let bytes = to_csv(&table).unwrap();
        let reloaded = load(&bytes, "roundtrip.csv").unwrap();

        prop_assert_eq!(reloaded.len(), table.len());
        let names: Vec<&str> = reloaded.column_names().collect();
        prop_assert_eq!(names, vec!["Name", "Qty", "Price", "Code"]);
        for (orig, back) in table.columns().iter().zip(reloaded.columns()) {
            prop_assert_eq!(&orig.values, &back.values, "column {}", orig.name);
        }
    }
}
