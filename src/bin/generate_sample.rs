use anyhow::{Context, Result};
use rusty_scrip::data::writer::to_csv;
use rusty_scrip::{CellValue, Column, Table};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    // (underlying, spot, strike step, lot size)
    let underlyings = [
        ("NIFTY", 22_000i64, 50i64, 25i64),
        ("BANKNIFTY", 48_000, 100, 15),
        ("FINNIFTY", 21_000, 50, 40),
    ];
    let expiries = ["2024-03-28", "2024-04-25"];

    let mut exchange = Vec::new();
    let mut instrument = Vec::new();
    let mut symbol = Vec::new();
    let mut expiry = Vec::new();
    let mut strike = Vec::new();
    let mut option_type = Vec::new();
    let mut lot = Vec::new();

    for &(name, spot, step, lot_units) in &underlyings {
        for exp in &expiries {
            // futures carry no strike
            exchange.push(CellValue::from("NSE"));
            instrument.push(CellValue::from("FUTIDX"));
            symbol.push(CellValue::String(format!("{name}-{exp}-FUT")));
            expiry.push(CellValue::from(*exp));
            strike.push(CellValue::Null);
            option_type.push(CellValue::Null);
            lot.push(CellValue::Integer(lot_units));

            let atm = spot + (rng.below(11) as i64 - 5) * step;
            for k in -3i64..=3 {
                let strike_price = atm + k * step;
                for side in ["CE", "PE"] {
                    exchange.push(CellValue::from("NSE"));
                    instrument.push(CellValue::from("OPTIDX"));
                    symbol.push(CellValue::String(format!(
                        "{name}-{exp}-{strike_price}-{side}"
                    )));
                    expiry.push(CellValue::from(*exp));
                    strike.push(CellValue::Float(strike_price as f64));
                    option_type.push(CellValue::from(side));
                    lot.push(CellValue::Integer(lot_units));
                }
            }
        }
    }

    let rows = symbol.len();
    let table = Table::new(vec![
        Column::new("SEM_EXM_EXCH_ID", exchange),
        Column::new("SEM_INSTRUMENT_NAME", instrument),
        Column::new("SEM_TRADING_SYMBOL", symbol),
        Column::new("SEM_EXPIRY_DATE", expiry),
        Column::new("SEM_STRIKE_PRICE", strike),
        Column::new("SEM_OPTION_TYPE", option_type),
        Column::new("SEM_LOT_UNITS", lot),
    ])?;

    let output_path = "sample_scrip_master.csv";
    let bytes = to_csv(&table)?;
    std::fs::write(output_path, bytes).with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {rows} instruments to {output_path}");
    Ok(())
}
