//! CSV-based assumption loader
//!
//! Loads valuation assumptions from CSV files in data/assumptions/

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use super::Position;
use crate::error::{Result, ValuationError};

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// File holding `position,decline_rate` rows
pub const AGING_CURVES_FILE: &str = "aging_curves.csv";

/// File holding `key,value` market rows
pub const MARKET_FILE: &str = "market.csv";

/// Raw assumption data as read from disk
#[derive(Debug, Clone, Default)]
pub struct LoadedAssumptions {
    pub decline_rates: HashMap<Position, f64>,
    pub market: HashMap<String, f64>,
}

impl LoadedAssumptions {
    /// Load every assumption file from a directory. `market.csv` is optional.
    pub fn load_from(path: &Path) -> Result<Self> {
        let decline_rates = load_decline_rates(&path.join(AGING_CURVES_FILE))?;

        let market_path = path.join(MARKET_FILE);
        let market = if market_path.exists() {
            load_market_values(&market_path)?
        } else {
            HashMap::new()
        };

        Ok(Self { decline_rates, market })
    }
}

/// Load aging decline multipliers from CSV
pub fn load_decline_rates(path: &Path) -> Result<HashMap<Position, f64>> {
    let file = File::open(path)?;
    load_decline_rates_from_reader(file)
}

/// Load aging decline multipliers from any reader
pub fn load_decline_rates_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<HashMap<Position, f64>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rates = HashMap::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 2;
        let position: Position = field(&record, 0, row)?.parse()?;
        let rate: f64 = field(&record, 1, row)?
            .parse()
            .map_err(|e| ValuationError::Parse { row, reason: format!("decline_rate: {}", e) })?;

        let rate = check_decline_rate("decline_rate", rate)
            .map_err(|e| ValuationError::Parse { row, reason: e.to_string() })?;
        rates.insert(position, rate);
    }

    Ok(rates)
}

/// Load `key,value` market assumptions from CSV
pub fn load_market_values(path: &Path) -> Result<HashMap<String, f64>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut values = HashMap::new();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 2;
        let key = field(&record, 0, row)?.to_string();
        let value: f64 = field(&record, 1, row)?
            .parse()
            .map_err(|e| ValuationError::Parse { row, reason: format!("{}: {}", key, e) })?;
        values.insert(key, value);
    }

    Ok(values)
}

/// Decline multipliers must lie in (0, 1]; above 1 would model skill growth
pub(crate) fn check_decline_rate(field: &'static str, rate: f64) -> Result<f64> {
    if !(rate > 0.0 && rate <= 1.0) {
        return Err(ValuationError::parameter(
            field,
            format!("decline rate {} outside (0, 1]", rate),
        ));
    }
    Ok(rate)
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize, row: usize) -> Result<&'a str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| ValuationError::Parse { row, reason: format!("missing column {}", idx) })
}
