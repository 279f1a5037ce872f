//! Valuation assumptions: aging decline and market pricing

mod aging;
mod position;
pub mod loader;

pub use aging::{AgingCurves, DeclineRateProvider};
pub use loader::LoadedAssumptions;
pub use position::Position;

use std::path::Path;

use crate::error::{Result, ValuationError};

/// Decline multiplier for positions absent from the aging table
pub const DEFAULT_DECLINE_RATE: f64 = 0.95;

/// Default market price of one unit of skill (one win), in $M
pub const DEFAULT_MARKET_RATE: f64 = 8.0;

/// Container for all valuation assumptions
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub aging: AgingCurves,

    /// Market dollars per skill unit ($M per win)
    pub market_rate: f64,
}

impl Assumptions {
    /// In-memory defaults
    pub fn default_market() -> Self {
        Self {
            aging: AgingCurves::default_curves(),
            market_rate: DEFAULT_MARKET_RATE,
        }
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Self::from_loaded(&LoadedAssumptions::load_from(path)?)
    }

    /// Build from raw loaded data; missing market keys take their defaults
    pub fn from_loaded(loaded: &LoadedAssumptions) -> Result<Self> {
        let fallback = match loaded.market.get("default_decline_rate") {
            Some(&rate) => loader::check_decline_rate("default_decline_rate", rate)?,
            None => DEFAULT_DECLINE_RATE,
        };
        let market_rate = loaded.market.get("market_rate").copied().unwrap_or(DEFAULT_MARKET_RATE);
        if !market_rate.is_finite() || market_rate < 0.0 {
            return Err(ValuationError::parameter(
                "market_rate",
                format!("must be finite and >= 0, got {}", market_rate),
            ));
        }

        Ok(Self {
            aging: AgingCurves::from_loaded(&loaded.decline_rates, fallback),
            market_rate,
        })
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_market()
    }
}
