//! Annual discount curve for contract cash flows
//!
//! Supports:
//! - Single flat annual rate (standard contract NPV)
//! - Spot rate curves by payment year (for term-structure sensitivity)

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuationError};

/// Discount curve for payment streams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Flat annual discount rate
    pub annual_rate: f64,

    /// Optional: spot rate by payment year
    /// Index = year, value = annual spot rate to that point
    pub spot_rates: Option<Vec<f64>>,
}

impl DiscountCurve {
    /// Create a simple discount curve with single rate
    pub fn single_rate(annual_rate: f64) -> Result<Self> {
        check_rate("discount_rate", annual_rate)?;
        Ok(Self {
            annual_rate,
            spot_rates: None,
        })
    }

    /// Create discount curve from spot rate curve; years past the end use the last spot
    pub fn from_spot_curve(spot_rates: Vec<f64>) -> Result<Self> {
        for &rate in &spot_rates {
            check_rate("spot_rates", rate)?;
        }
        let annual_rate = spot_rates.last().copied().unwrap_or(0.0);
        Ok(Self {
            annual_rate,
            spot_rates: Some(spot_rates),
        })
    }

    /// Discount factor for a payment made at the start of `year` (0 = today)
    pub fn discount_factor(&self, year: u32) -> f64 {
        let rate = match self.spot_rates {
            Some(ref spots) => spots.get(year as usize).copied().unwrap_or(self.annual_rate),
            None => self.annual_rate,
        };
        (1.0 + rate).powi(-(year as i32))
    }

    /// Present value of (year, amount) payments
    pub fn pv_stream(&self, payments: &[(u32, f64)]) -> f64 {
        payments
            .iter()
            .map(|(year, amount)| amount * self.discount_factor(*year))
            .sum()
    }

    /// Present value of `n` equal payments starting at `first_year`
    pub fn pv_level_payments(&self, amount: f64, first_year: u32, n: u32) -> f64 {
        (first_year..first_year + n)
            .map(|year| amount * self.discount_factor(year))
            .sum()
    }
}

impl Default for DiscountCurve {
    fn default() -> Self {
        Self {
            annual_rate: super::DEFAULT_DISCOUNT_RATE,
            spot_rates: None,
        }
    }
}

fn check_rate(field: &'static str, rate: f64) -> Result<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ValuationError::parameter(
            field,
            format!("discount rate must be finite and >= 0, got {}", rate),
        ));
    }
    Ok(())
}
