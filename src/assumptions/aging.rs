//! Position-indexed aging decline multipliers
//!
//! The engine does not fit aging curves. It consumes one annual multiplicative
//! factor (< 1) per position from whatever provider the caller plugs in.

use std::collections::HashMap;

use super::Position;

/// Source of annual skill decline multipliers
pub trait DeclineRateProvider: Send + Sync {
    /// Annual multiplicative decline for a position (e.g. 0.95 = lose 5% a year)
    fn decline_rate(&self, position: Position) -> f64;
}

/// Flat table of decline multipliers by position
#[derive(Debug, Clone)]
pub struct AgingCurves {
    rates: HashMap<Position, f64>,

    /// Used for positions missing from the table
    fallback: f64,
}

impl AgingCurves {
    /// Create from loaded CSV data
    pub fn from_loaded(rates: &HashMap<Position, f64>, fallback: f64) -> Self {
        Self {
            rates: rates.clone(),
            fallback,
        }
    }

    /// Same decline for every position
    pub fn uniform(rate: f64) -> Self {
        Self {
            rates: HashMap::new(),
            fallback: rate,
        }
    }

    /// Default multipliers for players in their late twenties / early thirties
    pub fn default_curves() -> Self {
        let rates = HashMap::from([
            (Position::Catcher, 0.93),
            (Position::FirstBase, 0.95),
            (Position::SecondBase, 0.94),
            (Position::ThirdBase, 0.94),
            (Position::Shortstop, 0.94),
            (Position::LeftField, 0.95),
            (Position::CenterField, 0.94),
            (Position::RightField, 0.95),
            (Position::DesignatedHitter, 0.96),
            (Position::StartingPitcher, 0.94),
            (Position::ReliefPitcher, 0.93),
        ]);

        Self {
            rates,
            fallback: super::DEFAULT_DECLINE_RATE,
        }
    }

    /// Override a single position
    pub fn with_rate(mut self, position: Position, rate: f64) -> Self {
        self.rates.insert(position, rate);
        self
    }
}

impl Default for AgingCurves {
    fn default() -> Self {
        Self::default_curves()
    }
}

impl DeclineRateProvider for AgingCurves {
    fn decline_rate(&self, position: Position) -> f64 {
        self.rates.get(&position).copied().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates_below_one() {
        let curves = AgingCurves::default_curves();
        for position in Position::ALL {
            let rate = curves.decline_rate(position);
            assert!(rate > 0.0 && rate < 1.0, "{} -> {}", position, rate);
        }
    }

    #[test]
    fn test_fallback_for_missing_position() {
        let curves = AgingCurves::uniform(0.9).with_rate(Position::Catcher, 0.8);
        assert_eq!(curves.decline_rate(Position::Catcher), 0.8);
        assert_eq!(curves.decline_rate(Position::Shortstop), 0.9);
    }
}
