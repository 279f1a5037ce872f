//! Contract structure data matching the deal-term format

use serde::Serialize;

use crate::error::{Result, ValuationError};

/// Payment terms of a single contract structure
///
/// Immutable once built: every default (AAV, deferral period) is filled in
/// and every invariant checked by [`ContractStructureBuilder::build`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractStructure {
    /// Nominal stated value
    total_value: f64,

    /// Contract duration in years
    years: u32,

    /// Average annual value
    aav: f64,

    /// Fraction of total value paid after the active years
    deferred_pct: f64,

    /// Years over which deferred money is paid out
    deferral_years: u32,

    /// Years after which the player may terminate, ascending
    opt_outs: Vec<u32>,

    /// Total possible bonus money (informational)
    incentives_total: f64,
}

impl ContractStructure {
    /// Start building a contract with the two required terms
    pub fn builder(total_value: f64, years: u32) -> ContractStructureBuilder {
        ContractStructureBuilder::new(total_value, years)
    }

    /// Plain, fully immediate contract with no options
    pub fn simple(total_value: f64, years: u32) -> Result<Self> {
        Self::builder(total_value, years).build()
    }

    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn aav(&self) -> f64 {
        self.aav
    }

    pub fn deferred_pct(&self) -> f64 {
        self.deferred_pct
    }

    /// Deferral payout period (already defaulted to `years` when deferred money exists)
    pub fn deferral_years(&self) -> u32 {
        self.deferral_years
    }

    pub fn opt_outs(&self) -> &[u32] {
        &self.opt_outs
    }

    pub fn incentives_total(&self) -> f64 {
        self.incentives_total
    }

    pub fn has_opt_outs(&self) -> bool {
        !self.opt_outs.is_empty()
    }

    pub fn is_opt_out_year(&self, year: u32) -> bool {
        self.opt_outs.binary_search(&year).is_ok()
    }

    /// Portion of total value paid during the active years
    pub fn non_deferred_value(&self) -> f64 {
        self.total_value * (1.0 - self.deferred_pct)
    }

    /// Portion of total value paid after the active years
    pub fn deferred_value(&self) -> f64 {
        self.total_value * self.deferred_pct
    }

    /// Guaranteed salary still owed after `year` at the stated AAV
    pub fn remaining_value_after(&self, year: u32) -> f64 {
        self.aav * self.years.saturating_sub(year) as f64
    }
}

/// Builder for [`ContractStructure`]
#[derive(Debug, Clone)]
pub struct ContractStructureBuilder {
    total_value: f64,
    years: u32,
    aav: f64,
    deferred_pct: f64,
    deferral_years: u32,
    opt_outs: Vec<u32>,
    incentives_total: f64,
}

impl ContractStructureBuilder {
    pub fn new(total_value: f64, years: u32) -> Self {
        Self {
            total_value,
            years,
            aav: 0.0,
            deferred_pct: 0.0,
            deferral_years: 0,
            opt_outs: Vec::new(),
            incentives_total: 0.0,
        }
    }

    /// Explicit AAV; 0 means derive from total value / years
    pub fn aav(mut self, aav: f64) -> Self {
        self.aav = aav;
        self
    }

    /// Deferred fraction and payout period (0 years = same as term)
    pub fn deferral(mut self, deferred_pct: f64, deferral_years: u32) -> Self {
        self.deferred_pct = deferred_pct;
        self.deferral_years = deferral_years;
        self
    }

    pub fn opt_outs(mut self, opt_outs: impl IntoIterator<Item = u32>) -> Self {
        self.opt_outs = opt_outs.into_iter().collect();
        self
    }

    pub fn incentives_total(mut self, incentives_total: f64) -> Self {
        self.incentives_total = incentives_total;
        self
    }

    /// Validate every invariant and fill defaults
    pub fn build(self) -> Result<ContractStructure> {
        if self.years == 0 {
            return Err(ValuationError::contract("years", "must be greater than 0"));
        }
        if !self.total_value.is_finite() || self.total_value < 0.0 {
            return Err(ValuationError::contract(
                "total_value",
                format!("must be a non-negative amount, got {}", self.total_value),
            ));
        }
        if !self.aav.is_finite() || self.aav < 0.0 {
            return Err(ValuationError::contract(
                "aav",
                format!("must be a non-negative amount, got {}", self.aav),
            ));
        }
        if !(0.0..=1.0).contains(&self.deferred_pct) {
            return Err(ValuationError::contract(
                "deferred_pct",
                format!("must be within [0, 1], got {}", self.deferred_pct),
            ));
        }
        if !self.incentives_total.is_finite() || self.incentives_total < 0.0 {
            return Err(ValuationError::contract(
                "incentives_total",
                format!("must be a non-negative amount, got {}", self.incentives_total),
            ));
        }

        let mut opt_outs = self.opt_outs;
        if let Some(&bad) = opt_outs.iter().find(|&&y| y < 1 || y > self.years) {
            return Err(ValuationError::contract(
                "opt_outs",
                format!("opt-out year {} outside [1, {}]", bad, self.years),
            ));
        }
        opt_outs.sort_unstable();
        opt_outs.dedup();

        let aav = if self.aav == 0.0 {
            self.total_value / self.years as f64
        } else {
            self.aav
        };

        let deferral_years = if self.deferred_pct > 0.0 && self.deferral_years == 0 {
            self.years
        } else {
            self.deferral_years
        };

        Ok(ContractStructure {
            total_value: self.total_value,
            years: self.years,
            aav,
            deferred_pct: self.deferred_pct,
            deferral_years,
            opt_outs,
            incentives_total: self.incentives_total,
        })
    }
}

/// A contract structure labelled for comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedStructure {
    pub name: String,
    pub contract: ContractStructure,
}

impl NamedStructure {
    pub fn new(name: impl Into<String>, contract: ContractStructure) -> Self {
        Self { name: name.into(), contract }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aav_derived_when_zero() {
        let c = ContractStructure::simple(300.0, 10).unwrap();
        assert_relative_eq!(c.aav(), 30.0);
    }

    #[test]
    fn test_explicit_aav_kept() {
        let c = ContractStructure::builder(300.0, 10).aav(32.5).build().unwrap();
        assert_relative_eq!(c.aav(), 32.5);
    }

    #[test]
    fn test_deferral_years_default_to_term() {
        let c = ContractStructure::builder(700.0, 10)
            .deferral(0.97, 0)
            .build()
            .unwrap();
        assert_eq!(c.deferral_years(), 10);
        assert_relative_eq!(c.deferred_value(), 679.0, epsilon = 1e-9);
        assert_relative_eq!(c.non_deferred_value(), 21.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_deferral_leaves_period_untouched() {
        let c = ContractStructure::simple(100.0, 5).unwrap();
        assert_eq!(c.deferral_years(), 0);
    }

    #[test]
    fn test_rejects_zero_years() {
        let err = ContractStructure::simple(100.0, 0).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidContract { field: "years", .. }));
    }

    #[test]
    fn test_rejects_deferred_pct_out_of_range() {
        for pct in [-0.1, 1.5] {
            let err = ContractStructure::builder(100.0, 5)
                .deferral(pct, 5)
                .build()
                .unwrap_err();
            assert!(matches!(err, ValuationError::InvalidContract { field: "deferred_pct", .. }));
        }
    }

    #[test]
    fn test_rejects_opt_out_outside_term() {
        for year in [0, 6] {
            let err = ContractStructure::builder(100.0, 5)
                .opt_outs([year])
                .build()
                .unwrap_err();
            assert!(matches!(err, ValuationError::InvalidContract { field: "opt_outs", .. }));
        }
    }

    #[test]
    fn test_opt_outs_sorted_and_deduped() {
        let c = ContractStructure::builder(100.0, 8)
            .opt_outs([5, 2, 5])
            .build()
            .unwrap();
        assert_eq!(c.opt_outs(), &[2, 5]);
        assert!(c.is_opt_out_year(5));
        assert!(!c.is_opt_out_year(3));
    }

    #[test]
    fn test_remaining_value() {
        let c = ContractStructure::simple(200.0, 8).unwrap();
        assert_relative_eq!(c.remaining_value_after(3), 125.0);
        assert_relative_eq!(c.remaining_value_after(8), 0.0);
    }
}
