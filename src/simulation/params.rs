//! Simulation configuration with documented defaults

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuationError};

/// Parameters for the opt-out Monte Carlo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Number of independent trials
    pub trial_count: usize,

    /// Standard deviation of the yearly skill draw (skill units)
    pub skill_std: f64,

    /// Annual growth of the market price of skill
    pub market_inflation_rate: f64,

    /// Annual probability of an injury season
    pub injury_rate: f64,

    /// Multiplier applied to skill in an injury season
    pub injury_skill_factor: f64,

    /// Age beyond which no new contract years are projected
    pub max_career_age: u32,

    /// Floor on the length of a projected new contract
    pub min_new_contract_years: u32,

    /// Cap on the length of a projected new contract
    pub max_new_contract_years: u32,

    /// Premium over remaining guaranteed money required to opt out (0.10 = 10%)
    pub required_premium: f64,

    /// Number of most recent seasons averaged when projecting the new contract
    pub trailing_window: usize,

    /// Base seed; None draws one from entropy per run
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            trial_count: 10_000,
            skill_std: 1.0,
            market_inflation_rate: 0.03,
            injury_rate: 0.10,
            injury_skill_factor: 0.5,
            max_career_age: 40,
            min_new_contract_years: 3,
            max_new_contract_years: 7,
            required_premium: 0.10,
            trailing_window: 3,
            seed: None,
        }
    }
}

impl SimulationParams {
    /// Same parameters with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trial_count(mut self, trial_count: usize) -> Self {
        self.trial_count = trial_count;
        self
    }

    /// Reduced trial count used when comparing many structures
    pub fn for_comparison(&self) -> Self {
        Self {
            trial_count: (self.trial_count / 2).max(1),
            ..self.clone()
        }
    }

    /// Load from a JSON file; missing keys take their defaults
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let params: Self = serde_json::from_reader(file)?;
        params.validate()?;
        Ok(params)
    }

    /// Reject out-of-range parameters before any trial runs
    pub fn validate(&self) -> Result<()> {
        if self.trial_count == 0 {
            return Err(ValuationError::parameter("trial_count", "must be at least 1"));
        }
        if !self.skill_std.is_finite() || self.skill_std < 0.0 {
            return Err(ValuationError::parameter(
                "skill_std",
                format!("must be finite and >= 0, got {}", self.skill_std),
            ));
        }
        check_unit_interval("market_inflation_rate", self.market_inflation_rate)?;
        check_unit_interval("injury_rate", self.injury_rate)?;
        check_unit_interval("injury_skill_factor", self.injury_skill_factor)?;
        if self.min_new_contract_years == 0
            || self.min_new_contract_years > self.max_new_contract_years
        {
            return Err(ValuationError::parameter(
                "min_new_contract_years",
                format!(
                    "need 1 <= min ({}) <= max ({})",
                    self.min_new_contract_years, self.max_new_contract_years
                ),
            ));
        }
        if !self.required_premium.is_finite() || self.required_premium < 0.0 {
            return Err(ValuationError::parameter(
                "required_premium",
                format!("must be finite and >= 0, got {}", self.required_premium),
            ));
        }
        if self.trailing_window == 0 {
            return Err(ValuationError::parameter("trailing_window", "must be at least 1"));
        }
        Ok(())
    }

    /// Length of the hypothetical new contract for a player of `age`
    pub fn new_contract_years(&self, age: u32) -> u32 {
        let remaining_career = self.max_career_age.saturating_sub(age);
        remaining_career.clamp(self.min_new_contract_years, self.max_new_contract_years)
    }
}

fn check_unit_interval(field: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValuationError::parameter(
            field,
            format!("must be within [0, 1], got {}", value),
        ));
    }
    Ok(())
}
