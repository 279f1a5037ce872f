//! Aggregate opt-out simulation output

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::TrialOutcome;
use super::SimulationParams;

/// Exercise statistics for one opt-out year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptOutYearStats {
    pub count: usize,
    pub probability: f64,
}

/// Population-level summary of all trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptOutSimulationResult {
    pub opt_out_probability: f64,

    /// Mean seasons the team keeps the player
    pub expected_years_controlled: f64,

    /// Keyed by opt-out year; every clause year is present, exercised or not
    pub by_year: BTreeMap<u32, OptOutYearStats>,

    /// Opt-out probability on a 0-100 scale
    pub team_risk_score: f64,

    /// Mean (projected new value - remaining value) over exercising trials
    pub player_flexibility_value: f64,

    /// Mean projected new-contract value over exercising trials
    pub mean_exercise_value: Option<f64>,

    /// Fraction of trials with at least one injury season
    pub injured_trial_fraction: f64,

    pub trial_count: usize,

    /// Seed the trials were derived from
    pub base_seed: u64,

    pub params: SimulationParams,
}

impl OptOutSimulationResult {
    /// Reduce completed trials into summary statistics
    pub fn from_trials(
        outcomes: &[TrialOutcome],
        opt_out_years: &[u32],
        params: &SimulationParams,
        base_seed: u64,
    ) -> Self {
        let n = outcomes.len().max(1) as f64;

        let mut by_year: BTreeMap<u32, OptOutYearStats> = opt_out_years
            .iter()
            .map(|&y| (y, OptOutYearStats { count: 0, probability: 0.0 }))
            .collect();

        let mut exercised = 0usize;
        let mut gain_total = 0.0;
        let mut value_total = 0.0;
        for outcome in outcomes.iter().filter(|o| o.opted_out) {
            exercised += 1;
            gain_total += outcome.flexibility_gain();
            value_total += outcome.projected_new_value;
            if let Some(year) = outcome.opt_out_year {
                by_year
                    .entry(year)
                    .or_insert(OptOutYearStats { count: 0, probability: 0.0 })
                    .count += 1;
            }
        }
        for stats in by_year.values_mut() {
            stats.probability = stats.count as f64 / n;
        }

        let opt_out_probability = exercised as f64 / n;
        let expected_years_controlled =
            outcomes.iter().map(|o| o.years_played as f64).sum::<f64>() / n;
        let injured = outcomes.iter().filter(|o| o.injured).count();

        let (player_flexibility_value, mean_exercise_value) = if exercised > 0 {
            (gain_total / exercised as f64, Some(value_total / exercised as f64))
        } else {
            (0.0, None)
        };

        Self {
            opt_out_probability,
            expected_years_controlled,
            by_year,
            team_risk_score: opt_out_probability * 100.0,
            player_flexibility_value,
            mean_exercise_value,
            injured_trial_fraction: injured as f64 / n,
            trial_count: outcomes.len(),
            base_seed,
            params: params.clone(),
        }
    }

    /// Number of trials that exercised an opt-out
    pub fn exercised_count(&self) -> usize {
        self.by_year.values().map(|s| s.count).sum()
    }
}

/// Simulation outcome, keeping "no clause" apart from "clause never exercised"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptOutOutcome {
    /// Contract has no opt-out clauses; nothing was simulated
    NotApplicable,
    Simulated(OptOutSimulationResult),
}

impl OptOutOutcome {
    pub fn is_applicable(&self) -> bool {
        matches!(self, OptOutOutcome::Simulated(_))
    }

    pub fn result(&self) -> Option<&OptOutSimulationResult> {
        match self {
            OptOutOutcome::Simulated(result) => Some(result),
            OptOutOutcome::NotApplicable => None,
        }
    }

    pub fn opt_out_probability(&self) -> Option<f64> {
        self.result().map(|r| r.opt_out_probability)
    }
}
