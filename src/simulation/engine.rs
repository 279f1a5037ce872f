//! Monte Carlo opt-out engine
//!
//! Each trial projects a skill path under aging, noise and injury shocks and
//! applies the exercise rule at every opt-out year. Trials are independent:
//! each owns its `TrialState` and a ChaCha stream keyed by trial index, so a
//! fixed seed gives identical results however rayon schedules the work.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::result::{OptOutOutcome, OptOutSimulationResult};
use super::state::{TrialOutcome, TrialState};
use super::SimulationParams;
use crate::assumptions::{DeclineRateProvider, Position};
use crate::contract::ContractStructure;
use crate::error::{Result, ValuationError};

/// Player inputs consumed from the scouting collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Current skill metric (e.g. wins above replacement per season)
    pub current_skill: f64,
    pub age: u32,
    pub position: Position,
}

impl PlayerProfile {
    pub fn new(current_skill: f64, age: u32, position: Position) -> Self {
        Self { current_skill, age, position }
    }
}

/// Opt-out simulator bound to an aging provider and a parameter set
pub struct OptOutSimulator<'a> {
    aging: &'a dyn DeclineRateProvider,
    params: SimulationParams,
}

/// Read-only inputs shared by every trial of one run
struct TrialInputs<'c> {
    contract: &'c ContractStructure,
    current_skill: f64,
    decline_rate: f64,
    market_rate: f64,
    new_contract_years: u32,
}

impl<'a> OptOutSimulator<'a> {
    pub fn new(aging: &'a dyn DeclineRateProvider, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { aging, params })
    }

    /// Simulate exercise of every opt-out clause in `contract`
    ///
    /// `market_rate` is the price of one skill unit in the first contract year.
    pub fn simulate(
        &self,
        contract: &ContractStructure,
        player: &PlayerProfile,
        market_rate: f64,
    ) -> Result<OptOutOutcome> {
        if !contract.has_opt_outs() {
            return Ok(OptOutOutcome::NotApplicable);
        }

        if !player.current_skill.is_finite() {
            return Err(ValuationError::parameter("current_skill", "must be finite"));
        }
        if !market_rate.is_finite() || market_rate < 0.0 {
            return Err(ValuationError::parameter(
                "market_rate",
                format!("must be finite and >= 0, got {}", market_rate),
            ));
        }
        let decline_rate = self.aging.decline_rate(player.position);
        if !decline_rate.is_finite() || decline_rate <= 0.0 {
            return Err(ValuationError::parameter(
                "decline_rate",
                format!("aging provider returned {} for {}", decline_rate, player.position),
            ));
        }

        let inputs = TrialInputs {
            contract,
            current_skill: player.current_skill,
            decline_rate,
            market_rate,
            new_contract_years: self.params.new_contract_years(player.age),
        };

        let base_seed = self.params.seed.unwrap_or_else(rand::random);

        // Reduction barrier: statistics only after every trial has decided
        let outcomes: Vec<TrialOutcome> = (0..self.params.trial_count)
            .into_par_iter()
            .map(|trial| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
                rng.set_stream(trial as u64);
                self.run_trial(&inputs, &mut rng)
            })
            .collect();

        let result = OptOutSimulationResult::from_trials(
            &outcomes,
            contract.opt_outs(),
            &self.params,
            base_seed,
        );

        debug!(
            "opt-out simulation: {} trials, p={:.3}, expected years {:.2}, flexibility {:.2}",
            result.trial_count,
            result.opt_out_probability,
            result.expected_years_controlled,
            result.player_flexibility_value
        );

        Ok(OptOutOutcome::Simulated(result))
    }

    /// Play one contract path to its end or to an exercised opt-out
    fn run_trial<R: Rng>(&self, inputs: &TrialInputs<'_>, rng: &mut R) -> TrialOutcome {
        let contract = inputs.contract;
        let mut state = TrialState::new(contract.years());

        for year in 1..=contract.years() {
            let expected_skill = inputs.current_skill * inputs.decline_rate.powi(year as i32);
            let z: f64 = rng.sample(StandardNormal);
            let mut actual_skill = (expected_skill + self.params.skill_std * z).max(0.0);

            if rng.gen_bool(self.params.injury_rate) {
                actual_skill *= self.params.injury_skill_factor;
                state.injured = true;
            }
            state.record_season(actual_skill);

            if contract.is_opt_out_year(year) {
                let remaining_value = contract.remaining_value_after(year);
                let projected_new_value = self.projected_new_contract_value(inputs, &state);

                if projected_new_value > remaining_value * (1.0 + self.params.required_premium) {
                    return TrialOutcome::exercised(&state, remaining_value, projected_new_value);
                }
            }
        }

        TrialOutcome::completed(&state)
    }

    /// Market value of the contract a player would sign after opting out now
    fn projected_new_contract_value(&self, inputs: &TrialInputs<'_>, state: &TrialState) -> f64 {
        let recent_skill = state.trailing_mean(self.params.trailing_window);
        let inflation = (1.0 + self.params.market_inflation_rate).powi(state.year as i32);
        let price = inputs.market_rate * inflation;

        (1..=inputs.new_contract_years)
            .map(|i| recent_skill * inputs.decline_rate.powi(i as i32) * price)
            .sum()
    }
}

/// Convenience wrapper: validate, simulate and return in one call
pub fn simulate_opt_out(
    contract: &ContractStructure,
    player: &PlayerProfile,
    market_rate: f64,
    aging: &dyn DeclineRateProvider,
    params: &SimulationParams,
) -> Result<OptOutOutcome> {
    OptOutSimulator::new(aging, params.clone())?.simulate(contract, player, market_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::AgingCurves;
    use approx::assert_relative_eq;

    fn opt_out_contract() -> ContractStructure {
        ContractStructure::builder(300.0, 10)
            .opt_outs([3, 5])
            .build()
            .unwrap()
    }

    fn params(trials: usize) -> SimulationParams {
        SimulationParams::default().with_trial_count(trials).with_seed(42)
    }

    fn probability(outcome: &OptOutOutcome) -> f64 {
        outcome.opt_out_probability().expect("simulated")
    }

    #[test]
    fn test_no_opt_outs_is_not_applicable() {
        let aging = AgingCurves::default_curves();
        let contract = ContractStructure::simple(300.0, 10).unwrap();
        let player = PlayerProfile::new(6.0, 28, Position::Shortstop);

        let outcome = simulate_opt_out(&contract, &player, 8.0, &aging, &params(100)).unwrap();
        assert_eq!(outcome, OptOutOutcome::NotApplicable);
        assert!(!outcome.is_applicable());
        assert!(outcome.opt_out_probability().is_none());
    }

    #[test]
    fn test_invalid_params_rejected_before_running() {
        let aging = AgingCurves::default_curves();
        let bad = SimulationParams {
            injury_rate: -0.2,
            ..params(100)
        };
        assert!(OptOutSimulator::new(&aging, bad).is_err());

        let bad = SimulationParams {
            skill_std: -1.0,
            ..params(100)
        };
        let player = PlayerProfile::new(6.0, 28, Position::Shortstop);
        assert!(simulate_opt_out(&opt_out_contract(), &player, 8.0, &aging, &bad).is_err());
    }

    #[test]
    fn test_negative_market_rate_rejected() {
        let aging = AgingCurves::default_curves();
        let simulator = OptOutSimulator::new(&aging, params(10)).unwrap();
        let player = PlayerProfile::new(6.0, 28, Position::Shortstop);
        assert!(simulator.simulate(&opt_out_contract(), &player, -1.0).is_err());
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let aging = AgingCurves::default_curves();
        let player = PlayerProfile::new(6.0, 28, Position::Shortstop);
        let contract = opt_out_contract();

        let a = simulate_opt_out(&contract, &player, 8.0, &aging, &params(2_000)).unwrap();
        let b = simulate_opt_out(&contract, &player, 8.0, &aging, &params(2_000)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_probability_monotone_in_skill() {
        let aging = AgingCurves::default_curves();
        let simulator = OptOutSimulator::new(&aging, params(4_000)).unwrap();
        let contract = opt_out_contract();

        let probabilities: Vec<f64> = [2.0, 4.0, 6.0, 8.0, 10.0]
            .iter()
            .map(|&skill| {
                let player = PlayerProfile::new(skill, 28, Position::Shortstop);
                probability(&simulator.simulate(&contract, &player, 8.0).unwrap())
            })
            .collect();

        for pair in probabilities.windows(2) {
            assert!(pair[1] + 0.01 >= pair[0], "{:?}", probabilities);
        }
        assert!(probabilities[4] > probabilities[0] + 0.5, "{:?}", probabilities);
    }

    #[test]
    fn test_star_always_opts_out_at_first_chance() {
        let aging = AgingCurves::default_curves();
        let player = PlayerProfile::new(50.0, 28, Position::Shortstop);
        let outcome =
            simulate_opt_out(&opt_out_contract(), &player, 8.0, &aging, &params(500)).unwrap();
        let result = outcome.result().unwrap();

        assert_relative_eq!(result.opt_out_probability, 1.0);
        assert_relative_eq!(result.expected_years_controlled, 3.0);
        assert_eq!(result.by_year[&3].count, 500);
        assert_eq!(result.by_year[&5].count, 0);
        assert!(result.player_flexibility_value > 0.0);
        assert_relative_eq!(result.team_risk_score, 100.0);
    }

    #[test]
    fn test_zero_skill_never_opts_out() {
        let aging = AgingCurves::default_curves();
        let player = PlayerProfile::new(0.0, 30, Position::Catcher);
        let quiet = SimulationParams {
            skill_std: 0.0,
            ..params(300)
        };
        let contract = ContractStructure::builder(100.0, 5)
            .opt_outs([2, 5])
            .build()
            .unwrap();

        let result = simulate_opt_out(&contract, &player, 8.0, &aging, &quiet)
            .unwrap()
            .result()
            .cloned()
            .unwrap();
        assert_eq!(result.opt_out_probability, 0.0);
        assert_relative_eq!(result.expected_years_controlled, 5.0);
        assert_eq!(result.player_flexibility_value, 0.0);
    }

    #[test]
    fn test_statistics_consistent() {
        let aging = AgingCurves::default_curves();
        let player = PlayerProfile::new(6.0, 28, Position::Shortstop);
        let contract = opt_out_contract();
        let result = simulate_opt_out(&contract, &player, 8.0, &aging, &params(3_000))
            .unwrap()
            .result()
            .cloned()
            .unwrap();

        assert!((0.0..=1.0).contains(&result.opt_out_probability));
        let years = result.expected_years_controlled;
        assert!((3.0..=10.0).contains(&years), "expected years {}", years);
        let exercised = (result.opt_out_probability * result.trial_count as f64).round() as usize;
        assert_eq!(result.exercised_count(), exercised);
        assert_relative_eq!(result.team_risk_score, result.opt_out_probability * 100.0);
        assert_eq!(result.trial_count, 3_000);
    }

    #[test]
    fn test_injury_rate_one_marks_every_trial() {
        let aging = AgingCurves::default_curves();
        let player = PlayerProfile::new(6.0, 28, Position::Shortstop);
        let always_hurt = SimulationParams {
            injury_rate: 1.0,
            ..params(200)
        };
        let result = simulate_opt_out(&opt_out_contract(), &player, 8.0, &aging, &always_hurt)
            .unwrap()
            .result()
            .cloned()
            .unwrap();
        assert_relative_eq!(result.injured_trial_fraction, 1.0);
    }

    #[test]
    fn test_higher_premium_lowers_exercise() {
        let aging = AgingCurves::default_curves();
        let player = PlayerProfile::new(6.0, 28, Position::Shortstop);
        let contract = opt_out_contract();

        let base = simulate_opt_out(&contract, &player, 8.0, &aging, &params(3_000)).unwrap();
        let demanding = SimulationParams {
            required_premium: 0.5,
            ..params(3_000)
        };
        let strict = simulate_opt_out(&contract, &player, 8.0, &aging, &demanding).unwrap();
        assert!(probability(&strict) <= probability(&base));
    }
}
