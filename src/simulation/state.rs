//! Per-trial state for one simulated contract path

/// State owned by a single trial; dropped once the trial's outcome is taken
#[derive(Debug, Clone)]
pub struct TrialState {
    /// Contract year being simulated (1-indexed, 0 before the first season)
    pub year: u32,

    /// Realised skill by season
    trajectory: Vec<f64>,

    /// Whether any season was hit by injury
    pub injured: bool,
}

impl TrialState {
    pub fn new(years: u32) -> Self {
        Self {
            year: 0,
            trajectory: Vec::with_capacity(years as usize),
            injured: false,
        }
    }

    /// Record the realised skill for the next season
    pub fn record_season(&mut self, skill: f64) {
        self.year += 1;
        self.trajectory.push(skill);
    }

    pub fn trajectory(&self) -> &[f64] {
        &self.trajectory
    }

    /// Mean of the last `window` seasons (fewer if not yet played)
    pub fn trailing_mean(&self, window: usize) -> f64 {
        let n = window.min(self.trajectory.len());
        if n == 0 {
            return 0.0;
        }
        let recent = &self.trajectory[self.trajectory.len() - n..];
        recent.iter().sum::<f64>() / n as f64
    }
}

/// What one trial contributes to the aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialOutcome {
    pub opted_out: bool,
    pub opt_out_year: Option<u32>,
    pub years_played: u32,

    /// Guaranteed money given up at exercise
    pub remaining_value: f64,

    /// Projected value of the new contract at exercise
    pub projected_new_value: f64,

    pub injured: bool,
}

impl TrialOutcome {
    /// Trial that played out the full term
    pub fn completed(state: &TrialState) -> Self {
        Self {
            opted_out: false,
            opt_out_year: None,
            years_played: state.year,
            remaining_value: 0.0,
            projected_new_value: 0.0,
            injured: state.injured,
        }
    }

    /// Trial that ended at an opt-out
    pub fn exercised(state: &TrialState, remaining_value: f64, projected_new_value: f64) -> Self {
        Self {
            opted_out: true,
            opt_out_year: Some(state.year),
            years_played: state.year,
            remaining_value,
            projected_new_value,
            injured: state.injured,
        }
    }

    /// Gain to the player from exercising
    pub fn flexibility_gain(&self) -> f64 {
        self.projected_new_value - self.remaining_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trailing_mean_uses_available_seasons() {
        let mut state = TrialState::new(5);
        assert_eq!(state.trailing_mean(3), 0.0);

        state.record_season(4.0);
        assert_relative_eq!(state.trailing_mean(3), 4.0);

        state.record_season(2.0);
        assert_relative_eq!(state.trailing_mean(3), 3.0);

        state.record_season(6.0);
        state.record_season(1.0);
        assert_relative_eq!(state.trailing_mean(3), 3.0);
        assert_relative_eq!(state.trailing_mean(1), 1.0);
        assert_eq!(state.year, 4);
        assert_eq!(state.trajectory(), &[4.0, 2.0, 6.0, 1.0]);
    }

    #[test]
    fn test_outcomes() {
        let mut state = TrialState::new(4);
        state.record_season(5.0);
        state.record_season(5.0);

        let exercised = TrialOutcome::exercised(&state, 60.0, 90.0);
        assert_eq!(exercised.opt_out_year, Some(2));
        assert_relative_eq!(exercised.flexibility_gain(), 30.0);

        state.record_season(5.0);
        state.record_season(5.0);
        let completed = TrialOutcome::completed(&state);
        assert!(!completed.opted_out);
        assert_eq!(completed.years_played, 4);
    }
}
