//! Opt-out Monte Carlo simulation

mod engine;
mod params;
mod result;
mod state;

pub use engine::{simulate_opt_out, OptOutSimulator, PlayerProfile};
pub use params::SimulationParams;
pub use result::{OptOutOutcome, OptOutSimulationResult, OptOutYearStats};
pub use state::{TrialOutcome, TrialState};
