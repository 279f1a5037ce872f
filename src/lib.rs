//! Contract Valuation - structure valuation engine for professional sports contracts
//!
//! This library provides:
//! - Present value of split immediate/deferred payment schedules
//! - Monte Carlo estimation of opt-out exercise under aging, noise and injury
//! - Incentive threshold selection and bonus pool allocation
//! - Side-by-side comparison of alternative structures for one player

pub mod assumptions;
pub mod comparison;
pub mod contract;
pub mod error;
pub mod incentives;
pub mod simulation;
pub mod valuation;

// Re-export commonly used types
pub use assumptions::{AgingCurves, Assumptions, DeclineRateProvider, Position};
pub use comparison::{ComparisonRow, OptOutSummary, StructureComparator};
pub use contract::{ContractStructure, NamedStructure};
pub use error::ValuationError;
pub use incentives::{optimize_bonuses, BonusPlan, BonusTier, IncentiveConfig, UsageRole};
pub use simulation::{
    simulate_opt_out, OptOutOutcome, OptOutSimulationResult, OptOutSimulator, PlayerProfile,
    SimulationParams,
};
pub use valuation::{calculate_npv, NPVResult};
