//! Structure comparator for side-by-side valuation tables
//!
//! Holds assumptions and simulation parameters once, then values any number
//! of named structures for a player without rebuilding them.

use std::io::Write;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::contract::NamedStructure;
use crate::error::Result;
use crate::simulation::{OptOutOutcome, OptOutSimulator, PlayerProfile, SimulationParams};
use crate::valuation::{calculate_npv, DEFAULT_DISCOUNT_RATE};

/// Marker written for opt-out fields of structures without a clause
pub const NOT_APPLICABLE: &str = "N/A";

/// Opt-out columns of a comparison row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptOutSummary {
    NotApplicable,
    Simulated {
        probability: f64,
        expected_years_controlled: f64,
        team_risk_score: f64,
        player_flexibility_value: f64,
    },
}

impl OptOutSummary {
    fn from_outcome(outcome: &OptOutOutcome) -> Self {
        match outcome.result() {
            Some(r) => OptOutSummary::Simulated {
                probability: r.opt_out_probability,
                expected_years_controlled: r.expected_years_controlled,
                team_risk_score: r.team_risk_score,
                player_flexibility_value: r.player_flexibility_value,
            },
            None => OptOutSummary::NotApplicable,
        }
    }

    pub fn probability(&self) -> Option<f64> {
        match self {
            OptOutSummary::Simulated { probability, .. } => Some(*probability),
            OptOutSummary::NotApplicable => None,
        }
    }
}

/// One valued structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub player_id: String,
    pub structure_name: String,

    // Contract terms
    pub total_value: f64,
    pub years: u32,
    pub aav: f64,
    pub deferred_pct: f64,
    pub deferral_years: u32,
    pub opt_outs: Vec<u32>,
    pub incentives_total: f64,

    // NPV
    pub npv: f64,
    pub discount_pct: f64,
    pub effective_aav: f64,
    pub annual_savings: f64,

    pub opt_out: OptOutSummary,
}

/// Values named structures for one player at a time
#[derive(Debug, Clone)]
pub struct StructureComparator {
    assumptions: Assumptions,
    params: SimulationParams,
    discount_rate: f64,
}

impl StructureComparator {
    /// Default assumptions, comparison-sized trial count, 5% discounting
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_market(), &SimulationParams::default())
    }

    /// Use `params` with the trial count halved for comparison speed
    pub fn with_assumptions(assumptions: Assumptions, params: &SimulationParams) -> Self {
        Self {
            assumptions,
            params: params.for_comparison(),
            discount_rate: DEFAULT_DISCOUNT_RATE,
        }
    }

    pub fn with_discount_rate(mut self, discount_rate: f64) -> Self {
        self.discount_rate = discount_rate;
        self
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Value every structure for the player and assemble the table
    pub fn compare(
        &self,
        player_id: &str,
        structures: &[NamedStructure],
        player: &PlayerProfile,
    ) -> Result<Vec<ComparisonRow>> {
        let simulator = OptOutSimulator::new(&self.assumptions.aging, self.params.clone())?;

        let rows = structures
            .iter()
            .map(|named| -> Result<ComparisonRow> {
                let contract = &named.contract;
                let npv = calculate_npv(contract, self.discount_rate)?;

                // Structures without a clause never reach the simulator
                let opt_out = if contract.has_opt_outs() {
                    let market_rate = self.assumptions.market_rate;
                    let outcome = simulator.simulate(contract, player, market_rate)?;
                    OptOutSummary::from_outcome(&outcome)
                } else {
                    OptOutSummary::NotApplicable
                };

                debug!(
                    "{} / {}: npv {:.2} ({:.1}% discount), opt-out {:?}",
                    player_id,
                    named.name,
                    npv.npv,
                    npv.discount_pct,
                    opt_out.probability()
                );

                Ok(ComparisonRow {
                    player_id: player_id.to_string(),
                    structure_name: named.name.clone(),
                    total_value: contract.total_value(),
                    years: contract.years(),
                    aav: contract.aav(),
                    deferred_pct: contract.deferred_pct(),
                    deferral_years: contract.deferral_years(),
                    opt_outs: contract.opt_outs().to_vec(),
                    incentives_total: contract.incentives_total(),
                    npv: npv.npv,
                    discount_pct: npv.discount_pct,
                    effective_aav: npv.effective_aav,
                    annual_savings: npv.annual_savings,
                    opt_out,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!("compared {} structures for {}", rows.len(), player_id);
        Ok(rows)
    }
}

impl Default for StructureComparator {
    fn default() -> Self {
        Self::new()
    }
}

const HEADER: [&str; 17] = [
    "player_id",
    "structure_name",
    "total_value",
    "years",
    "aav",
    "deferred_pct",
    "deferral_years",
    "opt_outs",
    "incentives_total",
    "npv",
    "discount_pct",
    "effective_aav",
    "annual_savings",
    "opt_out_probability",
    "expected_years_controlled",
    "team_risk_score",
    "player_flexibility_value",
];

/// Write comparison rows as CSV; opt-out columns read `N/A` when there is no clause
pub fn write_comparison_csv<W: Write>(writer: W, rows: &[ComparisonRow]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;

    for row in rows {
        let opt_outs = row
            .opt_outs
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(";");

        let opt_out_fields: [String; 4] = match row.opt_out {
            OptOutSummary::Simulated {
                probability,
                expected_years_controlled,
                team_risk_score,
                player_flexibility_value,
            } => [
                format!("{:.4}", probability),
                format!("{:.2}", expected_years_controlled),
                format!("{:.1}", team_risk_score),
                format!("{:.2}", player_flexibility_value),
            ],
            OptOutSummary::NotApplicable => std::array::from_fn(|_| NOT_APPLICABLE.to_string()),
        };

        let mut record = vec![
            row.player_id.clone(),
            row.structure_name.clone(),
            format!("{:.2}", row.total_value),
            row.years.to_string(),
            format!("{:.2}", row.aav),
            format!("{:.4}", row.deferred_pct),
            row.deferral_years.to_string(),
            opt_outs,
            format!("{:.2}", row.incentives_total),
            format!("{:.2}", row.npv),
            format!("{:.2}", row.discount_pct),
            format!("{:.2}", row.effective_aav),
            format!("{:.2}", row.annual_savings),
        ];
        record.extend(opt_out_fields);
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// Write comparison rows to a CSV file
pub fn write_comparison_file<P: AsRef<Path>>(path: P, rows: &[ComparisonRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_comparison_csv(file, rows)
}
