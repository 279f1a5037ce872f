//! Contract Valuation CLI
//!
//! Thin command-line front end over the valuation library

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use contract_valuation::comparison::write_comparison_file;
use contract_valuation::contract::{group_by_player, load_structures};
use contract_valuation::valuation::calculate_npv_at_rates;
use contract_valuation::{
    optimize_bonuses, simulate_opt_out, Assumptions, ContractStructure, IncentiveConfig,
    PlayerProfile, Position, SimulationParams, StructureComparator, UsageRole,
};

#[derive(Parser)]
#[command(
    name = "contract_valuation",
    version,
    about = "Value deferred money, opt-outs and incentives"
)]
struct Cli {
    /// Assumptions directory (aging_curves.csv, market.csv); defaults are built in
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    /// Simulation parameters as JSON
    #[arg(long, global = true)]
    sim_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Contract terms shared by the single-contract commands
#[derive(clap::Args)]
struct Terms {
    /// Total stated value ($M)
    #[arg(long)]
    total_value: f64,

    #[arg(long)]
    years: u32,

    #[arg(long, default_value_t = 0.0)]
    deferred_pct: f64,

    #[arg(long, default_value_t = 0)]
    deferral_years: u32,

    /// Opt-out years, comma separated
    #[arg(long, value_delimiter = ',')]
    opt_outs: Vec<u32>,
}

impl Terms {
    fn contract(&self) -> Result<ContractStructure> {
        ContractStructure::builder(self.total_value, self.years)
            .deferral(self.deferred_pct, self.deferral_years)
            .opt_outs(self.opt_outs.iter().copied())
            .build()
            .context("invalid contract terms")
    }
}

#[derive(Subcommand)]
enum Command {
    /// Present value of a contract at one or more rates
    Npv {
        #[command(flatten)]
        terms: Terms,

        #[arg(long, value_delimiter = ',', default_values_t = vec![0.05])]
        rates: Vec<f64>,
    },
    /// Monte Carlo opt-out simulation
    OptOut {
        #[command(flatten)]
        terms: Terms,

        #[arg(long)]
        skill: f64,

        #[arg(long)]
        age: u32,

        #[arg(long)]
        position: String,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Allocate an incentive pool across usage tiers
    Bonuses {
        #[arg(long)]
        position: String,

        #[arg(long)]
        expected_usage: f64,

        #[arg(long)]
        usage_std: f64,

        #[arg(long)]
        bonus_pool: f64,

        #[arg(long)]
        innings: bool,
    },
    /// Compare every structure in a CSV file for one player
    Compare {
        structures: PathBuf,

        #[arg(long)]
        player: String,

        #[arg(long)]
        skill: f64,

        #[arg(long)]
        age: u32,

        #[arg(long)]
        position: String,

        #[arg(long, default_value_t = 0.05)]
        discount_rate: f64,

        #[arg(long, default_value = "comparison_output.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let assumptions = match &cli.assumptions {
        Some(path) => Assumptions::from_csv_path(path)
            .with_context(|| format!("loading assumptions from {}", path.display()))?,
        None => Assumptions::default_market(),
    };
    let params = match &cli.sim_config {
        Some(path) => SimulationParams::from_json_path(path)
            .with_context(|| format!("loading simulation config from {}", path.display()))?,
        None => SimulationParams::default(),
    };

    match cli.command {
        Command::Npv { terms, rates } => {
            let contract = terms.contract()?;
            let results = calculate_npv_at_rates(&contract, &rates)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::OptOut { terms, skill, age, position, seed } => {
            let contract = terms.contract()?;
            let position: Position = position.parse()?;
            let params = match seed {
                Some(seed) => params.with_seed(seed),
                None => params,
            };
            let player = PlayerProfile::new(skill, age, position);
            let outcome = simulate_opt_out(
                &contract,
                &player,
                assumptions.market_rate,
                &assumptions.aging,
                &params,
            )?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Bonuses { position, expected_usage, usage_std, bonus_pool, innings } => {
            let role = UsageRole::from_position(position.parse()?);
            let config = IncentiveConfig::default();
            let plan =
                optimize_bonuses(role, expected_usage, usage_std, bonus_pool, innings, &config)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Compare { structures, player, skill, age, position, discount_rate, output } => {
            let records = load_structures(&structures)
                .with_context(|| format!("loading structures from {}", structures.display()))?;
            let mut grouped = group_by_player(records);
            let named = grouped
                .remove(&player)
                .with_context(|| format!("no structures for player {}", player))?;

            let profile = PlayerProfile::new(skill, age, position.parse()?);
            let comparator = StructureComparator::with_assumptions(assumptions, &params)
                .with_discount_rate(discount_rate);
            let rows = comparator.compare(&player, &named, &profile)?;

            println!(
                "{:<20} {:>10} {:>10} {:>10} {:>12}",
                "Structure", "Stated", "NPV", "Eff. AAV", "P(opt-out)"
            );
            println!("{}", "-".repeat(66));
            for row in &rows {
                let p = row
                    .opt_out
                    .probability()
                    .map(|p| format!("{:.1}%", p * 100.0))
                    .unwrap_or_else(|| "N/A".to_string());
                println!(
                    "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>12}",
                    row.structure_name, row.total_value, row.npv, row.effective_aav, p
                );
            }

            write_comparison_file(&output, &rows)?;
            println!("\nFull results written to: {}", output.display());
        }
    }

    Ok(())
}
