//! Incentive threshold allocation
//!
//! Picks usage thresholds around a player's expected workload, prices each by
//! the probability of reaching it, and splits a bonus pool across the tiers.

use log::warn;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::assumptions::Position;
use crate::error::{Result, ValuationError};

/// Innings-pitched tiers for starters
const STARTER_INNINGS: [f64; 10] = [
    120.0, 140.0, 150.0, 160.0, 170.0, 180.0, 190.0, 200.0, 210.0, 220.0,
];

/// Innings-pitched tiers for relievers
const RELIEVER_INNINGS: [f64; 8] = [40.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0, 80.0];

/// Games-started tiers for starters
const STARTER_GAMES: [f64; 7] = [20.0, 22.0, 24.0, 26.0, 28.0, 30.0, 32.0];

/// Appearance tiers for relievers
const RELIEVER_GAMES: [f64; 7] = [40.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0];

/// Plate-appearance tiers for position players
const PLATE_APPEARANCES: [f64; 11] = [
    400.0, 450.0, 500.0, 525.0, 550.0, 575.0, 600.0, 625.0, 650.0, 675.0, 700.0,
];

/// Role of the player for incentive purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageRole {
    StartingPitcher,
    ReliefPitcher,
    PositionPlayer,
}

impl UsageRole {
    pub fn from_position(position: Position) -> Self {
        match position {
            Position::StartingPitcher => UsageRole::StartingPitcher,
            Position::ReliefPitcher => UsageRole::ReliefPitcher,
            _ => UsageRole::PositionPlayer,
        }
    }

}

/// Workload statistic the thresholds are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageMetric {
    InningsPitched,
    GamesStarted,
    Appearances,
    PlateAppearances,
}

impl UsageMetric {
    /// Metric for a role; pitchers use innings only when the bonus is innings-based
    pub fn for_role(role: UsageRole, is_rate_based_on_innings: bool) -> Self {
        match (role, is_rate_based_on_innings) {
            (UsageRole::PositionPlayer, _) => UsageMetric::PlateAppearances,
            (_, true) => UsageMetric::InningsPitched,
            (UsageRole::StartingPitcher, false) => UsageMetric::GamesStarted,
            (UsageRole::ReliefPitcher, false) => UsageMetric::Appearances,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UsageMetric::InningsPitched => "IP",
            UsageMetric::GamesStarted => "GS",
            UsageMetric::Appearances => "G",
            UsageMetric::PlateAppearances => "PA",
        }
    }
}

/// Canonical ascending thresholds for a role and metric
pub fn canonical_thresholds(role: UsageRole, metric: UsageMetric) -> &'static [f64] {
    match (role, metric) {
        (UsageRole::ReliefPitcher, UsageMetric::InningsPitched) => &RELIEVER_INNINGS,
        (_, UsageMetric::InningsPitched) => &STARTER_INNINGS,
        (_, UsageMetric::GamesStarted) => &STARTER_GAMES,
        (_, UsageMetric::Appearances) => &RELIEVER_GAMES,
        (_, UsageMetric::PlateAppearances) => &PLATE_APPEARANCES,
    }
}

/// Tunable allocation heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncentiveConfig {
    /// Share of the pool per tier, lowest threshold first; its length caps the tier count
    pub tier_split: Vec<f64>,

    /// Lower edge of the threshold band as a multiple of expected usage
    pub band_low: f64,

    /// Upper edge of the threshold band as a multiple of expected usage
    pub band_high: f64,

    /// Fewer in-band thresholds than this falls back to the full list
    pub min_tiers: usize,
}

impl Default for IncentiveConfig {
    fn default() -> Self {
        Self {
            tier_split: vec![0.40, 0.30, 0.20, 0.10],
            band_low: 0.7,
            band_high: 1.3,
            min_tiers: 3,
        }
    }
}

impl IncentiveConfig {
    pub fn max_tiers(&self) -> usize {
        self.tier_split.len()
    }

    pub fn validate(&self) -> Result<()> {
        let bad_share = self.tier_split.iter().any(|&w| !w.is_finite() || w < 0.0);
        if self.tier_split.is_empty() || bad_share {
            return Err(ValuationError::parameter(
                "tier_split",
                "needs at least one non-negative share",
            ));
        }
        if self.tier_split.iter().sum::<f64>() <= 0.0 {
            return Err(ValuationError::parameter("tier_split", "shares sum to zero"));
        }
        if !(self.band_low >= 0.0 && self.band_low <= self.band_high) {
            return Err(ValuationError::parameter(
                "band_low",
                format!("need 0 <= band_low ({}) <= band_high ({})", self.band_low, self.band_high),
            ));
        }
        if self.min_tiers == 0 || self.min_tiers > self.max_tiers() {
            return Err(ValuationError::parameter(
                "min_tiers",
                format!("need 1 <= min_tiers ({}) <= {}", self.min_tiers, self.max_tiers()),
            ));
        }
        Ok(())
    }
}

/// One incentive tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusTier {
    /// 1-based, lowest threshold first
    pub tier: usize,
    pub threshold: f64,
    pub bonus: f64,

    /// Bonus earned by reaching this tier and every one below it
    pub cumulative_bonus: f64,
    pub probability: f64,

    /// bonus * probability
    pub expected_value: f64,
}

/// Full allocation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusPlan {
    pub role: UsageRole,
    pub metric: UsageMetric,
    pub bonus_pool: f64,
    pub tiers: Vec<BonusTier>,
    pub expected_payout: f64,

    /// Pool money the team expects not to pay
    pub team_savings_expected: f64,

    /// Thresholds came from the full list because too few were in band
    pub used_fallback: bool,
}

/// Probability that usage drawn from N(mean, std) reaches `threshold`, clipped to [0, 1]
pub fn achievement_probability(threshold: f64, mean: f64, std: f64) -> Result<f64> {
    if std == 0.0 {
        return Ok(if threshold <= mean { 1.0 } else { 0.0 });
    }
    let normal = Normal::new(mean, std)
        .map_err(|e| ValuationError::usage("usage_std", e.to_string()))?;
    Ok(normal.sf(threshold).clamp(0.0, 1.0))
}

/// Select thresholds: top `max_tiers` in band, or from the full list when the band is thin
fn select_thresholds(
    all: &[f64],
    expected_usage: f64,
    config: &IncentiveConfig,
) -> (Vec<f64>, bool) {
    let low = expected_usage * config.band_low;
    let high = expected_usage * config.band_high;
    let in_band: Vec<f64> = all.iter().copied().filter(|&t| t >= low && t <= high).collect();

    let (pool, used_fallback) = if in_band.is_empty() || in_band.len() < config.min_tiers {
        (all.to_vec(), true)
    } else {
        (in_band, false)
    };

    let skip = pool.len().saturating_sub(config.max_tiers());
    (pool[skip..].to_vec(), used_fallback)
}

/// Build an incentive plan for one player
pub fn optimize_bonuses(
    role: UsageRole,
    expected_usage: f64,
    usage_std: f64,
    bonus_pool: f64,
    is_rate_based_on_innings: bool,
    config: &IncentiveConfig,
) -> Result<BonusPlan> {
    config.validate()?;
    if !expected_usage.is_finite() || expected_usage <= 0.0 {
        return Err(ValuationError::usage(
            "expected_usage",
            format!("must be positive, got {}", expected_usage),
        ));
    }
    if !usage_std.is_finite() || usage_std < 0.0 {
        return Err(ValuationError::usage(
            "usage_std",
            format!("must be finite and >= 0, got {}", usage_std),
        ));
    }
    if !bonus_pool.is_finite() || bonus_pool < 0.0 {
        return Err(ValuationError::usage(
            "bonus_pool",
            format!("must be finite and >= 0, got {}", bonus_pool),
        ));
    }

    let metric = UsageMetric::for_role(role, is_rate_based_on_innings);
    let (thresholds, used_fallback) =
        select_thresholds(canonical_thresholds(role, metric), expected_usage, config);

    if used_fallback {
        warn!(
            "only a few {} thresholds near expected usage {:.1}; using the full list",
            metric.label(),
            expected_usage
        );
    }

    // Renormalise over the tiers actually used so the pool is fully allocated
    let weights = &config.tier_split[..thresholds.len()];
    let weight_total: f64 = weights.iter().sum();

    let mut tiers = Vec::with_capacity(thresholds.len());
    let mut cumulative_bonus = 0.0;
    for (i, (&threshold, &weight)) in thresholds.iter().zip(weights).enumerate() {
        let bonus = if weight_total > 0.0 {
            bonus_pool * weight / weight_total
        } else {
            0.0
        };
        cumulative_bonus += bonus;
        let probability = achievement_probability(threshold, expected_usage, usage_std)?;

        tiers.push(BonusTier {
            tier: i + 1,
            threshold,
            bonus,
            cumulative_bonus,
            probability,
            expected_value: bonus * probability,
        });
    }

    let expected_payout: f64 = tiers.iter().map(|t| t.expected_value).sum();

    Ok(BonusPlan {
        role,
        metric,
        bonus_pool,
        tiers,
        expected_payout,
        team_savings_expected: bonus_pool - expected_payout,
        used_fallback,
    })
}
