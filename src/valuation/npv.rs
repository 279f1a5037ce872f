//! Net present value of a contract's split immediate/deferred payment schedule

use serde::{Deserialize, Serialize};

use super::DiscountCurve;
use crate::contract::ContractStructure;
use crate::error::Result;

/// Default annual discount rate
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.05;

/// One scheduled payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Years from signing (0 = first payment)
    pub year: u32,
    pub amount: f64,
    pub present_value: f64,
    /// Paid after the active term
    pub deferred: bool,
}

/// Present value split between the two payment streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NPVBreakdown {
    pub non_deferred_pv: f64,
    pub deferred_pv: f64,
}

/// Result of discounting a contract structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NPVResult {
    pub discount_rate: f64,
    pub stated_value: f64,
    pub npv: f64,

    /// Stated value minus NPV
    pub discount_amount: f64,

    /// Discount as a percentage of stated value
    pub discount_pct: f64,

    pub stated_aav: f64,

    /// NPV-equivalent annual charge (luxury-tax AAV)
    pub effective_aav: f64,

    /// Stated AAV minus effective AAV
    pub annual_savings: f64,

    pub breakdown: NPVBreakdown,

    cash_flows: Vec<CashFlow>,
}

impl NPVResult {
    /// Full payment schedule, immediate payments first
    pub fn cash_flows(&self) -> &[CashFlow] {
        &self.cash_flows
    }

    /// NPV as a fraction of stated value
    pub fn npv_ratio(&self) -> f64 {
        if self.stated_value > 0.0 {
            self.npv / self.stated_value
        } else {
            1.0
        }
    }
}

/// Build the payment schedule for a contract, discounted on `curve`
///
/// Active-term money is paid in `years` equal installments at t = 0..years-1.
/// Deferred money is paid in `deferral_years` equal installments starting at t = years.
pub fn payment_schedule(contract: &ContractStructure, curve: &DiscountCurve) -> Vec<CashFlow> {
    let years = contract.years();
    let mut flows = Vec::with_capacity((years + contract.deferral_years()) as usize);

    let payment = contract.non_deferred_value() / years as f64;
    for year in 0..years {
        flows.push(CashFlow {
            year,
            amount: payment,
            present_value: payment * curve.discount_factor(year),
            deferred: false,
        });
    }

    // deferred_pct == 0 never touches the deferred stream
    if contract.deferred_pct() > 0.0 && contract.deferral_years() > 0 {
        let deferred_payment = contract.deferred_value() / contract.deferral_years() as f64;
        for year in years..years + contract.deferral_years() {
            flows.push(CashFlow {
                year,
                amount: deferred_payment,
                present_value: deferred_payment * curve.discount_factor(year),
                deferred: true,
            });
        }
    }

    flows
}

/// Discount a contract on an arbitrary curve
pub fn calculate_npv_on_curve(contract: &ContractStructure, curve: &DiscountCurve) -> NPVResult {
    let cash_flows = payment_schedule(contract, curve);

    let (deferred, immediate): (Vec<&CashFlow>, Vec<&CashFlow>) =
        cash_flows.iter().partition(|cf| cf.deferred);
    let non_deferred_pv: f64 = immediate.iter().map(|cf| cf.present_value).sum();
    let deferred_pv: f64 = deferred.iter().map(|cf| cf.present_value).sum();

    let npv = non_deferred_pv + deferred_pv;
    let stated_value = contract.total_value();
    let discount_amount = stated_value - npv;
    let discount_pct = if stated_value > 0.0 {
        discount_amount / stated_value * 100.0
    } else {
        0.0
    };

    let effective_aav = npv / contract.years() as f64;

    NPVResult {
        discount_rate: curve.annual_rate,
        stated_value,
        npv,
        discount_amount,
        discount_pct,
        stated_aav: contract.aav(),
        effective_aav,
        annual_savings: contract.aav() - effective_aav,
        breakdown: NPVBreakdown {
            non_deferred_pv,
            deferred_pv,
        },
        cash_flows,
    }
}

/// Discount a contract at a flat annual rate
pub fn calculate_npv(contract: &ContractStructure, discount_rate: f64) -> Result<NPVResult> {
    let curve = DiscountCurve::single_rate(discount_rate)?;
    Ok(calculate_npv_on_curve(contract, &curve))
}

/// NPV at each of several rates, for sensitivity tables
pub fn calculate_npv_at_rates(
    contract: &ContractStructure,
    rates: &[f64],
) -> Result<Vec<NPVResult>> {
    rates.iter().map(|&rate| calculate_npv(contract, rate)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn plain_dcf(total: f64, years: u32, rate: f64) -> f64 {
        let payment = total / years as f64;
        (0..years).map(|t| payment / (1.0 + rate).powi(t as i32)).sum()
    }

    #[test]
    fn test_deferred_money_scenario() {
        let contract = ContractStructure::builder(700.0, 10)
            .deferral(0.97, 10)
            .build()
            .unwrap();
        let result = calculate_npv(&contract, 0.05).unwrap();

        // Deferred stream dominates and is pushed out 10-19 years
        let ratio = result.npv_ratio();
        assert!(ratio > 0.4 && ratio < 0.7, "npv ratio {}", ratio);
        assert_relative_eq!(ratio, result.npv / 700.0);
        assert!(result.breakdown.deferred_pv > result.breakdown.non_deferred_pv);
        assert_relative_eq!(result.effective_aav, result.npv / 10.0);
        assert_relative_eq!(result.annual_savings, 70.0 - result.effective_aav, epsilon = 1e-9);
        assert_eq!(result.cash_flows().len(), 20);
    }

    #[test]
    fn test_standard_discounting_scenario() {
        let contract = ContractStructure::simple(300.0, 10).unwrap();
        let result = calculate_npv(&contract, 0.05).unwrap();

        assert!(result.npv < 300.0);
        assert!(result.npv > 0.7 * 300.0);
        assert_abs_diff_eq!(result.breakdown.deferred_pv, 0.0);
    }

    #[test]
    fn test_no_deferral_matches_plain_dcf() {
        for (total, years, rate) in [(300.0, 10, 0.05), (42.0, 3, 0.0), (1.0, 7, 0.12)] {
            let contract = ContractStructure::simple(total, years).unwrap();
            let result = calculate_npv(&contract, rate).unwrap();
            assert_relative_eq!(result.npv, plain_dcf(total, years, rate), epsilon = 1e-9);
            assert!(result.cash_flows().iter().all(|cf| !cf.deferred));
        }
    }

    #[test]
    fn test_single_year_is_undiscounted() {
        let contract = ContractStructure::simple(35.0, 1).unwrap();
        for rate in [0.0, 0.05, 0.5, 3.0] {
            let result = calculate_npv(&contract, rate).unwrap();
            assert_eq!(result.npv, 35.0);
        }
    }

    #[test]
    fn test_npv_non_increasing_in_rate() {
        let contract = ContractStructure::builder(365.0, 12)
            .deferral(0.3, 8)
            .build()
            .unwrap();
        let rates: Vec<f64> = (0..20).map(|i| i as f64 * 0.01).collect();
        let results = calculate_npv_at_rates(&contract, &rates).unwrap();
        for pair in results.windows(2) {
            assert!(pair[1].npv <= pair[0].npv);
        }
    }

    #[test]
    fn test_zero_rate_returns_stated_value() {
        let contract = ContractStructure::builder(100.0, 4)
            .deferral(0.5, 0)
            .build()
            .unwrap();
        let result = calculate_npv(&contract, 0.0).unwrap();
        assert_relative_eq!(result.npv, 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.npv_ratio(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.discount_pct, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fully_deferred_contract() {
        let contract = ContractStructure::builder(100.0, 5)
            .deferral(1.0, 5)
            .build()
            .unwrap();
        let result = calculate_npv(&contract, 0.05).unwrap();
        assert_abs_diff_eq!(result.breakdown.non_deferred_pv, 0.0);
        assert!(result.cash_flows().iter().filter(|cf| cf.deferred).all(|cf| cf.year >= 5));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let contract = ContractStructure::simple(10.0, 2).unwrap();
        assert!(calculate_npv(&contract, -0.02).is_err());
    }
}
