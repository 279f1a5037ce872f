//! Implied discount rate
//!
//! Finds the flat annual rate at which a contract's NPV equals a target value,
//! e.g. the rate that reconciles a reported present value with stated terms.

use super::npv::payment_schedule;
use super::DiscountCurve;
use crate::contract::ContractStructure;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;
const MAX_RATE: f64 = 10.0;

/// Solve for the annual rate at which `contract` is worth `target_npv`
///
/// Uses Newton-Raphson with a bisection fallback.
///
/// # Returns
/// * `Option<f64>` - Annual rate, or None if no non-negative rate reaches the target
pub fn implied_discount_rate(contract: &ContractStructure, target_npv: f64) -> Option<f64> {
    let payments: Vec<(u32, f64)> = payment_schedule(contract, &DiscountCurve::default())
        .into_iter()
        .map(|cf| (cf.year, cf.amount))
        .collect();

    // NPV falls from stated value at r = 0 towards the t = 0 payment as r grows
    let undiscounted = npv_at_rate(&payments, 0.0);
    if target_npv > undiscounted + TOLERANCE || target_npv <= 0.0 {
        return None;
    }
    if (target_npv - undiscounted).abs() < TOLERANCE {
        return Some(0.0);
    }

    let mut rate = 0.05;
    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(&payments, rate);

        if dnpv.abs() < 1e-20 {
            return implied_rate_bisection(&payments, target_npv);
        }

        let new_rate = (rate - (npv - target_npv) / dnpv).clamp(0.0, MAX_RATE);

        if (new_rate - rate).abs() < TOLERANCE {
            return Some(new_rate);
        }
        rate = new_rate;
    }

    implied_rate_bisection(&payments, target_npv)
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(payments: &[(u32, f64)], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for &(t, amount) in payments {
        npv += amount / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= t as f64 * amount / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

fn npv_at_rate(payments: &[(u32, f64)], rate: f64) -> f64 {
    payments
        .iter()
        .map(|&(t, amount)| amount / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Fallback solve using bisection on [0, MAX_RATE]
fn implied_rate_bisection(payments: &[(u32, f64)], target_npv: f64) -> Option<f64> {
    let mut low = 0.0_f64;
    let mut high = MAX_RATE;

    if npv_at_rate(payments, high) > target_npv {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let diff = npv_at_rate(payments, mid) - target_npv;

        if diff.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        // NPV is decreasing in rate
        if diff > 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::calculate_npv;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_recovers_rate_used_for_npv() {
        let contract = ContractStructure::builder(700.0, 10)
            .deferral(0.97, 10)
            .build()
            .unwrap();
        let npv = calculate_npv(&contract, 0.0443).unwrap().npv;

        let rate = implied_discount_rate(&contract, npv).unwrap();
        assert_abs_diff_eq!(rate, 0.0443, epsilon = 1e-6);
    }

    #[test]
    fn test_target_at_stated_value_is_zero_rate() {
        let contract = ContractStructure::simple(120.0, 6).unwrap();
        assert_eq!(implied_discount_rate(&contract, 120.0), Some(0.0));
    }

    #[test]
    fn test_target_above_stated_value_has_no_rate() {
        let contract = ContractStructure::simple(120.0, 6).unwrap();
        assert!(implied_discount_rate(&contract, 130.0).is_none());
        assert!(implied_discount_rate(&contract, 0.0).is_none());
    }
}
