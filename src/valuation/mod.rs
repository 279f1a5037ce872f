//! NPV engine: discounting contract payment schedules into present value

mod discount;
mod implied;
mod npv;

pub use discount::DiscountCurve;
pub use implied::implied_discount_rate;
pub use npv::{
    calculate_npv, calculate_npv_at_rates, calculate_npv_on_curve, payment_schedule, CashFlow,
    NPVBreakdown, NPVResult, DEFAULT_DISCOUNT_RATE,
};
