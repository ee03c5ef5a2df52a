//! Net present value of projected monthly cashflows

/// Calculate the Net Present Value of a series of cash flows.
///
/// # Arguments
/// * `cashflows` - Cash flows per period (positive = inflow, negative = outflow)
/// * `period_rate` - Discount rate per period
///
/// The first cash flow is not discounted.
pub fn calculate_npv(cashflows: &[f64], period_rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + period_rate).powi(t as i32))
        .sum()
}

/// Monthly rate equivalent to an annual effective rate
pub fn monthly_rate_from_annual(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}
