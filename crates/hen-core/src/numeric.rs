use crate::HenError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HenError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HenError::NonFinite { quantity: what, value: v })
    }
}

/// Logarithmic mean of two positive temperature differences.
///
/// Returns NaN when either difference is non-positive (temperature cross).
pub fn log_mean(dt_a: Real, dt_b: Real) -> Real {
    if dt_a == dt_b {
        return dt_a;
    }
    if !(dt_a > 0.0 && dt_b > 0.0) {
        return Real::NAN;
    }
    (dt_a - dt_b) / (dt_a / dt_b).ln()
}

/// Capital recovery factor for interest rate `i` over `years`.
pub fn annuity_factor(interest_rate: Real, years: Real) -> Real {
    if interest_rate == 0.0 {
        return 1.0 / years;
    }
    let growth = (1.0 + interest_rate).powf(years);
    interest_rate * growth / (growth - 1.0)
}
