//! Lambert W function, real branches W₀ and W₋₁.
//!
//! Both branches are evaluated with Halley's iteration from an asymptotic
//! starting guess. Arguments outside the branch domain return NaN.

use crate::Real;
use std::f64::consts::E;

const MAX_ITERATIONS: usize = 64;
const REL_TOL: Real = 1e-15;
const BRANCH_POINT: Real = -1.0 / E;

/// Principal branch, defined on `[-1/e, ∞)` with `W₀ ≥ -1`.
pub fn lambert_w0(x: Real) -> Real {
    if x.is_nan() || x < BRANCH_POINT - 1e-15 {
        return Real::NAN;
    }
    if x <= BRANCH_POINT {
        return -1.0;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return Real::INFINITY;
    }

    let guess = if x < -0.25 {
        branch_point_series((2.0 * (E * x + 1.0)).sqrt())
    } else if x <= E {
        // Winitzki approximation
        let l = (1.0 + x).ln();
        l * (1.0 - (1.0 + l).ln() / (2.0 + l))
    } else {
        let l1 = x.ln();
        let l2 = l1.ln();
        l1 - l2 + l2 / l1
    };
    halley(x, guess)
}

/// Lower branch, defined on `[-1/e, 0)` with `W₋₁ ≤ -1`.
pub fn lambert_wm1(x: Real) -> Real {
    if x.is_nan() || x < BRANCH_POINT - 1e-15 || x >= 0.0 {
        return Real::NAN;
    }
    if x <= BRANCH_POINT {
        return -1.0;
    }

    let guess = if x < -0.25 {
        branch_point_series(-(2.0 * (E * x + 1.0)).sqrt())
    } else {
        let l1 = (-x).ln();
        let l2 = (-l1).ln();
        l1 - l2 + l2 / l1
    };
    halley(x, guess)
}

fn branch_point_series(p: Real) -> Real {
    -1.0 + p - p * p / 3.0 + 11.0 / 72.0 * p * p * p
}

fn halley(x: Real, mut w: Real) -> Real {
    for _ in 0..MAX_ITERATIONS {
        let ew = w.exp();
        let f = w * ew - x;
        if f == 0.0 {
            break;
        }
        let wp1 = w + 1.0;
        if wp1 == 0.0 {
            break;
        }
        let denom = ew * wp1 - (w + 2.0) * f / (2.0 * wp1);
        let next = w - f / denom;
        if !next.is_finite() {
            break;
        }
        let converged = (next - w).abs() <= REL_TOL * (1.0 + next.abs());
        w = next;
        if converged {
            break;
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert!((lambert_w0(E) - 1.0).abs() < 1e-12);
        assert!((lambert_w0(1.0) - 0.567_143_290_409_783_8).abs() < 1e-12);
        assert!((lambert_wm1(-0.1) + 3.577_152_063_957_297).abs() < 1e-10);
        assert_eq!(lambert_w0(BRANCH_POINT), -1.0);
        assert_eq!(lambert_wm1(BRANCH_POINT), -1.0);
    }

    #[test]
    fn out_of_domain_is_nan() {
        assert!(lambert_w0(-1.0).is_nan());
        assert!(lambert_wm1(0.5).is_nan());
        assert!(lambert_wm1(0.0).is_nan());
        assert!(lambert_w0(Real::NAN).is_nan());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn w0_inverts_w_exp_w(x in -0.367_f64..50.0) {
                let w = lambert_w0(x);
                prop_assert!(w >= -1.0);
                prop_assert!((w * w.exp() - x).abs() <= 1e-9 * (1.0 + x.abs()));
            }

            #[test]
            fn wm1_inverts_w_exp_w(x in -0.367_f64..-1e-6) {
                let w = lambert_wm1(x);
                prop_assert!(w <= -1.0);
                prop_assert!((w * w.exp() - x).abs() <= 1e-9 * (1.0 + x.abs()));
            }
        }
    }
}
