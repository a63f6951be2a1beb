//! Constraint bookkeeping shared by every feasibility check.

use hen_core::Real;
use std::ops::{Add, AddAssign};

/// Number of violated constraints found by one check.
///
/// The optimizers use the squared count as a smooth penalty, so a check never
/// fails hard: it only reports how far away from feasible the network is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Infeasibility {
    pub violations: usize,
}

impl Infeasibility {
    pub fn is_infeasible(&self) -> bool {
        self.violations > 0
    }

    pub fn quadratic_distance(&self) -> Real {
        let n = self.violations as Real;
        n * n
    }

    /// Count a violation when `violated` holds.
    pub fn record(&mut self, violated: bool) {
        if violated {
            self.violations += 1;
        }
    }
}

impl Add for Infeasibility {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            violations: self.violations + rhs.violations,
        }
    }
}

impl AddAssign for Infeasibility {
    fn add_assign(&mut self, rhs: Self) {
        self.violations += rhs.violations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_count() {
        let mut check = Infeasibility::default();
        assert!(!check.is_infeasible());
        check.record(true);
        check.record(false);
        check.record(true);
        check.record(true);
        assert!(check.is_infeasible());
        assert_eq!(check.quadratic_distance(), 9.0);
        assert_eq!((check + check).violations, 6);
    }
}
