//! Fitness of an evaluated network.
//!
//! All fitness components are maximised. Feasible networks are scored
//! relative to the as-built operating costs and emissions; infeasible ones
//! get `1/(2 + distance)` in every component, which stays below the score of
//! any reasonable feasible retrofit while still rewarding smaller violations.

use crate::error::{OptimResult, invalid};
use hen_core::Real;
use hen_model::{CaseStudy, NetworkState};

/// Offset of the infeasible-network penalty.
pub const INFEASIBLE_OFFSET: Real = 2.0;

/// Upper bound of any normalised ratio, so inverse fitness and the
/// hypervolume reference stay finite.
pub const RATIO_CAP: Real = 1.0e6;

/// Weights of the scalar mode over total annual cost, capital costs,
/// operating costs and operating emissions.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectiveWeights {
    pub total_annual_cost: Real,
    pub capital_costs: Real,
    pub operating_costs: Real,
    pub operating_emissions: Real,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            total_annual_cost: 1.0,
            capital_costs: 0.0,
            operating_costs: 0.0,
            operating_emissions: 0.0,
        }
    }
}

impl ObjectiveWeights {
    fn as_array(&self) -> [Real; 4] {
        [
            self.total_annual_cost,
            self.capital_costs,
            self.operating_costs,
            self.operating_emissions,
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum FitnessMode {
    /// Two objectives: total annual cost and operating emissions
    #[default]
    Pareto,
    /// One objective: inverse weighted sum of normalised objectives
    Weighted(ObjectiveWeights),
}

impl FitnessMode {
    pub fn objective_count(&self) -> usize {
        match self {
            FitnessMode::Pareto => 2,
            FitnessMode::Weighted(_) => 1,
        }
    }

    pub fn validate(&self) -> OptimResult<()> {
        if let FitnessMode::Weighted(w) = self {
            let weights = w.as_array();
            if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(invalid("objective weights must be finite and non-negative"));
            }
            if weights.iter().sum::<Real>() <= 0.0 {
                return Err(invalid("at least one objective weight must be positive"));
            }
        }
        Ok(())
    }
}

/// Normalisation references taken from the as-built network.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectiveScale {
    pub operating_costs: Real,
    pub operating_emissions: Real,
}

impl ObjectiveScale {
    pub fn from_case(case: &CaseStudy) -> Self {
        Self {
            operating_costs: case.initial_operating_costs(),
            operating_emissions: case.initial_operating_emissions(),
        }
    }

    pub fn fitness(&self, mode: &FitnessMode, network: &NetworkState) -> Vec<Real> {
        if !network.is_feasible() {
            return penalty(network.quadratic_distance(), mode.objective_count());
        }
        match mode {
            FitnessMode::Pareto => vec![
                ratio(self.operating_costs, network.total_annual_cost()),
                ratio(self.operating_emissions, network.operating_emissions),
            ],
            FitnessMode::Weighted(w) => {
                // money terms are scaled by the as-built operating costs
                let normalised = [
                    ratio(network.total_annual_cost(), self.operating_costs),
                    ratio(network.capital_costs(), self.operating_costs),
                    ratio(network.operating_costs, self.operating_costs),
                    ratio(network.operating_emissions, self.operating_emissions),
                ];
                let sum: Real = w.as_array().iter().zip(normalised).map(|(w, n)| w * n).sum();
                vec![ratio(1.0, sum)]
            }
        }
    }
}

/// Fitness vector with every component equal to `1/(offset + distance)`.
pub fn pseudo_fitness(offset: Real, distance: Real, objectives: usize) -> Vec<Real> {
    vec![1.0 / (offset + distance); objectives]
}

fn penalty(distance: Real, objectives: usize) -> Vec<Real> {
    pseudo_fitness(INFEASIBLE_OFFSET, distance, objectives)
}

/// `num/den` capped at [`RATIO_CAP`]. A vanishing pair counts as parity.
fn ratio(num: Real, den: Real) -> Real {
    if den > 0.0 {
        (num / den).min(RATIO_CAP)
    } else if num > 0.0 {
        RATIO_CAP
    } else {
        1.0
    }
}
