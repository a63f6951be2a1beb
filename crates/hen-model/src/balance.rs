//! Balance utility exchangers.
//!
//! After the process exchangers, whatever a stream still lacks to reach its
//! target is supplied by a heater (cold streams) or removed by a cooler (hot
//! streams). A negative load means the process exchangers overshoot the
//! target, which violates the energy balance.

use crate::case_study::{BalanceUtility, CaseStudy, StreamKind, UtilityKind};
use crate::exchanger::overall_coefficient;
use crate::feasibility::Infeasibility;
use crate::thermo::{BoundaryTemperatures, StageTemperatures};
use hen_core::Real;

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceOperation {
    pub kind: UtilityKind,
    pub stream: usize,
    /// Load per operating case (kW)
    pub heat_loads: Vec<Real>,
    pub terminals: Vec<BoundaryTemperatures>,
    pub needed_areas: Vec<Real>,
    pub area: Real,
    pub costs: Real,
}

impl BalanceOperation {
    pub fn resolve(case: &CaseStudy, balance: &BalanceUtility, temperatures: &StageTemperatures) -> Self {
        let side = balance.kind.process_side();
        let process = case.stream(side, balance.stream);
        let utility = case.balance_utility_stream(balance.kind);
        let n_oc = case.number_operating_cases();

        let mut heat_loads = Vec::with_capacity(n_oc);
        let mut terminals = Vec::with_capacity(n_oc);
        let mut needed_areas = Vec::with_capacity(n_oc);
        for oc in 0..n_oc {
            let cp = process.heat_capacity_flow(oc);
            let target = process.target_temperatures[oc];
            let (load, terminal) = match (balance.kind, utility) {
                (UtilityKind::Heating, Some(u)) => {
                    let inlet = temperatures.cold_outlet(balance.stream, oc);
                    let t = BoundaryTemperatures {
                        hot_in: u.supply_temperatures[oc],
                        hot_out: u.target_temperatures[oc],
                        cold_in: inlet,
                        cold_out: target,
                    };
                    (cp * (target - inlet), t)
                }
                (UtilityKind::Cooling, Some(u)) => {
                    let inlet = temperatures.hot_outlet(balance.stream, oc);
                    let t = BoundaryTemperatures {
                        hot_in: inlet,
                        hot_out: target,
                        cold_in: u.supply_temperatures[oc],
                        cold_out: u.target_temperatures[oc],
                    };
                    (cp * (inlet - target), t)
                }
                (_, None) => (0.0, nan_terminal()),
            };

            let u_overall = match (side, utility) {
                (StreamKind::Cold, Some(u)) => {
                    overall_coefficient(u.film_coefficients[oc], process.film_coefficients[oc])
                }
                (StreamKind::Hot, Some(u)) => {
                    overall_coefficient(process.film_coefficients[oc], u.film_coefficients[oc])
                }
                (_, None) => Real::NAN,
            };
            let lmtd = terminal.log_mean();
            let needed = if load > 0.0 && lmtd > 0.0 {
                load / (u_overall * lmtd)
            } else {
                0.0
            };

            heat_loads.push(load);
            terminals.push(terminal);
            needed_areas.push(needed);
        }

        let area = needed_areas.iter().copied().fold(0.0, Real::max);
        let costs = if area > balance.initial_area {
            balance.base_cost
                + balance.specific_area_cost * (area - balance.initial_area).powf(balance.degression)
        } else if area <= 0.0 && balance.initial_area > 0.0 {
            balance.remove_cost
        } else {
            0.0
        };

        Self {
            kind: balance.kind,
            stream: balance.stream,
            heat_loads,
            terminals,
            needed_areas,
            area,
            costs,
        }
    }

    /// One violation per operating case with a negative load.
    pub fn energy_balance(&self) -> Infeasibility {
        let mut check = Infeasibility::default();
        for load in &self.heat_loads {
            check.record(*load < 0.0);
        }
        check
    }
}

fn nan_terminal() -> BoundaryTemperatures {
    BoundaryTemperatures {
        hot_in: Real::NAN,
        hot_out: Real::NAN,
        cold_in: Real::NAN,
        cold_out: Real::NAN,
    }
}
