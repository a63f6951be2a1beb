//! Network evaluation.
//!
//! [`NetworkState::evaluate`] is the single entry point used by the
//! optimizers: it propagates stage temperatures, resolves every exchanger
//! and balance utility, and prices the result against the as-built network.

use crate::balance::BalanceOperation;
use crate::case_study::{CaseStudy, StreamKind, UtilityKind, UtilityPricing};
use crate::costs::{self, CapitalCosts};
use crate::error::{ModelError, ModelResult};
use crate::exchanger::{ExchangerOperation, MixerType};
use crate::feasibility::Infeasibility;
use crate::thermo::StageTemperatures;
use crate::topology::Topology;
use hen_core::Real;
use nalgebra::DMatrix;
use rand::Rng;
use tracing::trace;

/// Evaluated network for one (topology, duties) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkState {
    /// Topology with mixer flags set wherever the resolution placed a mixer
    pub topology: Topology,
    pub duties: DMatrix<Real>,
    pub temperatures: StageTemperatures,
    pub exchangers: Vec<ExchangerOperation>,
    pub balance: Vec<BalanceOperation>,
    /// Hot utility demand per operating case (kWh)
    pub hot_utility_demand: Vec<Real>,
    /// Cold utility demand per operating case (kWh)
    pub cold_utility_demand: Vec<Real>,
    pub capital: CapitalCosts,
    pub annuity_factor: Real,
    pub operating_costs: Real,
    pub operating_emissions: Real,
}

impl NetworkState {
    pub fn evaluate<R: Rng + ?Sized>(
        case: &CaseStudy,
        topology: &Topology,
        duties: &DMatrix<Real>,
        rng: &mut R,
    ) -> ModelResult<Self> {
        check_inputs(case, topology, duties)?;

        let temperatures = StageTemperatures::propagate(case, topology, duties);
        let exchangers: Vec<ExchangerOperation> = topology
            .iter()
            .enumerate()
            .map(|(i, address)| ExchangerOperation::resolve(case, i, address, duties, &temperatures, rng))
            .collect();

        let mut effective = topology.clone();
        for (address, op) in effective.addresses_mut().iter_mut().zip(&exchangers) {
            if !address.exists {
                continue;
            }
            address.bypass_hot |= op.uses(MixerType::BypassHot);
            address.admixer_hot |= op.uses(MixerType::AdmixerHot);
            address.bypass_cold |= op.uses(MixerType::BypassCold);
            address.admixer_cold |= op.uses(MixerType::AdmixerCold);
        }

        let balance: Vec<BalanceOperation> = case
            .balance_utilities
            .iter()
            .map(|b| BalanceOperation::resolve(case, b, &temperatures))
            .collect();

        let initial = case.initial_topology();
        let capital = CapitalCosts {
            exchangers: costs::exchanger_costs(case, &effective, &exchangers),
            mixers: costs::mixer_costs(case, &effective),
            balance_exchangers: balance.iter().map(|b| b.costs).sum(),
            splits: costs::split_costs(case, &initial, &effective),
            repipe: costs::repipe_costs(case, &initial, &effective),
            resequence: costs::resequence_costs(case, &initial, &effective),
            matches: costs::match_costs(case, &initial, &effective),
        };

        let mut state = Self {
            topology: effective,
            duties: duties.clone(),
            temperatures,
            exchangers,
            balance,
            hot_utility_demand: Vec::new(),
            cold_utility_demand: Vec::new(),
            capital,
            annuity_factor: case.economics.annuity_factor(),
            operating_costs: 0.0,
            operating_emissions: 0.0,
        };
        state.price_utilities(case);

        trace!(
            tac = state.total_annual_cost(),
            emissions = state.operating_emissions,
            feasible = state.is_feasible(),
            "network evaluated"
        );
        Ok(state)
    }

    /// Utility demand from utility-side exchangers and balance loads, priced
    /// per operating case.
    fn price_utilities(&mut self, case: &CaseStudy) {
        let n_oc = case.number_operating_cases();
        let mut hot = vec![0.0; n_oc];
        let mut cold = vec![0.0; n_oc];
        let mut cost = 0.0;
        let mut emissions = 0.0;

        let mut charge = |pricing: Option<&UtilityPricing>, energy: Real, oc: usize| {
            if let Some(p) = pricing {
                cost += energy * p.cost_per_kwh[oc];
                emissions += energy * p.emissions_per_kwh[oc];
            }
        };

        for (address, op) in self.topology.iter().zip(&self.exchangers) {
            if !address.exists {
                continue;
            }
            let hot_stream = case.stream(StreamKind::Hot, address.hot_stream);
            let cold_stream = case.stream(StreamKind::Cold, address.cold_stream);
            for (oc, point) in op.points.iter().enumerate() {
                let energy = point.heat_load * case.operating_cases[oc].duration();
                if hot_stream.is_utility() {
                    hot[oc] += energy;
                    charge(hot_stream.utility.as_ref(), energy, oc);
                }
                if cold_stream.is_utility() {
                    cold[oc] += energy;
                    charge(cold_stream.utility.as_ref(), energy, oc);
                }
            }
        }

        for b in &self.balance {
            let pricing = case
                .balance_utility_stream(b.kind)
                .and_then(|s| s.utility.as_ref());
            let demand = match b.kind {
                UtilityKind::Heating => &mut hot,
                UtilityKind::Cooling => &mut cold,
            };
            for (oc, load) in b.heat_loads.iter().enumerate() {
                let energy = load * case.operating_cases[oc].duration();
                demand[oc] += energy;
                charge(pricing, energy, oc);
            }
        }

        self.hot_utility_demand = hot;
        self.cold_utility_demand = cold;
        self.operating_costs = cost;
        self.operating_emissions = emissions;
    }

    pub fn capital_costs(&self) -> Real {
        self.capital.total()
    }

    pub fn total_annual_cost(&self) -> Real {
        self.annuity_factor * self.capital_costs() + self.operating_costs
    }

    /// Negative utility demand and negative balance loads.
    pub fn energy_balance(&self) -> Infeasibility {
        let mut check = Infeasibility::default();
        for demand in self.hot_utility_demand.iter().chain(&self.cold_utility_demand) {
            check.record(*demand < 0.0);
        }
        self.balance
            .iter()
            .fold(check, |acc, b| acc + b.energy_balance())
    }

    pub fn exchangers_feasible(&self) -> bool {
        self.exchangers.iter().all(ExchangerOperation::is_feasible)
    }

    pub fn is_feasible(&self) -> bool {
        self.exchangers_feasible() && !self.energy_balance().is_infeasible()
    }

    /// Sum of all quadratic penalties; zero exactly when feasible.
    pub fn quadratic_distance(&self) -> Real {
        self.exchangers
            .iter()
            .map(ExchangerOperation::quadratic_distance)
            .sum::<Real>()
            + self.energy_balance().quadratic_distance()
    }

    pub fn areas(&self) -> Vec<Real> {
        self.exchangers.iter().map(|e| e.area).collect()
    }
}

fn check_inputs(case: &CaseStudy, topology: &Topology, duties: &DMatrix<Real>) -> ModelResult<()> {
    let n_ex = case.number_exchangers();
    let dimension = |what: &str, expected: usize, found: usize| {
        if expected == found {
            Ok(())
        } else {
            Err(ModelError::Dimension {
                what: what.to_string(),
                expected,
                found,
            })
        }
    };
    dimension("topology rows", n_ex, topology.len())?;
    dimension("duty rows", n_ex, duties.nrows())?;
    dimension("duty columns", case.number_operating_cases(), duties.ncols())?;

    let (n_hot, n_cold) = (case.hot_streams.len(), case.cold_streams.len());
    for address in topology.iter() {
        let indices = [
            ("topology hot stream", address.hot_stream, n_hot),
            ("topology cold stream", address.cold_stream, n_cold),
            ("topology enthalpy stage", address.stage, case.enthalpy_stages),
        ];
        for (what, index, len) in indices {
            if index >= len {
                return Err(ModelError::StreamIndex { what, index, len });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::two_stream_case;
    use crate::topology::ExchangerAddress;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn evaluate(case: &CaseStudy, topology: &Topology, duties: &DMatrix<Real>) -> NetworkState {
        let mut rng = StdRng::seed_from_u64(11);
        NetworkState::evaluate(case, topology, duties, &mut rng).unwrap()
    }

    #[test]
    fn as_built_network_is_feasible() {
        let case = two_stream_case();
        let state = evaluate(&case, &case.initial_topology(), &case.initial_duties);
        assert!(state.is_feasible());
        assert_eq!(state.quadratic_distance(), 0.0);
        // heater 900 / 600 kW and cooler 1700 / 1400 kW over 4000 h each
        assert!((state.hot_utility_demand[0] - 3.6e6).abs() < 1e-3);
        assert!((state.hot_utility_demand[1] - 2.4e6).abs() < 1e-3);
        assert!((state.cold_utility_demand[0] - 6.8e6).abs() < 1e-3);
        assert!((state.cold_utility_demand[1] - 5.6e6).abs() < 1e-3);
        let expected_cost = (3.6e6 + 2.4e6) * 0.05 + (6.8e6 + 5.6e6) * 0.01;
        assert!((state.operating_costs - expected_cost).abs() < 1e-6);
        assert!(state.total_annual_cost() >= state.operating_costs);
    }

    #[test]
    fn removing_everything_pays_removal_and_more_utility() {
        let case = two_stream_case();
        let topology = Topology::new(vec![ExchangerAddress::removed(); 2]);
        let duties = DMatrix::zeros(2, 2);
        let state = evaluate(&case, &topology, &duties);
        assert_eq!(state.capital.exchangers, 2.0 * 2_000.0);
        assert_eq!(state.capital.splits, 0.0);
        // full duties now come from the utilities: 40·110 and 50·104 kW
        assert!((state.balance[0].heat_loads[0] - 4_400.0).abs() < 1e-6);
        assert!((state.balance[1].heat_loads[0] - 5_200.0).abs() < 1e-6);
        assert!(state.is_feasible());
    }

    #[test]
    fn overshoot_is_infeasible_with_positive_distance() {
        let case = two_stream_case();
        let duties = DMatrix::from_row_slice(2, 2, &[4_000.0, 0.0, 1_400.0, 0.0]);
        let state = evaluate(&case, &case.initial_topology(), &duties);
        assert!(!state.is_feasible());
        assert!(state.quadratic_distance() > 0.0);
    }

    #[test]
    fn mixer_flags_reach_the_effective_topology() {
        let case = two_stream_case();
        let duties = DMatrix::from_row_slice(2, 2, &[3_500.0, 2_000.0, 0.0, 3_800.0]);
        let state = evaluate(&case, &case.initial_topology(), &duties);
        let a = &state.topology[0];
        assert!(a.bypass_hot || a.admixer_hot || a.bypass_cold || a.admixer_cold);
        assert!(state.capital.mixers > 0.0);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let case = two_stream_case();
        let mut rng = StdRng::seed_from_u64(0);
        let duties = DMatrix::zeros(3, 2);
        let err = NetworkState::evaluate(&case, &case.initial_topology(), &duties, &mut rng).unwrap_err();
        assert!(matches!(err, ModelError::Dimension { expected: 2, found: 3, .. }));

        let topology = Topology::new(vec![ExchangerAddress::new(5, 0, 0), ExchangerAddress::removed()]);
        let err = NetworkState::evaluate(&case, &topology, &case.initial_duties, &mut rng).unwrap_err();
        assert!(matches!(err, ModelError::StreamIndex { index: 5, .. }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn feasibility_matches_exchanger_and_balance_checks(
                fractions in proptest::collection::vec(0.0f64..=1.0, 4),
                removed in proptest::collection::vec(any::<bool>(), 2),
                seed in any::<u64>(),
            ) {
                let case = two_stream_case();
                let addresses = case
                    .initial_topology()
                    .iter()
                    .zip(&removed)
                    .map(|(a, &gone)| if gone { ExchangerAddress::removed() } else { *a })
                    .collect();
                let topology = Topology::new(addresses);
                let min_load = case.restrictions.minimal_heat_load;
                // each cell within [min(minimal load, capacity), capacity]
                let duties = DMatrix::from_fn(2, 2, |e, oc| {
                    let upper = case.max_heat_load(&topology[e], oc);
                    let lower = min_load.min(upper);
                    lower + fractions[2 * e + oc] * (upper - lower)
                });

                let mut rng = StdRng::seed_from_u64(seed);
                let state = NetworkState::evaluate(&case, &topology, &duties, &mut rng).unwrap();
                let expected = state.exchangers.iter().all(ExchangerOperation::is_feasible)
                    && !state.energy_balance().is_infeasible();
                prop_assert_eq!(state.is_feasible(), expected);
                prop_assert_eq!(state.quadratic_distance() == 0.0, state.is_feasible());
            }
        }
    }
}
