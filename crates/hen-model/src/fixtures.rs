//! Small reference case study shared by unit and integration tests.
//!
//! One hot process stream (164 → 60 °C, CP 50 kW/K), one cold process stream
//! (40 → 150 °C, CP 40 kW/K), a steam and a cooling-water utility, two
//! enthalpy stages and two operating cases of 4000 h each. The as-built
//! network has two exchangers between the process streams, one per stage,
//! plus a heater on the cold stream and a cooler on the hot stream.

use crate::case_study::{
    BalanceUtility, CaseStudy, Economics, ExchangerCosts, InitialExchanger, OperatingCase,
    Restrictions, Stream, StreamKind, UtilityDemand, UtilityKind, UtilityPricing,
};
use crate::topology::ExchangerAddress;
use hen_core::Real;
use nalgebra::DMatrix;

const KELVIN: Real = 273.15;

fn stream(
    name: &str,
    kind: StreamKind,
    supply_c: Real,
    target_c: Real,
    cp: Real,
    mass_flow: Real,
    utility: Option<(Real, Real)>,
) -> Stream {
    let extreme = match kind {
        StreamKind::Hot => Real::NEG_INFINITY,
        StreamKind::Cold => Real::INFINITY,
    };
    Stream {
        name: name.to_string(),
        kind,
        supply_temperatures: vec![supply_c + KELVIN; 2],
        target_temperatures: vec![target_c + KELVIN; 2],
        film_coefficients: vec![1.0; 2],
        heat_capacities: vec![cp; 2],
        mass_flows: vec![mass_flow; 2],
        extreme_temperatures: vec![extreme; 2],
        utility: utility.map(|(cost, emissions)| UtilityPricing {
            cost_per_kwh: vec![cost; 2],
            emissions_per_kwh: vec![emissions; 2],
        }),
    }
}

pub fn reference_costs() -> ExchangerCosts {
    ExchangerCosts {
        base: 5_000.0,
        specific_area: 300.0,
        degression: 0.8,
        remove: 2_000.0,
        base_split: 1_000.0,
        remove_split: 500.0,
        base_bypass: 800.0,
        remove_bypass: 200.0,
        base_admixer: 900.0,
        remove_admixer: 250.0,
        base_repipe: 1_500.0,
        base_resequence: 700.0,
    }
}

pub fn two_stream_case() -> CaseStudy {
    let hot_streams = vec![
        stream("H1", StreamKind::Hot, 164.0, 60.0, 5.0, 10.0, None),
        stream("steam", StreamKind::Hot, 250.0, 249.0, 1.0, 1_000.0, Some((0.05, 2e-4))),
    ];
    let cold_streams = vec![
        stream("C1", StreamKind::Cold, 40.0, 150.0, 4.0, 10.0, None),
        stream("water", StreamKind::Cold, 15.0, 25.0, 4.18, 100.0, Some((0.01, 1e-5))),
    ];

    let exchangers = vec![
        InitialExchanger {
            address: ExchangerAddress::new(0, 0, 1),
            area: 150.0,
            costs: reference_costs(),
        },
        InitialExchanger {
            address: ExchangerAddress::new(0, 0, 0),
            area: 120.0,
            costs: reference_costs(),
        },
    ];

    let balance = |kind, stream| BalanceUtility {
        kind,
        stream,
        initial_area: 40.0,
        base_cost: 4_000.0,
        specific_area_cost: 250.0,
        degression: 0.8,
        remove_cost: 1_000.0,
    };

    let mut match_costs = DMatrix::zeros(2, 2);
    match_costs[(0, 0)] = 2_500.0;
    match_costs[(1, 0)] = 1_200.0;
    match_costs[(0, 1)] = 1_800.0;

    CaseStudy {
        name: "two-stream".to_string(),
        operating_cases: vec![
            OperatingCase {
                start_hours: 0.0,
                end_hours: 4_000.0,
            },
            OperatingCase {
                start_hours: 4_000.0,
                end_hours: 8_000.0,
            },
        ],
        hot_streams,
        cold_streams,
        enthalpy_stages: 2,
        exchangers,
        balance_utilities: vec![
            balance(UtilityKind::Heating, 0),
            balance(UtilityKind::Cooling, 0),
        ],
        match_costs,
        economics: Economics {
            interest_rate: 0.05,
            depreciation_years: 10.0,
        },
        restrictions: Restrictions {
            max_splits: 1,
            max_bypass_fraction: 0.9,
            max_admix_fraction: 0.9,
            dt_upper_bound: 200.0,
            dt_lower_bound: 5.0,
            minimal_heat_load: 100.0,
            one_mixer_per_exchanger: false,
        },
        initial_duties: DMatrix::from_row_slice(2, 2, &[3_500.0, 0.0, 0.0, 3_800.0]),
        initial_utility_demand: UtilityDemand {
            hot: vec![4.0e6, 3.0e6],
            cold: vec![7.0e6, 6.0e6],
        },
    }
}
