//! End-to-end evaluation of a small retrofit case built from engineering units.

use hen_core::units::{degc, hours, raw};
use hen_model::{
    BalanceUtility, CaseStudy, Economics, ExchangerAddress, ExchangerCosts, InitialExchanger,
    NetworkState, OperatingCase, Restrictions, Stream, StreamKind, Topology, UtilityDemand,
    UtilityKind, UtilityPricing,
};
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn celsius(v: f64) -> f64 {
    raw::kelvin(degc(v))
}

fn stream(name: &str, kind: StreamKind, supply: f64, target: f64, cp_flow: f64, pricing: Option<f64>) -> Stream {
    let extreme = match kind {
        StreamKind::Hot => f64::NEG_INFINITY,
        StreamKind::Cold => f64::INFINITY,
    };
    Stream {
        name: name.into(),
        kind,
        supply_temperatures: vec![celsius(supply); 2],
        target_temperatures: vec![celsius(target); 2],
        film_coefficients: vec![1.0; 2],
        heat_capacities: vec![1.0; 2],
        mass_flows: vec![cp_flow; 2],
        extreme_temperatures: vec![extreme; 2],
        utility: pricing.map(|cost| UtilityPricing {
            cost_per_kwh: vec![cost; 2],
            emissions_per_kwh: vec![1e-4; 2],
        }),
    }
}

fn case() -> CaseStudy {
    let costs = ExchangerCosts {
        base: 10_000.0,
        specific_area: 400.0,
        degression: 0.7,
        remove: 3_000.0,
        ..ExchangerCosts::default()
    };
    let balance = |kind, stream| BalanceUtility {
        kind,
        stream,
        initial_area: 30.0,
        base_cost: 5_000.0,
        specific_area_cost: 200.0,
        degression: 0.7,
        remove_cost: 500.0,
    };
    let half_year = raw::hours(hours(4_000.0));
    CaseStudy {
        name: "end-to-end".into(),
        operating_cases: vec![
            OperatingCase { start_hours: 0.0, end_hours: half_year },
            OperatingCase { start_hours: half_year, end_hours: 2.0 * half_year },
        ],
        hot_streams: vec![
            stream("H1", StreamKind::Hot, 164.0, 60.0, 50.0, None),
            stream("HP steam", StreamKind::Hot, 250.0, 249.0, 1_000.0, Some(0.05)),
        ],
        cold_streams: vec![
            stream("C1", StreamKind::Cold, 40.0, 150.0, 40.0, None),
            stream("CW", StreamKind::Cold, 15.0, 25.0, 400.0, Some(0.01)),
        ],
        enthalpy_stages: 2,
        exchangers: vec![
            InitialExchanger { address: ExchangerAddress::new(0, 0, 1), area: 160.0, costs: costs.clone() },
            InitialExchanger { address: ExchangerAddress::new(0, 0, 0), area: 210.0, costs },
        ],
        balance_utilities: vec![balance(UtilityKind::Heating, 0), balance(UtilityKind::Cooling, 0)],
        match_costs: DMatrix::from_element(2, 2, 2_000.0),
        economics: Economics { interest_rate: 0.08, depreciation_years: 15.0 },
        restrictions: Restrictions::default(),
        initial_duties: DMatrix::from_row_slice(2, 2, &[3_500.0, 0.0, 0.0, 3_800.0]),
        initial_utility_demand: UtilityDemand { hot: vec![3.6e6, 2.4e6], cold: vec![6.8e6, 5.6e6] },
    }
    .validated()
    .expect("case validates")
}

#[test]
fn stage_temperatures_match_hand_calculation() {
    let case = case();
    let mut rng = StdRng::seed_from_u64(2024);
    let state = NetworkState::evaluate(&case, &case.initial_topology(), &case.initial_duties, &mut rng).unwrap();

    let t = &state.temperatures;
    // 3500 kW at CP 50 kW/K in the upper stage
    assert!((t.at(StreamKind::Hot, 0, 1, 0) - celsius(94.0)).abs() < 1e-9);
    assert!((t.at(StreamKind::Hot, 0, 0, 0) - celsius(94.0)).abs() < 1e-9);
    // 3800 kW in the lower stage of case 1
    assert!((t.hot_outlet(0, 1) - celsius(88.0)).abs() < 1e-9);
    assert!((t.cold_outlet(0, 0) - celsius(127.5)).abs() < 1e-9);
    assert!((t.cold_outlet(0, 1) - celsius(135.0)).abs() < 1e-9);

    assert!(state.is_feasible());
    // the initial demand equals what the as-built network draws
    assert!((state.operating_costs - case.initial_operating_costs()).abs() < 1e-6);
    assert!((state.operating_emissions - case.initial_operating_emissions()).abs() < 1e-9);
}

#[test]
fn as_built_areas_fit_and_new_match_is_charged() {
    let case = case();
    let mut rng = StdRng::seed_from_u64(5);
    let state = NetworkState::evaluate(&case, &case.initial_topology(), &case.initial_duties, &mut rng).unwrap();
    // both exchangers fit inside their installed area
    assert!(state.areas().iter().zip(&case.exchangers).all(|(a, e)| *a <= e.area));
    assert_eq!(state.capital.exchangers, 0.0);
    assert_eq!(state.capital.matches, 0.0);

    // replace the lower exchanger with a cooler on cooling water
    let topology = Topology::new(vec![ExchangerAddress::new(0, 0, 1), ExchangerAddress::new(0, 1, 0)]);
    let duties = DMatrix::from_row_slice(2, 2, &[3_500.0, 3_500.0, 1_000.0, 1_000.0]);
    let state = NetworkState::evaluate(&case, &topology, &duties, &mut rng).unwrap();
    assert_eq!(state.capital.matches, 2_000.0);
    // 1000 kW for 4000 h now drawn from cooling water per case
    assert!(state.cold_utility_demand[0] > 4.0e6 - 1e-3);
    assert!(state.total_annual_cost() > state.operating_costs);
}
