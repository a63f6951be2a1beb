use hen_model::fixtures::two_stream_case;
use hen_project::{ProjectError, load_algorithm_yaml, load_case_yaml};
use std::path::{Path, PathBuf};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data").join(name)
}

#[test]
fn reference_case_matches_fixture() {
    let loaded = load_case_yaml(&data("two_stream_retrofit.yaml"))
        .unwrap_or_else(|e| panic!("Failed to load reference case: {e}"));
    let expected = two_stream_case();

    assert_eq!(loaded.name, expected.name);
    assert_eq!(loaded.operating_cases, expected.operating_cases);
    assert_eq!(loaded.enthalpy_stages, expected.enthalpy_stages);
    assert_eq!(loaded.exchangers, expected.exchangers);
    assert_eq!(loaded.balance_utilities, expected.balance_utilities);
    assert_eq!(loaded.match_costs, expected.match_costs);
    assert_eq!(loaded.economics, expected.economics);
    assert_eq!(loaded.restrictions, expected.restrictions);
    assert_eq!(loaded.initial_duties, expected.initial_duties);
    assert_eq!(loaded.initial_utility_demand, expected.initial_utility_demand);

    let pairs = loaded
        .hot_streams
        .iter()
        .zip(&expected.hot_streams)
        .chain(loaded.cold_streams.iter().zip(&expected.cold_streams));
    for (a, b) in pairs {
        assert_eq!(a.name, b.name);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.heat_capacities, b.heat_capacities);
        assert_eq!(a.mass_flows, b.mass_flows);
        assert_eq!(a.extreme_temperatures, b.extreme_temperatures);
        assert_eq!(a.utility, b.utility);
        for (x, y) in a.supply_temperatures.iter().zip(&b.supply_temperatures) {
            assert!((x - y).abs() < 1e-9, "{}: {x} vs {y}", a.name);
        }
        for (x, y) in a.target_temperatures.iter().zip(&b.target_temperatures) {
            assert!((x - y).abs() < 1e-9, "{}: {x} vs {y}", a.name);
        }
    }
}

#[test]
fn quick_algorithm_keeps_unset_defaults() {
    let config = load_algorithm_yaml(&data("algorithm_quick.yaml")).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.pool.workers, Some(2));
    assert_eq!(config.ga.population_size, 6);
    assert_eq!(config.ga.reference_scale, 2.0);
    assert_eq!(config.de.pareto_size, 3);
    assert_eq!(config.de.perturbation_factor, 0.7);
    assert_eq!(config.de.crossover_probability, 0.8);
}

#[test]
fn missing_file_is_io_error() {
    let err = load_case_yaml(&data("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, ProjectError::Io(_)));
}
