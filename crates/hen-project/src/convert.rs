//! Conversion from file definitions to the model and optimizer types.
//!
//! Stream references are resolved to indices within their hot or cold list
//! (file order). Temperatures pass through `uom` from °C to K.

use crate::ProjectResult;
use crate::schema::{
    AlgorithmDef, BalanceUtilityDef, CaseStudyDef, ExchangerCostsDef, ExchangerDef, FitnessDef,
    StreamDef, StreamKindDef, UtilityKindDef,
};
use crate::validate::{ValidationError, validate_case};
use hen_core::units::{degc, hours, kw_per_m2k, raw};
use hen_model::{
    BalanceUtility, CaseStudy, Economics, ExchangerAddress, ExchangerCosts, InitialExchanger,
    OperatingCase, Restrictions, Stream, StreamKind, UtilityDemand, UtilityKind, UtilityPricing,
};
use hen_optim::{AlgorithmConfig, DeConfig, FitnessMode, GaConfig, ObjectiveWeights, PoolConfig};
use nalgebra::DMatrix;
use std::collections::HashMap;

fn kelvin(values: &[f64]) -> Vec<f64> {
    values.iter().map(|&c| raw::kelvin(degc(c))).collect()
}

fn stream_kind(kind: StreamKindDef) -> StreamKind {
    match kind {
        StreamKindDef::Hot => StreamKind::Hot,
        StreamKindDef::Cold => StreamKind::Cold,
    }
}

fn convert_stream(def: &StreamDef) -> Stream {
    let kind = stream_kind(def.kind);
    let unconstrained = match kind {
        StreamKind::Hot => f64::NEG_INFINITY,
        StreamKind::Cold => f64::INFINITY,
    };
    Stream {
        name: def.id.clone(),
        kind,
        supply_temperatures: kelvin(&def.supply_c),
        target_temperatures: kelvin(&def.target_c),
        film_coefficients: def
            .film_coefficient
            .iter()
            .map(|&h| raw::kw_per_m2k(kw_per_m2k(h)))
            .collect(),
        heat_capacities: def.heat_capacity.clone(),
        mass_flows: def.mass_flow.clone(),
        extreme_temperatures: match &def.extreme_c {
            Some(values) => kelvin(values),
            None => vec![unconstrained; def.supply_c.len()],
        },
        utility: def.utility.as_ref().map(|u| UtilityPricing {
            cost_per_kwh: u.cost_per_kwh.clone(),
            emissions_per_kwh: u.emissions_per_kwh.clone(),
        }),
    }
}

fn convert_costs(def: &ExchangerCostsDef) -> ExchangerCosts {
    ExchangerCosts {
        base: def.base,
        specific_area: def.specific_area,
        degression: def.degression,
        remove: def.remove,
        base_split: def.base_split,
        remove_split: def.remove_split,
        base_bypass: def.base_bypass,
        remove_bypass: def.remove_bypass,
        base_admixer: def.base_admixer,
        remove_admixer: def.remove_admixer,
        base_repipe: def.base_repipe,
        base_resequence: def.base_resequence,
    }
}

/// Stream id to its index within the hot or cold list.
struct StreamIndex<'a> {
    by_id: HashMap<&'a str, usize>,
}

impl<'a> StreamIndex<'a> {
    fn new(streams: &'a [StreamDef]) -> Self {
        let mut counters = [0usize; 2];
        let by_id = streams
            .iter()
            .map(|s| {
                let slot = &mut counters[usize::from(s.kind == StreamKindDef::Cold)];
                let index = *slot;
                *slot += 1;
                (s.id.as_str(), index)
            })
            .collect();
        Self { by_id }
    }

    fn get(&self, id: &str, context: &str) -> Result<usize, ValidationError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| ValidationError::MissingReference {
                id: id.to_string(),
                context: context.to_string(),
            })
    }
}

fn convert_exchanger(
    def: &ExchangerDef,
    defaults: &ExchangerCostsDef,
    streams: &StreamIndex<'_>,
) -> Result<InitialExchanger, ValidationError> {
    let context = format!("exchanger '{}'", def.id);
    let address = ExchangerAddress {
        bypass_hot: def.mixers.bypass_hot,
        admixer_hot: def.mixers.admixer_hot,
        bypass_cold: def.mixers.bypass_cold,
        admixer_cold: def.mixers.admixer_cold,
        ..ExchangerAddress::new(
            streams.get(&def.hot, &context)?,
            streams.get(&def.cold, &context)?,
            def.stage,
        )
    };
    Ok(InitialExchanger {
        address,
        area: def.area_m2,
        costs: convert_costs(def.costs.as_ref().unwrap_or(defaults)),
    })
}

fn convert_balance(
    def: &BalanceUtilityDef,
    streams: &StreamIndex<'_>,
) -> Result<BalanceUtility, ValidationError> {
    Ok(BalanceUtility {
        kind: match def.kind {
            UtilityKindDef::Heating => UtilityKind::Heating,
            UtilityKindDef::Cooling => UtilityKind::Cooling,
        },
        stream: streams.get(&def.stream, "balance utilities")?,
        initial_area: def.area_m2,
        base_cost: def.base_cost,
        specific_area_cost: def.specific_area_cost,
        degression: def.degression,
        remove_cost: def.remove_cost,
    })
}

/// Validate the definition and build a checked case study.
pub fn case_study_from_def(def: &CaseStudyDef) -> ProjectResult<CaseStudy> {
    validate_case(def)?;
    let streams = StreamIndex::new(&def.streams);

    let (hot_streams, cold_streams): (Vec<Stream>, Vec<Stream>) = def
        .streams
        .iter()
        .map(convert_stream)
        .partition(|s| s.kind == StreamKind::Hot);

    let exchangers = def
        .exchangers
        .iter()
        .map(|e| convert_exchanger(e, &def.exchanger_costs, &streams))
        .collect::<Result<Vec<_>, _>>()?;

    let balance_utilities = def
        .balance_utilities
        .iter()
        .map(|b| convert_balance(b, &streams))
        .collect::<Result<Vec<_>, _>>()?;

    let mut match_costs = DMatrix::zeros(cold_streams.len(), hot_streams.len());
    for entry in &def.match_costs {
        let cold = streams.get(&entry.cold, "match_costs")?;
        let hot = streams.get(&entry.hot, "match_costs")?;
        match_costs[(cold, hot)] = entry.cost;
    }

    let n_oc = def.operating_cases.len();
    let initial_duties = DMatrix::from_fn(exchangers.len(), n_oc, |row, oc| {
        def.exchangers[row].duties_kw[oc]
    });

    let r = &def.restrictions;
    let case = CaseStudy {
        name: def.name.clone(),
        operating_cases: def
            .operating_cases
            .iter()
            .map(|oc| OperatingCase {
                start_hours: raw::hours(hours(oc.start_h)),
                end_hours: raw::hours(hours(oc.end_h)),
            })
            .collect(),
        hot_streams,
        cold_streams,
        enthalpy_stages: def.enthalpy_stages,
        exchangers,
        balance_utilities,
        match_costs,
        economics: Economics {
            interest_rate: def.economics.interest_rate,
            depreciation_years: def.economics.depreciation_years,
        },
        restrictions: Restrictions {
            max_splits: r.max_splits,
            max_bypass_fraction: r.max_bypass_fraction,
            max_admix_fraction: r.max_admix_fraction,
            dt_upper_bound: r.dt_upper_bound_k,
            dt_lower_bound: r.dt_lower_bound_k,
            minimal_heat_load: r.minimal_heat_load_kw,
            one_mixer_per_exchanger: r.one_mixer_per_exchanger,
        },
        initial_duties,
        initial_utility_demand: UtilityDemand {
            hot: def.initial_utility_demand.hot_kwh.clone(),
            cold: def.initial_utility_demand.cold_kwh.clone(),
        },
    };
    Ok(case.validated()?)
}

/// Build a validated optimizer configuration.
pub fn algorithm_from_def(def: &AlgorithmDef) -> ProjectResult<AlgorithmConfig> {
    let config = AlgorithmConfig {
        ga: GaConfig {
            population_size: def.ga.population,
            tournament_size: def.ga.tournament_size,
            hall_of_fame_size: def.ga.hall_of_fame_size,
            max_generations: def.ga.generations,
            crossover_probability: def.ga.crossover_probability,
            mutation_probability: def.ga.mutation_probability,
            reference_scale: def.ga.reference_scale,
        },
        de: DeConfig {
            population_size: def.de.population,
            pareto_size: def.de.pareto_size,
            max_generations: def.de.generations,
            perturbation_factor: def.de.perturbation_factor,
            crossover_probability: def.de.crossover_probability,
            max_no_improvement: def.de.max_no_improvement,
        },
        pool: PoolConfig {
            workers: def.workers,
        },
        fitness: match &def.fitness {
            FitnessDef::Pareto => FitnessMode::Pareto,
            FitnessDef::Weighted {
                total_annual_cost,
                capital_costs,
                operating_costs,
                operating_emissions,
            } => FitnessMode::Weighted(ObjectiveWeights {
                total_annual_cost: *total_annual_cost,
                capital_costs: *capital_costs,
                operating_costs: *operating_costs,
                operating_emissions: *operating_emissions,
            }),
        },
        seed: def.seed,
    };
    config.validate()?;
    Ok(config)
}
