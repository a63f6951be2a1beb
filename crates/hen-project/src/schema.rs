//! Case-study and algorithm file schema.
//!
//! Temperatures are written in °C and durations in hours. Per-operating-case
//! quantities are lists with one value per operating case, in file order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseStudyDef {
    pub name: String,
    pub enthalpy_stages: usize,
    pub operating_cases: Vec<OperatingCaseDef>,
    pub streams: Vec<StreamDef>,
    #[serde(default)]
    pub exchangers: Vec<ExchangerDef>,
    /// Cost coefficients of exchangers that do not carry their own
    #[serde(default)]
    pub exchanger_costs: ExchangerCostsDef,
    #[serde(default)]
    pub balance_utilities: Vec<BalanceUtilityDef>,
    #[serde(default)]
    pub match_costs: Vec<MatchCostDef>,
    pub economics: EconomicsDef,
    #[serde(default)]
    pub restrictions: RestrictionsDef,
    pub initial_utility_demand: UtilityDemandDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperatingCaseDef {
    pub id: String,
    pub start_h: f64,
    pub end_h: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreamKindDef {
    Hot,
    Cold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamDef {
    pub id: String,
    pub kind: StreamKindDef,
    pub supply_c: Vec<f64>,
    pub target_c: Vec<f64>,
    /// kW/(m²·K)
    pub film_coefficient: Vec<f64>,
    /// kJ/(kg·K)
    pub heat_capacity: Vec<f64>,
    /// kg/s
    pub mass_flow: Vec<f64>,
    /// Temperature limit the stream may not cross. Unconstrained if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extreme_c: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility: Option<UtilityDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UtilityDef {
    pub cost_per_kwh: Vec<f64>,
    /// tCO₂ per kWh
    pub emissions_per_kwh: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangerDef {
    pub id: String,
    pub hot: String,
    pub cold: String,
    pub stage: usize,
    pub area_m2: f64,
    /// As-built duty (kW), one per operating case
    pub duties_kw: Vec<f64>,
    #[serde(default)]
    pub mixers: MixerFlagsDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<ExchangerCostsDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MixerFlagsDef {
    pub bypass_hot: bool,
    pub admixer_hot: bool,
    pub bypass_cold: bool,
    pub admixer_cold: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangerCostsDef {
    pub base: f64,
    pub specific_area: f64,
    pub degression: f64,
    pub remove: f64,
    pub base_split: f64,
    pub remove_split: f64,
    pub base_bypass: f64,
    pub remove_bypass: f64,
    pub base_admixer: f64,
    pub remove_admixer: f64,
    pub base_repipe: f64,
    pub base_resequence: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UtilityKindDef {
    Heating,
    Cooling,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceUtilityDef {
    pub kind: UtilityKindDef,
    /// Process stream closed to its target
    pub stream: String,
    pub area_m2: f64,
    pub base_cost: f64,
    pub specific_area_cost: f64,
    pub degression: f64,
    pub remove_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchCostDef {
    pub hot: String,
    pub cold: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomicsDef {
    pub interest_rate: f64,
    pub depreciation_years: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RestrictionsDef {
    pub max_splits: usize,
    pub max_bypass_fraction: f64,
    pub max_admix_fraction: f64,
    pub dt_upper_bound_k: f64,
    pub dt_lower_bound_k: f64,
    pub minimal_heat_load_kw: f64,
    pub one_mixer_per_exchanger: bool,
}

impl Default for RestrictionsDef {
    fn default() -> Self {
        Self {
            max_splits: 1,
            max_bypass_fraction: 0.9,
            max_admix_fraction: 0.9,
            dt_upper_bound_k: 300.0,
            dt_lower_bound_k: 5.0,
            minimal_heat_load_kw: 0.0,
            one_mixer_per_exchanger: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UtilityDemandDef {
    pub hot_kwh: Vec<f64>,
    pub cold_kwh: Vec<f64>,
}

/// Optimizer settings. Every field falls back to the runtime defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlgorithmDef {
    pub ga: GaDef,
    pub de: DeDef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    pub fitness: FitnessDef,
    pub seed: u64,
}

impl Default for AlgorithmDef {
    fn default() -> Self {
        Self {
            ga: GaDef::default(),
            de: DeDef::default(),
            workers: None,
            fitness: FitnessDef::default(),
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GaDef {
    pub population: usize,
    pub tournament_size: usize,
    pub hall_of_fame_size: usize,
    pub generations: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub reference_scale: f64,
}

impl Default for GaDef {
    fn default() -> Self {
        Self {
            population: 20,
            tournament_size: 3,
            hall_of_fame_size: 10,
            generations: 20,
            crossover_probability: 0.6,
            mutation_probability: 0.2,
            reference_scale: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeDef {
    pub population: usize,
    pub pareto_size: usize,
    pub generations: usize,
    pub perturbation_factor: f64,
    pub crossover_probability: f64,
    pub max_no_improvement: usize,
}

impl Default for DeDef {
    fn default() -> Self {
        Self {
            population: 20,
            pareto_size: 5,
            generations: 50,
            perturbation_factor: 0.7,
            crossover_probability: 0.8,
            max_no_improvement: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FitnessDef {
    #[default]
    Pareto,
    Weighted {
        #[serde(default)]
        total_annual_cost: f64,
        #[serde(default)]
        capital_costs: f64,
        #[serde(default)]
        operating_costs: f64,
        #[serde(default)]
        operating_emissions: f64,
    },
}
