//! JSON report of an optimisation run.

use hen_core::Real;
use hen_model::{ADDRESS_COLUMNS, Topology};
use hen_optim::{DutyIndividual, GaOutcome};
use nalgebra::DMatrix;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub case: String,
    pub seed: u64,
    pub generations: usize,
    pub evaluations: usize,
    pub hall_of_fame: Vec<RankedTopology>,
}

#[derive(Debug, Serialize)]
pub struct RankedTopology {
    pub rank: usize,
    pub indicator: Real,
    /// One row per exchanger slot: hot, cold, stage, four mixer flags, exists
    pub topology: Vec<[usize; ADDRESS_COLUMNS]>,
    pub front: Vec<Solution>,
}

#[derive(Debug, Serialize)]
pub struct Solution {
    /// Exchangers × operating cases (kW)
    pub duties_kw: Vec<Vec<Real>>,
    pub fitness: Vec<Real>,
    pub feasible: bool,
    pub total_annual_cost: Real,
    pub capital_costs: Real,
    pub operating_costs: Real,
    pub operating_emissions: Real,
    pub areas_m2: Vec<Real>,
}

fn rows(matrix: &DMatrix<Real>) -> Vec<Vec<Real>> {
    matrix.row_iter().map(|row| row.iter().copied().collect()).collect()
}

fn topology_rows(topology: &Topology) -> Vec<[usize; ADDRESS_COLUMNS]> {
    topology.iter().map(|a| a.to_row()).collect()
}

impl From<&DutyIndividual> for Solution {
    fn from(individual: &DutyIndividual) -> Self {
        let s = &individual.summary;
        Self {
            duties_kw: rows(&individual.genes),
            fitness: individual.fitness.clone(),
            feasible: s.feasible,
            total_annual_cost: s.total_annual_cost,
            capital_costs: s.capital_costs,
            operating_costs: s.operating_costs,
            operating_emissions: s.operating_emissions,
            areas_m2: s.areas.clone(),
        }
    }
}

impl RunReport {
    pub fn new(case: &str, seed: u64, outcome: &GaOutcome) -> Self {
        let hall_of_fame = outcome
            .hall_of_fame
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| RankedTopology {
                rank: i + 1,
                indicator: entry.indicator,
                topology: topology_rows(&entry.topology),
                front: entry.front.iter().map(Solution::from).collect(),
            })
            .collect();
        Self {
            case: case.to_string(),
            seed,
            generations: outcome.generations,
            evaluations: outcome.evaluations,
            hall_of_fame,
        }
    }
}
