//! Differential evolution over the heat-duty matrix of a fixed topology.
//!
//! DE/rand/1/bin with dominance-based replacement: a donor replaces its
//! agent only when it is better in every objective, mutual non-dominance
//! keeps both, and NSGA-II selection trims the population back to size.

use crate::config::DeConfig;
use crate::error::OptimResult;
use crate::individual::{DutyIndividual, NetworkSummary};
use crate::objectives::{FitnessMode, ObjectiveScale};
use crate::pareto::{non_dominated_sort, select_nsga2, strictly_dominates, truncate_by_crowding};
use hen_core::Real;
use hen_model::{CaseStudy, NetworkState, Topology};
use nalgebra::DMatrix;
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use tracing::debug;

/// Duty bounds of one matrix cell.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CellBounds {
    lower: Real,
    upper: Real,
}

impl CellBounds {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Real {
        if self.upper > 0.0 {
            self.lower + (self.upper - self.lower) * rng.random::<Real>()
        } else {
            0.0
        }
    }

    fn contains(&self, value: Real) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeOutcome {
    /// Feasible result: the bounded first front, or the single best member
    /// in weighted mode. Empty when nothing feasible was found.
    pub front: Vec<DutyIndividual>,
    pub generations: usize,
    pub evaluations: usize,
}

pub struct DifferentialEvolution<'a> {
    case: &'a CaseStudy,
    config: &'a DeConfig,
    mode: &'a FitnessMode,
    scale: ObjectiveScale,
}

impl<'a> DifferentialEvolution<'a> {
    pub fn new(case: &'a CaseStudy, config: &'a DeConfig, mode: &'a FitnessMode) -> Self {
        Self {
            case,
            config,
            mode,
            scale: ObjectiveScale::from_case(case),
        }
    }

    fn bounds(&self, topology: &Topology) -> DMatrix<Option<CellBounds>> {
        let n_oc = self.case.number_operating_cases();
        let min_load = self.case.restrictions.minimal_heat_load;
        DMatrix::from_fn(topology.len(), n_oc, |e, oc| {
            let address = &topology[e];
            address.exists.then(|| {
                let upper = self.case.max_heat_load(address, oc);
                CellBounds {
                    lower: min_load.min(upper),
                    upper,
                }
            })
        })
    }

    /// Random duty matrix within the per-cell bounds.
    pub fn initialize<R: Rng + ?Sized>(&self, topology: &Topology, rng: &mut R) -> DMatrix<Real> {
        let bounds = self.bounds(topology);
        bounds.map(|cell| cell.map_or(0.0, |b| b.sample(rng)))
    }

    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        topology: &Topology,
        duties: DMatrix<Real>,
        rng: &mut R,
    ) -> OptimResult<DutyIndividual> {
        let state = NetworkState::evaluate(self.case, topology, &duties, rng)?;
        Ok(DutyIndividual {
            fitness: self.scale.fitness(self.mode, &state),
            summary: NetworkSummary::from(&state),
            genes: duties,
        })
    }

    /// DE/rand/1 donor with binomial crossover against `agent`.
    fn donor<R: Rng + ?Sized>(
        &self,
        agent: &DMatrix<Real>,
        parents: [&DMatrix<Real>; 3],
        bounds: &DMatrix<Option<CellBounds>>,
        rng: &mut R,
    ) -> DMatrix<Real> {
        let [r1, r2, r3] = parents;
        let mut donor = agent.clone();
        let j_rand = rng.random_range(0..donor.len());
        for j in 0..donor.len() {
            if j != j_rand && rng.random::<Real>() >= self.config.crossover_probability {
                continue;
            }
            donor[j] = match bounds[j] {
                None => 0.0,
                Some(b) if b.upper <= 0.0 => 0.0,
                Some(b) => {
                    let value = (r1[j] + self.config.perturbation_factor * (r2[j] - r3[j])).abs();
                    if b.contains(value) { value } else { b.sample(rng) }
                }
            };
        }
        donor
    }

    pub fn run<R: Rng + ?Sized>(&self, topology: &Topology, rng: &mut R) -> OptimResult<DeOutcome> {
        let bounds = self.bounds(topology);
        let size = self.config.population_size;

        let mut population = Vec::with_capacity(size);
        for _ in 0..size {
            let duties = self.initialize(topology, rng);
            population.push(self.evaluate(topology, duties, rng)?);
        }
        let mut evaluations = size;

        let mut generation = 0;
        let mut stall = 0;
        while generation <= self.config.max_generations && stall <= self.config.max_no_improvement {
            generation += 1;
            let mut next: Vec<DutyIndividual> = Vec::with_capacity(2 * population.len());
            for (index, agent) in population.iter().enumerate() {
                let picks = distinct_indices(index, 3, population.len(), rng);
                let parents = [
                    &population[picks[0]].genes,
                    &population[picks[1]].genes,
                    &population[picks[2]].genes,
                ];
                let duties = self.donor(&agent.genes, parents, &bounds, rng);
                let donor = self.evaluate(topology, duties, rng)?;
                evaluations += 1;

                if strictly_dominates(&donor.fitness, &agent.fitness) {
                    next.push(donor);
                    stall = 0;
                } else if strictly_dominates(&agent.fitness, &donor.fitness) {
                    next.push(agent.clone());
                    stall += 1;
                } else {
                    next.push(donor);
                    next.push(agent.clone());
                    stall = 0;
                }
            }
            population = select(next, size);
            debug!(
                generation,
                stall,
                feasible = population.iter().filter(|i| i.summary.feasible).count(),
                "DE generation"
            );
        }

        Ok(DeOutcome {
            front: self.terminal_front(population),
            generations: generation,
            evaluations,
        })
    }

    /// Feasible members only: the crowding-truncated first front, or the
    /// best member in weighted mode.
    fn terminal_front(&self, population: Vec<DutyIndividual>) -> Vec<DutyIndividual> {
        let feasible: Vec<DutyIndividual> = population.into_iter().filter(|i| i.summary.feasible).collect();
        if feasible.is_empty() {
            return feasible;
        }
        match self.mode {
            FitnessMode::Weighted(_) => feasible
                .into_iter()
                .max_by(|a, b| a.fitness[0].partial_cmp(&b.fitness[0]).unwrap_or(Ordering::Equal))
                .into_iter()
                .collect(),
            FitnessMode::Pareto => {
                let points: Vec<Vec<Real>> = feasible.iter().map(|i| i.fitness.clone()).collect();
                let first = non_dominated_sort(&points).into_iter().next().unwrap_or_default();
                let keep = truncate_by_crowding(&points, &first, self.config.pareto_size);
                let mut slots: Vec<Option<DutyIndividual>> = feasible.into_iter().map(Some).collect();
                keep.into_iter().filter_map(|i| slots[i].take()).collect()
            }
        }
    }
}

fn select(population: Vec<DutyIndividual>, k: usize) -> Vec<DutyIndividual> {
    let points: Vec<Vec<Real>> = population.iter().map(|i| i.fitness.clone()).collect();
    let chosen = select_nsga2(&points, k);
    let mut slots: Vec<Option<DutyIndividual>> = population.into_iter().map(Some).collect();
    chosen.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// `count` distinct indices from `0..pool_size`, never `exclude`.
fn distinct_indices<R: Rng + ?Sized>(exclude: usize, count: usize, pool_size: usize, rng: &mut R) -> Vec<usize> {
    debug_assert!(count < pool_size);
    let mut indices: Vec<usize> = (0..pool_size).filter(|&i| i != exclude).collect();
    indices.shuffle(rng);
    indices.truncate(count);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use hen_core::{Tolerances, nearly_equal};
    use hen_model::ExchangerAddress;
    use hen_model::fixtures::two_stream_case;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn quick() -> DeConfig {
        DeConfig {
            population_size: 8,
            pareto_size: 3,
            max_generations: 6,
            max_no_improvement: 4,
            ..DeConfig::default()
        }
    }

    #[test]
    fn initial_duties_respect_bounds() {
        let case = two_stream_case();
        let config = quick();
        let mode = FitnessMode::Pareto;
        let de = DifferentialEvolution::new(&case, &config, &mode);
        let topology = Topology::new(vec![ExchangerAddress::new(0, 0, 1), ExchangerAddress::removed()]);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let duties = de.initialize(&topology, &mut rng);
            for oc in 0..2 {
                // min(50·104, 40·110) kW
                assert!(duties[(0, oc)] >= 100.0 && duties[(0, oc)] <= 4_400.0);
                assert_eq!(duties[(1, oc)], 0.0);
            }
        }
    }

    #[test]
    fn donor_keeps_removed_slots_empty() {
        let case = two_stream_case();
        let config = DeConfig {
            crossover_probability: 1.0,
            ..quick()
        };
        let mode = FitnessMode::Pareto;
        let de = DifferentialEvolution::new(&case, &config, &mode);
        let topology = Topology::new(vec![ExchangerAddress::new(0, 0, 1), ExchangerAddress::removed()]);
        let bounds = de.bounds(&topology);
        let mut rng = StdRng::seed_from_u64(1);
        let agent = DMatrix::from_element(2, 2, 500.0);
        let (a, b, c) = (
            de.initialize(&topology, &mut rng),
            de.initialize(&topology, &mut rng),
            de.initialize(&topology, &mut rng),
        );
        let donor = de.donor(&agent, [&a, &b, &c], &bounds, &mut rng);
        for oc in 0..2 {
            assert_eq!(donor[(1, oc)], 0.0);
            assert!(donor[(0, oc)] >= 100.0 && donor[(0, oc)] <= 4_400.0);
        }
    }

    #[test]
    fn donor_zeroes_cells_without_capacity() {
        let case = two_stream_case();
        let config = DeConfig {
            crossover_probability: 1.0,
            ..quick()
        };
        let mode = FitnessMode::Pareto;
        let de = DifferentialEvolution::new(&case, &config, &mode);
        let closed = Some(CellBounds { lower: 0.0, upper: 0.0 });
        let bounds = DMatrix::from_element(2, 2, closed);
        let agent = DMatrix::from_element(2, 2, 0.0);
        let (a, b, c) = (
            DMatrix::from_element(2, 2, 300.0),
            DMatrix::from_element(2, 2, 900.0),
            DMatrix::from_element(2, 2, 100.0),
        );
        let mut rng = StdRng::seed_from_u64(5);
        let donor = de.donor(&agent, [&a, &b, &c], &bounds, &mut rng);
        assert!(donor.iter().all(|q| *q == 0.0));
    }

    /// Same duty matrices; summaries of infeasible members may carry NaN.
    fn contains_same_members(a: &[DutyIndividual], b: &[DutyIndividual]) -> bool {
        a.len() == b.len() && a.iter().all(|m| b.iter().any(|n| n.genes == m.genes))
    }

    /// `a` beats `b` in every objective by more than rounding.
    fn clearly_dominates(a: &[Real], b: &[Real]) -> bool {
        let tol = Tolerances::default();
        a.iter().zip(b).all(|(x, y)| x > y && !nearly_equal(*x, *y, tol))
    }

    #[test]
    fn selection_keeps_a_non_dominated_front_intact() {
        let case = two_stream_case();
        let config = quick();
        let mode = FitnessMode::Pareto;
        let de = DifferentialEvolution::new(&case, &config, &mode);
        let front = de
            .run(&case.initial_topology(), &mut StdRng::seed_from_u64(21))
            .unwrap()
            .front;
        assert!(front.len() <= config.population_size);

        let selected = select(front.clone(), config.population_size);
        assert!(contains_same_members(&selected, &front));
        for kept in &selected {
            for original in &front {
                assert!(!clearly_dominates(&kept.fitness, &original.fitness));
            }
        }
    }

    #[test]
    fn selection_is_idempotent() {
        let case = two_stream_case();
        let config = quick();
        let mode = FitnessMode::Pareto;
        let de = DifferentialEvolution::new(&case, &config, &mode);
        let topology = case.initial_topology();
        let mut rng = StdRng::seed_from_u64(17);
        let population: Vec<DutyIndividual> = (0..2 * config.population_size)
            .map(|_| {
                let duties = de.initialize(&topology, &mut rng);
                de.evaluate(&topology, duties, &mut rng).unwrap()
            })
            .collect();

        let once = select(population, config.population_size);
        let twice = select(once.clone(), config.population_size);
        assert_eq!(once.len(), config.population_size);
        assert!(contains_same_members(&twice, &once));
    }

    #[test]
    fn parents_exclude_the_agent() {
        let mut rng = StdRng::seed_from_u64(4);
        for exclude in 0..4 {
            let picks = distinct_indices(exclude, 3, 4, &mut rng);
            assert_eq!(picks.len(), 3);
            assert!(!picks.contains(&exclude));
            let mut sorted = picks.clone();
            sorted.dedup();
            assert_eq!(sorted.len(), 3);
        }
    }

    #[test]
    fn run_returns_bounded_feasible_front() {
        let case = two_stream_case();
        let config = quick();
        let mode = FitnessMode::Pareto;
        let de = DifferentialEvolution::new(&case, &config, &mode);
        let mut rng = StdRng::seed_from_u64(21);
        let outcome = de.run(&case.initial_topology(), &mut rng).unwrap();
        assert!(outcome.front.len() <= config.pareto_size);
        assert!(outcome.front.iter().all(|i| i.summary.feasible));
        assert!(outcome.generations <= config.max_generations + 1);
        assert!(outcome.evaluations >= config.population_size);
    }

    #[test]
    fn weighted_mode_returns_at_most_one_member() {
        let case = two_stream_case();
        let config = quick();
        let mode = FitnessMode::Weighted(Default::default());
        let de = DifferentialEvolution::new(&case, &config, &mode);
        let mut rng = StdRng::seed_from_u64(8);
        let outcome = de.run(&case.initial_topology(), &mut rng).unwrap();
        assert!(outcome.front.len() <= 1);
        assert!(outcome.front.iter().all(|i| i.fitness.len() == 1));
    }
}
