//! Genetic algorithm over exchanger topologies.
//!
//! Each topology is scored by the hypervolume of the duty front that
//! differential evolution finds for it. Topologies that break the split or
//! utility-connection rules are not optimised; they receive a pseudo front
//! whose fitness shrinks with the size of the violation.

use crate::config::AlgorithmConfig;
use crate::de::DifferentialEvolution;
use crate::error::OptimResult;
use crate::hall_of_fame::HallOfFame;
use crate::hypervolume::hypervolume;
use crate::individual::{DutyIndividual, InnerFront, TopologyIndividual};
use crate::objectives::pseudo_fitness;
use crate::pool::WorkerPool;
use crate::progress::{GaProgress, GaStage};
use crate::selection;
use hen_core::Real;
use hen_model::{CaseStudy, ExchangerAddress, Topology};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Offset of the screened-topology penalty; above the infeasible-duty offset
/// so that a screened topology never outranks an evaluated one.
pub const SCREENED_OFFSET: Real = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GaOutcome {
    pub hall_of_fame: HallOfFame,
    pub population: Vec<TopologyIndividual>,
    pub generations: usize,
    pub evaluations: usize,
}

pub struct GeneticAlgorithm<'a> {
    case: &'a CaseStudy,
    config: &'a AlgorithmConfig,
}

impl<'a> GeneticAlgorithm<'a> {
    pub fn new(case: &'a CaseStudy, config: &'a AlgorithmConfig) -> OptimResult<Self> {
        config.validate()?;
        Ok(Self { case, config })
    }

    fn random_address<R: Rng + ?Sized>(&self, rng: &mut R) -> ExchangerAddress {
        ExchangerAddress::new(
            rng.random_range(0..self.case.hot_streams.len()),
            rng.random_range(0..self.case.cold_streams.len()),
            rng.random_range(0..self.case.enthalpy_stages),
        )
    }

    /// Random existence bit per slot; existing slots get random streams and stage.
    pub fn random_topology<R: Rng + ?Sized>(&self, rng: &mut R) -> Topology {
        (0..self.case.number_exchangers())
            .map(|_| {
                if rng.random_bool(0.5) {
                    self.random_address(rng)
                } else {
                    ExchangerAddress::removed()
                }
            })
            .collect()
    }

    fn pseudo_front(&self, topology: &Topology, distance: Real) -> InnerFront {
        let fitness = pseudo_fitness(SCREENED_OFFSET, distance, self.config.fitness.objective_count());
        InnerFront::pseudo(DutyIndividual::pseudo(
            topology,
            self.case.number_operating_cases(),
            fitness,
        ))
    }

    /// Screen the topology, then run the duty search on it.
    pub fn evaluate_topology<R: Rng + ?Sized>(&self, topology: &Topology, rng: &mut R) -> OptimResult<InnerFront> {
        let distance = topology.quadratic_violation_distance(self.case);
        if distance > 0.0 {
            debug!(distance, "topology screened out");
            return Ok(self.pseudo_front(topology, distance));
        }
        let de = DifferentialEvolution::new(self.case, &self.config.de, &self.config.fitness);
        let outcome = de.run(topology, rng)?;
        if outcome.front.is_empty() {
            debug!(generations = outcome.generations, "no feasible duties for topology");
            return Ok(self.pseudo_front(topology, 0.0));
        }
        Ok(InnerFront {
            members: outcome.front,
            pseudo: false,
        })
    }

    /// Per-slot mutation. Flipping existence re-rolls or clears the slot and
    /// ends mutation of that slot; otherwise stage, cold and hot stream each
    /// re-roll independently. Returns whether anything changed.
    pub fn mutate<R: Rng + ?Sized>(&self, topology: &mut Topology, rng: &mut R) -> bool {
        let p = self.config.ga.mutation_probability;
        let mut mutated = false;
        for address in topology.addresses_mut() {
            if rng.random_bool(p) {
                mutated = true;
                *address = if address.exists {
                    ExchangerAddress::removed()
                } else {
                    self.random_address(rng)
                };
                continue;
            }
            if !address.exists {
                continue;
            }
            if rng.random_bool(p) {
                mutated = true;
                address.stage = rng.random_range(0..self.case.enthalpy_stages);
            }
            if rng.random_bool(p) {
                mutated = true;
                address.cold_stream = rng.random_range(0..self.case.cold_streams.len());
            }
            if rng.random_bool(p) {
                mutated = true;
                address.hot_stream = rng.random_range(0..self.case.hot_streams.len());
            }
        }
        mutated
    }

    /// Evaluate every individual without a front, one seeded RNG per task.
    fn evaluate_invalid<R: Rng + ?Sized>(
        &self,
        pool: &WorkerPool,
        population: &mut [TopologyIndividual],
        rng: &mut R,
    ) -> OptimResult<usize> {
        let tasks: Vec<(usize, Topology, u64)> = population
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.is_evaluated())
            .map(|(i, ind)| (i, ind.genes.clone(), rng.random::<u64>()))
            .collect();
        let count = tasks.len();
        let results = pool.map(tasks, |(i, genes, seed)| {
            let mut task_rng = StdRng::seed_from_u64(seed);
            self.evaluate_topology(&genes, &mut task_rng).map(|front| (i, front))
        });
        for result in results {
            let (i, front) = result?;
            population[i].front = Some(front);
        }
        Ok(count)
    }

    /// Hypervolume indicator of every evaluated individual against a
    /// reference point shared by the whole population.
    pub fn assign_indicators(&self, population: &mut [TopologyIndividual]) {
        let objectives = self.config.fitness.objective_count();
        let mut worst = vec![Real::NEG_INFINITY; objectives];
        let mut any_feasible = false;
        for front in population.iter().filter_map(|i| i.front.as_ref()).filter(|f| !f.pseudo) {
            for member in front.members.iter().filter(|m| m.summary.feasible && m.has_duty()) {
                any_feasible = true;
                for (w, v) in worst.iter_mut().zip(member.inverse_fitness()) {
                    *w = w.max(v);
                }
            }
        }
        if !any_feasible {
            warn!("no feasible front in population, all indicators are zero");
            population.iter_mut().for_each(|i| i.indicator = 0.0);
            return;
        }
        let reference: Vec<Real> = worst.iter().map(|w| w * self.config.ga.reference_scale).collect();
        for individual in population.iter_mut() {
            individual.indicator = match &individual.front {
                Some(front) if !front.pseudo && front.members.iter().any(DutyIndividual::has_duty) => {
                    let points: Vec<Vec<Real>> = front.members.iter().map(DutyIndividual::inverse_fitness).collect();
                    hypervolume(&points, &reference)
                }
                _ => 0.0,
            };
        }
    }

    fn crossover<R: Rng + ?Sized>(a: &mut Topology, b: &mut Topology, rng: &mut R) {
        let n = a.len().min(b.len());
        if n < 2 {
            return;
        }
        let point = rng.random_range(1..n);
        a.addresses_mut()[point..n].swap_with_slice(&mut b.addresses_mut()[point..n]);
    }

    pub fn run(&self, mut progress: Option<&mut dyn FnMut(GaProgress)>) -> OptimResult<GaOutcome> {
        let started = Instant::now();
        let ga = &self.config.ga;
        let pool = WorkerPool::new(&self.config.pool)?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut hall_of_fame = HallOfFame::new(ga.hall_of_fame_size);

        info!(
            population = ga.population_size,
            generations = ga.max_generations,
            exchangers = self.case.number_exchangers(),
            workers = pool.threads(),
            "starting topology search"
        );

        let mut population: Vec<TopologyIndividual> = (0..ga.population_size)
            .map(|_| TopologyIndividual::new(self.random_topology(&mut rng)))
            .collect();
        let mut evaluations = self.evaluate_invalid(&pool, &mut population, &mut rng)?;
        self.assign_indicators(&mut population);
        hall_of_fame.update(&population);
        emit(
            &mut progress,
            GaProgress {
                stage: GaStage::EvaluatingInitialPopulation,
                generation: 0,
                max_generations: ga.max_generations,
                evaluations,
                best_indicator: hall_of_fame.best().map(|e| e.indicator),
                elapsed_wall_s: started.elapsed().as_secs_f64(),
            },
        );

        let mut generation = 0;
        while generation < ga.max_generations {
            generation += 1;

            let indicators: Vec<Real> = population.iter().map(|i| i.indicator).collect();
            let mut offspring: Vec<TopologyIndividual> =
                selection::tournament(&indicators, ga.population_size, ga.tournament_size, &mut rng)
                    .into_iter()
                    .map(|i| population[i].clone())
                    .collect();

            for pair in offspring.chunks_mut(2) {
                if let [a, b] = &mut *pair {
                    if rng.random_bool(ga.crossover_probability) {
                        Self::crossover(&mut a.genes, &mut b.genes, &mut rng);
                        self.mutate(&mut a.genes, &mut rng);
                        self.mutate(&mut b.genes, &mut rng);
                        a.invalidate();
                        b.invalidate();
                        continue;
                    }
                }
                for child in pair.iter_mut() {
                    if self.mutate(&mut child.genes, &mut rng) {
                        child.invalidate();
                    }
                }
            }

            evaluations += self.evaluate_invalid(&pool, &mut offspring, &mut rng)?;
            self.assign_indicators(&mut offspring);
            let indicators: Vec<Real> = offspring.iter().map(|i| i.indicator).collect();
            let keep = selection::best(&indicators, ga.population_size);
            let mut slots: Vec<Option<TopologyIndividual>> = offspring.into_iter().map(Some).collect();
            population = keep.into_iter().filter_map(|i| slots[i].take()).collect();

            hall_of_fame.update(&population);
            let best = hall_of_fame.best().map(|e| e.indicator);
            info!(generation, evaluations, best_indicator = ?best, "generation complete");
            emit(
                &mut progress,
                GaProgress {
                    stage: GaStage::Generation,
                    generation,
                    max_generations: ga.max_generations,
                    evaluations,
                    best_indicator: best,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                },
            );
        }

        let elapsed = started.elapsed().as_secs_f64();
        info!(
            generations = generation,
            evaluations,
            archived = hall_of_fame.len(),
            elapsed_s = elapsed,
            "topology search finished"
        );
        emit(
            &mut progress,
            GaProgress {
                stage: GaStage::Completed,
                generation,
                max_generations: ga.max_generations,
                evaluations,
                best_indicator: hall_of_fame.best().map(|e| e.indicator),
                elapsed_wall_s: elapsed,
            },
        );

        Ok(GaOutcome {
            hall_of_fame,
            population,
            generations: generation,
            evaluations,
        })
    }
}

fn emit(progress: &mut Option<&mut dyn FnMut(GaProgress)>, event: GaProgress) {
    if let Some(cb) = progress.as_deref_mut() {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeConfig, GaConfig};
    use hen_model::StreamKind;
    use hen_model::fixtures::two_stream_case;

    fn config() -> AlgorithmConfig {
        AlgorithmConfig {
            ga: GaConfig {
                population_size: 4,
                max_generations: 2,
                mutation_probability: 0.5,
                ..GaConfig::default()
            },
            de: DeConfig {
                population_size: 5,
                max_generations: 3,
                ..DeConfig::default()
            },
            ..AlgorithmConfig::default()
        }
    }

    #[test]
    fn random_topologies_stay_in_range() {
        let case = two_stream_case();
        let config = config();
        let ga = GeneticAlgorithm::new(&case, &config).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let mut t = ga.random_topology(&mut rng);
            ga.mutate(&mut t, &mut rng);
            assert_eq!(t.len(), 2);
            for a in t.iter() {
                assert!(a.hot_stream < 2 && a.cold_stream < 2 && a.stage < 2);
                assert!(!(a.bypass_hot || a.admixer_hot || a.bypass_cold || a.admixer_cold));
                if !a.exists {
                    assert_eq!(*a, ExchangerAddress::removed());
                }
            }
        }
    }

    #[test]
    fn screened_topology_gets_pseudo_front() {
        let case = two_stream_case();
        let config = config();
        let ga = GeneticAlgorithm::new(&case, &config).unwrap();
        let steam = case.utility_indices(StreamKind::Hot)[0];
        let water = case.utility_indices(StreamKind::Cold)[0];
        let topology = Topology::new(vec![ExchangerAddress::new(steam, water, 0), ExchangerAddress::removed()]);
        let mut rng = StdRng::seed_from_u64(0);
        let front = ga.evaluate_topology(&topology, &mut rng).unwrap();
        assert!(front.pseudo);
        assert_eq!(front.members[0].fitness, vec![1.0 / 5.0, 1.0 / 5.0]);
        assert!(!front.members[0].has_duty());
    }

    #[test]
    fn crossover_swaps_tails() {
        let mut a = Topology::new(vec![ExchangerAddress::new(0, 0, 0); 4]);
        let mut b = Topology::new(vec![ExchangerAddress::new(1, 1, 1); 4]);
        let mut rng = StdRng::seed_from_u64(5);
        GeneticAlgorithm::crossover(&mut a, &mut b, &mut rng);
        let point = a.iter().position(|x| x.hot_stream == 1).unwrap();
        assert!(point >= 1);
        assert!(a.iter().skip(point).all(|x| x.hot_stream == 1));
        assert!(b.iter().take(point).all(|x| x.hot_stream == 1));
        assert!(b.iter().skip(point).all(|x| x.hot_stream == 0));
    }

    #[test]
    fn indicators_zero_without_feasible_fronts() {
        let case = two_stream_case();
        let config = config();
        let ga = GeneticAlgorithm::new(&case, &config).unwrap();
        let topology = case.initial_topology();
        let mut population = vec![TopologyIndividual {
            front: Some(ga.pseudo_front(&topology, 1.0)),
            indicator: 0.7,
            ..TopologyIndividual::new(topology)
        }];
        ga.assign_indicators(&mut population);
        assert_eq!(population[0].indicator, 0.0);
    }

    #[test]
    fn indicator_uses_shared_reference() {
        let case = two_stream_case();
        let config = config();
        let ga = GeneticAlgorithm::new(&case, &config).unwrap();
        let topology = case.initial_topology();
        let member = |f: [Real; 2]| {
            let mut m = DutyIndividual::pseudo(&topology, 2, f.to_vec());
            m.genes[(0, 0)] = 1_000.0;
            m.summary.feasible = true;
            m
        };
        let front = |members| InnerFront { members, pseudo: false };
        let mut population = vec![
            TopologyIndividual {
                front: Some(front(vec![member([1.0, 0.5])])),
                ..TopologyIndividual::new(topology.clone())
            },
            TopologyIndividual {
                front: Some(front(vec![member([0.5, 1.0])])),
                ..TopologyIndividual::new(topology.clone())
            },
        ];
        ga.assign_indicators(&mut population);
        // worst inverse fitness is (2, 2), reference (4, 4)
        assert!((population[0].indicator - 3.0 * 2.0).abs() < 1e-12);
        assert!((population[1].indicator - 2.0 * 3.0).abs() < 1e-12);
    }
}
