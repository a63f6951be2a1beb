//! hen-optim: nested topology and duty optimisation of retrofit networks.
//!
//! Contains:
//! - de (differential evolution over duties of a fixed topology)
//! - ga (genetic algorithm over topologies, scored by hypervolume)
//! - objectives / pareto / hypervolume (fitness and front quality)
//! - selection / hall_of_fame (outer-loop bookkeeping)
//! - pool (rayon worker pool for topology evaluations)
//! - config / progress / error

pub mod config;
pub mod de;
pub mod error;
pub mod ga;
pub mod hall_of_fame;
pub mod hypervolume;
pub mod individual;
pub mod objectives;
pub mod pareto;
pub mod pool;
pub mod progress;
pub mod selection;

pub use config::{AlgorithmConfig, DeConfig, GaConfig, PoolConfig};
pub use de::{DeOutcome, DifferentialEvolution};
pub use error::{OptimError, OptimResult};
pub use ga::{GaOutcome, GeneticAlgorithm};
pub use hall_of_fame::{HallOfFame, HallOfFameEntry};
pub use individual::{DutyIndividual, InnerFront, NetworkSummary, TopologyIndividual};
pub use objectives::{FitnessMode, ObjectiveScale, ObjectiveWeights};
pub use pool::WorkerPool;
pub use progress::{GaProgress, GaStage};
