//! Runtime configuration of the nested optimizer.

use crate::error::{OptimResult, invalid};
use crate::objectives::FitnessMode;
use hen_core::Real;

/// Inner duty search.
#[derive(Clone, Debug, PartialEq)]
pub struct DeConfig {
    pub population_size: usize,
    /// Upper bound on the returned front
    pub pareto_size: usize,
    pub max_generations: usize,
    /// Perturbation factor F
    pub perturbation_factor: Real,
    /// Binomial crossover probability CR
    pub crossover_probability: Real,
    /// Stall generations tolerated before stopping
    pub max_no_improvement: usize,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            pareto_size: 5,
            max_generations: 50,
            perturbation_factor: 0.7,
            crossover_probability: 0.8,
            max_no_improvement: 10,
        }
    }
}

impl DeConfig {
    pub fn validate(&self) -> OptimResult<()> {
        if self.population_size < 4 {
            return Err(invalid(format!(
                "DE population size ({}) must be >= 4",
                self.population_size
            )));
        }
        if self.pareto_size == 0 {
            return Err(invalid("DE pareto size must be positive"));
        }
        if !(0.0..=2.0).contains(&self.perturbation_factor) {
            return Err(invalid(format!(
                "DE perturbation factor {} must be in [0, 2]",
                self.perturbation_factor
            )));
        }
        check_probability("DE crossover probability", self.crossover_probability)
    }
}

/// Outer topology search.
#[derive(Clone, Debug, PartialEq)]
pub struct GaConfig {
    pub population_size: usize,
    pub tournament_size: usize,
    pub hall_of_fame_size: usize,
    pub max_generations: usize,
    pub crossover_probability: Real,
    pub mutation_probability: Real,
    /// Hypervolume reference point as a multiple of the worst objectives
    pub reference_scale: Real,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            tournament_size: 3,
            hall_of_fame_size: 10,
            max_generations: 20,
            crossover_probability: 0.6,
            mutation_probability: 0.2,
            reference_scale: 2.0,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> OptimResult<()> {
        if self.population_size == 0 {
            return Err(invalid("GA population size must be positive"));
        }
        if self.tournament_size == 0 {
            return Err(invalid("GA tournament size must be positive"));
        }
        if !(self.reference_scale > 1.0) {
            return Err(invalid("hypervolume reference scale must be greater than 1"));
        }
        check_probability("GA crossover probability", self.crossover_probability)?;
        check_probability("GA mutation probability", self.mutation_probability)
    }
}

/// Worker threads for topology evaluations: `Some(1)` runs sequentially,
/// `None` uses every core.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlgorithmConfig {
    pub ga: GaConfig,
    pub de: DeConfig,
    pub pool: PoolConfig,
    pub fitness: FitnessMode,
    pub seed: u64,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            ga: GaConfig::default(),
            de: DeConfig::default(),
            pool: PoolConfig::default(),
            fitness: FitnessMode::default(),
            seed: 42,
        }
    }
}

impl AlgorithmConfig {
    pub fn validate(&self) -> OptimResult<()> {
        self.ga.validate()?;
        self.de.validate()?;
        if self.pool.workers == Some(0) {
            return Err(invalid("worker count must be positive"));
        }
        self.fitness.validate()
    }
}

fn check_probability(what: &str, p: Real) -> OptimResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(invalid(format!("{what} {p} must be in [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AlgorithmConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AlgorithmConfig::default();
        config.de.population_size = 3;
        assert!(config.validate().is_err());

        let mut config = AlgorithmConfig::default();
        config.ga.mutation_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = AlgorithmConfig::default();
        config.pool.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = AlgorithmConfig::default();
        config.ga.reference_scale = 1.0;
        assert!(config.validate().is_err());
    }
}
