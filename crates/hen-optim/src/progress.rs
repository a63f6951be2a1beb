use hen_core::Real;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaStage {
    EvaluatingInitialPopulation,
    Generation,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaProgress {
    pub stage: GaStage,
    pub generation: usize,
    pub max_generations: usize,
    /// Topology evaluations so far
    pub evaluations: usize,
    pub best_indicator: Option<Real>,
    pub elapsed_wall_s: f64,
}

impl GaProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.max_generations == 0 {
            1.0
        } else {
            self.generation as f64 / self.max_generations as f64
        }
    }
}
