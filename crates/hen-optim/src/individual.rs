//! Individuals of the inner (duty) and outer (topology) searches.

use hen_core::Real;
use hen_model::{NetworkState, Topology};
use nalgebra::DMatrix;

/// Snapshot of an evaluated network kept alongside its fitness.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkSummary {
    pub feasible: bool,
    pub quadratic_distance: Real,
    pub total_annual_cost: Real,
    pub capital_costs: Real,
    pub operating_costs: Real,
    pub operating_emissions: Real,
    /// Topology after mixer resolution
    pub topology: Topology,
    pub areas: Vec<Real>,
}

impl From<&NetworkState> for NetworkSummary {
    fn from(state: &NetworkState) -> Self {
        Self {
            feasible: state.is_feasible(),
            quadratic_distance: state.quadratic_distance(),
            total_annual_cost: state.total_annual_cost(),
            capital_costs: state.capital_costs(),
            operating_costs: state.operating_costs,
            operating_emissions: state.operating_emissions,
            topology: state.topology.clone(),
            areas: state.areas(),
        }
    }
}

/// Heat-duty matrix with its fitness vector.
#[derive(Clone, Debug, PartialEq)]
pub struct DutyIndividual {
    pub genes: DMatrix<Real>,
    pub fitness: Vec<Real>,
    pub summary: NetworkSummary,
}

impl DutyIndividual {
    /// Zero-duty stand-in for a topology that produced no usable front.
    pub fn pseudo(topology: &Topology, operating_cases: usize, fitness: Vec<Real>) -> Self {
        Self {
            genes: DMatrix::zeros(topology.len(), operating_cases),
            fitness,
            summary: NetworkSummary {
                topology: topology.clone(),
                areas: vec![0.0; topology.len()],
                ..NetworkSummary::default()
            },
        }
    }

    pub fn has_duty(&self) -> bool {
        self.genes.iter().any(|q| *q != 0.0)
    }

    /// Fitness mapped to minimisation space.
    pub fn inverse_fitness(&self) -> Vec<Real> {
        self.fitness.iter().map(|f| 1.0 / f).collect()
    }
}

/// Inner front of a topology. Pseudo fronts stand in for topologies that
/// were screened out or whose duty search found nothing feasible.
#[derive(Clone, Debug, PartialEq)]
pub struct InnerFront {
    pub members: Vec<DutyIndividual>,
    pub pseudo: bool,
}

impl InnerFront {
    pub fn pseudo(member: DutyIndividual) -> Self {
        Self {
            members: vec![member],
            pseudo: true,
        }
    }

    /// First member, the representative shown in reports.
    pub fn representative(&self) -> Option<&DutyIndividual> {
        self.members.first()
    }
}

/// Topology genes with the evaluation of their inner front. A missing
/// front marks an individual whose genes changed since its last evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyIndividual {
    pub genes: Topology,
    pub front: Option<InnerFront>,
    pub indicator: Real,
}

impl TopologyIndividual {
    pub fn new(genes: Topology) -> Self {
        Self {
            genes,
            front: None,
            indicator: 0.0,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.front.is_some()
    }

    pub fn invalidate(&mut self) {
        self.front = None;
        self.indicator = 0.0;
    }

    pub fn is_pseudo(&self) -> bool {
        self.front.as_ref().is_none_or(|f| f.pseudo)
    }
}
