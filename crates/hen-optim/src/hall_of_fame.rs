//! Bounded archive of the best topologies, ordered by indicator.

use crate::individual::{DutyIndividual, TopologyIndividual};
use hen_core::Real;
use hen_model::Topology;

#[derive(Clone, Debug, PartialEq)]
pub struct HallOfFameEntry {
    pub topology: Topology,
    pub front: Vec<DutyIndividual>,
    pub indicator: Real,
}

impl HallOfFameEntry {
    pub fn representative(&self) -> Option<&DutyIndividual> {
        self.front.first()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HallOfFame {
    max_size: usize,
    /// Best first
    entries: Vec<HallOfFameEntry>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: Vec::with_capacity(max_size),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HallOfFameEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<&HallOfFameEntry> {
        self.entries.first()
    }

    pub fn update(&mut self, population: &[TopologyIndividual]) {
        for individual in population {
            let Some(front) = individual.front.as_ref().filter(|f| !f.pseudo) else {
                continue;
            };
            self.insert(HallOfFameEntry {
                topology: individual.genes.clone(),
                front: front.members.clone(),
                indicator: individual.indicator,
            });
        }
    }

    /// Insert unless full of better entries or already archived with the
    /// same representative duties and indicator.
    pub fn insert(&mut self, entry: HallOfFameEntry) -> bool {
        if self.max_size == 0 {
            return false;
        }
        let full = self.entries.len() >= self.max_size;
        if full && self.entries.last().is_some_and(|worst| entry.indicator <= worst.indicator) {
            return false;
        }
        let duties = entry.representative().map(|d| &d.genes);
        let duplicate = self.entries.iter().any(|e| {
            e.indicator == entry.indicator && e.representative().map(|d| &d.genes) == duties
        });
        if duplicate {
            return false;
        }
        if full {
            self.entries.pop();
        }
        // after any equal indicators, mirroring bisect-right on descending order
        let position = self.entries.partition_point(|e| e.indicator >= entry.indicator);
        self.entries.insert(position, entry);
        true
    }
}
