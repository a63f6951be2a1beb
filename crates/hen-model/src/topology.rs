//! Exchanger addresses and the topology matrix.
//!
//! One address per exchanger slot: hot stream, cold stream, enthalpy stage,
//! four mixer flags and the existence flag. The same layout is used for the
//! initial (as-built) network and every candidate retrofit.

use crate::case_study::{CaseStudy, StreamKind};
use hen_core::Real;
use std::ops::Index;

/// Number of columns when a topology is flattened to its matrix form.
pub const ADDRESS_COLUMNS: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExchangerAddress {
    pub hot_stream: usize,
    pub cold_stream: usize,
    pub stage: usize,
    pub bypass_hot: bool,
    pub admixer_hot: bool,
    pub bypass_cold: bool,
    pub admixer_cold: bool,
    pub exists: bool,
}

impl ExchangerAddress {
    /// Existing exchanger without mixer hardware.
    pub fn new(hot_stream: usize, cold_stream: usize, stage: usize) -> Self {
        Self {
            hot_stream,
            cold_stream,
            stage,
            exists: true,
            ..Self::default()
        }
    }

    /// Empty slot: stream and stage indices are zeroed.
    pub fn removed() -> Self {
        Self::default()
    }

    pub fn stream(&self, kind: StreamKind) -> usize {
        match kind {
            StreamKind::Hot => self.hot_stream,
            StreamKind::Cold => self.cold_stream,
        }
    }

    pub fn to_row(&self) -> [usize; ADDRESS_COLUMNS] {
        [
            self.hot_stream,
            self.cold_stream,
            self.stage,
            usize::from(self.bypass_hot),
            usize::from(self.admixer_hot),
            usize::from(self.bypass_cold),
            usize::from(self.admixer_cold),
            usize::from(self.exists),
        ]
    }

    pub fn from_row(row: [usize; ADDRESS_COLUMNS]) -> Self {
        Self {
            hot_stream: row[0],
            cold_stream: row[1],
            stage: row[2],
            bypass_hot: row[3] != 0,
            admixer_hot: row[4] != 0,
            bypass_cold: row[5] != 0,
            admixer_cold: row[6] != 0,
            exists: row[7] != 0,
        }
    }
}

/// Topology matrix: one row per exchanger slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Topology {
    addresses: Vec<ExchangerAddress>,
}

impl Topology {
    pub fn new(addresses: Vec<ExchangerAddress>) -> Self {
        Self { addresses }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExchangerAddress> {
        self.addresses.iter()
    }

    pub fn addresses(&self) -> &[ExchangerAddress] {
        &self.addresses
    }

    pub fn addresses_mut(&mut self) -> &mut [ExchangerAddress] {
        &mut self.addresses
    }

    pub fn existing_count(&self) -> usize {
        self.addresses.iter().filter(|a| a.exists).count()
    }

    /// Existing exchangers sharing one stream in one enthalpy stage.
    pub fn members(&self, kind: StreamKind, stream: usize, stage: usize) -> Vec<usize> {
        self.addresses
            .iter()
            .enumerate()
            .filter(|(_, a)| a.exists && a.stream(kind) == stream && a.stage == stage)
            .map(|(i, _)| i)
            .collect()
    }

    /// Existing exchangers on a stream, ordered by enthalpy stage.
    pub fn sequence(&self, kind: StreamKind, stream: usize) -> Vec<usize> {
        let mut seq: Vec<usize> = self
            .addresses
            .iter()
            .enumerate()
            .filter(|(_, a)| a.exists && a.stream(kind) == stream)
            .map(|(i, _)| i)
            .collect();
        seq.sort_by_key(|&i| (self.addresses[i].stage, i));
        seq
    }

    pub fn to_rows(&self) -> Vec<[usize; ADDRESS_COLUMNS]> {
        self.addresses.iter().map(ExchangerAddress::to_row).collect()
    }

    /// Number of stream branches above the allowed split count, summed over
    /// every (stage, process stream) pair.
    pub fn split_violation_distance(&self, case: &CaseStudy) -> usize {
        let max_splits = case.restrictions.max_splits;
        let mut distance = 0;
        for kind in [StreamKind::Hot, StreamKind::Cold] {
            for stream in 0..case.streams(kind).len() {
                if case.is_utility(kind, stream) {
                    continue;
                }
                for stage in 0..case.enthalpy_stages {
                    let branches = self.members(kind, stream, stage).len();
                    distance += branches.saturating_sub(max_splits + 1);
                }
            }
        }
        distance
    }

    /// Exchangers that connect a hot utility directly to a cold utility.
    pub fn utility_connection_violation_distance(&self, case: &CaseStudy) -> usize {
        self.addresses
            .iter()
            .filter(|a| {
                a.exists
                    && case.is_utility(StreamKind::Hot, a.hot_stream)
                    && case.is_utility(StreamKind::Cold, a.cold_stream)
            })
            .count()
    }

    /// Combined quadratic screen used before paying for a duty optimisation.
    pub fn quadratic_violation_distance(&self, case: &CaseStudy) -> Real {
        let split = self.split_violation_distance(case) as Real;
        let utility = self.utility_connection_violation_distance(case) as Real;
        split * split + utility * utility
    }
}

impl Index<usize> for Topology {
    type Output = ExchangerAddress;

    fn index(&self, index: usize) -> &Self::Output {
        &self.addresses[index]
    }
}

impl FromIterator<ExchangerAddress> for Topology {
    fn from_iter<I: IntoIterator<Item = ExchangerAddress>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::two_stream_case;

    #[test]
    fn row_layout_round_trips() {
        let mut a = ExchangerAddress::new(1, 0, 2);
        a.admixer_cold = true;
        assert_eq!(a.to_row(), [1, 0, 2, 0, 0, 0, 1, 1]);
        assert_eq!(ExchangerAddress::from_row(a.to_row()), a);
        assert_eq!(ExchangerAddress::removed().to_row(), [0; ADDRESS_COLUMNS]);
    }

    #[test]
    fn sequence_orders_by_stage_then_slot() {
        let topology = Topology::new(vec![
            ExchangerAddress::new(0, 0, 1),
            ExchangerAddress::new(0, 0, 0),
            ExchangerAddress::removed(),
            ExchangerAddress::new(0, 1, 0),
        ]);
        assert_eq!(topology.sequence(StreamKind::Hot, 0), vec![1, 3, 0]);
        assert_eq!(topology.members(StreamKind::Hot, 0, 0), vec![1, 3]);
        // removed slot sits on hot 0 / cold 0 / stage 0 but does not count
        assert_eq!(topology.members(StreamKind::Cold, 0, 0), vec![1]);
        assert_eq!(topology.existing_count(), 3);
    }

    #[test]
    fn split_screen_counts_branches_beyond_limit() {
        let case = two_stream_case();
        // max_splits = 1: two branches allowed, the third and fourth violate
        let topology = Topology::new(vec![
            ExchangerAddress::new(0, 0, 0),
            ExchangerAddress::new(0, 0, 0),
            ExchangerAddress::new(0, 0, 0),
            ExchangerAddress::new(0, 0, 0),
        ]);
        // hot 0 stage 0 has 4 branches (2 over), cold 0 stage 0 likewise
        assert_eq!(topology.split_violation_distance(&case), 4);
        assert_eq!(topology.quadratic_violation_distance(&case), 16.0);
    }

    #[test]
    fn utility_screen_flags_utility_pairs_only() {
        let case = two_stream_case();
        let steam = case.utility_indices(StreamKind::Hot)[0];
        let water = case.utility_indices(StreamKind::Cold)[0];
        let topology = Topology::new(vec![
            ExchangerAddress::new(steam, water, 0),
            ExchangerAddress::new(steam, 0, 1),
            ExchangerAddress {
                exists: false,
                ..ExchangerAddress::new(steam, water, 1)
            },
        ]);
        assert_eq!(topology.utility_connection_violation_distance(&case), 1);
        assert_eq!(topology.split_violation_distance(&case), 0);
    }
}
