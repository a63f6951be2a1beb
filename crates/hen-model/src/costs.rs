//! Retrofit capital costs.
//!
//! Every term compares the candidate topology against the as-built one:
//! enlarged or new area, removed exchangers, added or removed mixer hardware,
//! changed stream splits, repiped exchangers, reordered exchangers along a
//! stream and brand-new stream matches.

use crate::case_study::{CaseStudy, StreamKind};
use crate::exchanger::ExchangerOperation;
use crate::sequence::{OpTag, opcodes};
use crate::topology::Topology;
use hen_core::Real;
use std::collections::{BTreeSet, HashSet};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapitalCosts {
    pub exchangers: Real,
    pub mixers: Real,
    pub balance_exchangers: Real,
    pub splits: Real,
    pub repipe: Real,
    pub resequence: Real,
    pub matches: Real,
}

impl CapitalCosts {
    pub fn total(&self) -> Real {
        self.exchangers
            + self.mixers
            + self.balance_exchangers
            + self.splits
            + self.repipe
            + self.resequence
            + self.matches
    }
}

/// Area costs of every exchanger slot.
pub fn exchanger_costs(case: &CaseStudy, topology: &Topology, operations: &[ExchangerOperation]) -> Real {
    let mut total = 0.0;
    for ((current, initial), op) in topology.iter().zip(&case.exchangers).zip(operations) {
        let costs = &initial.costs;
        let was_built = initial.address.exists;
        if current.exists {
            let installed = if was_built { initial.area } else { 0.0 };
            if op.area > installed {
                total += costs.area_cost(op.area, installed);
            } else if op.area <= 0.0 && was_built {
                total += costs.remove;
            }
        } else if was_built {
            total += costs.remove;
        }
    }
    total
}

/// Bypass and admixer hardware added to or removed from each slot.
pub fn mixer_costs(case: &CaseStudy, topology: &Topology) -> Real {
    let mut total = 0.0;
    for (current, initial) in topology.iter().zip(&case.exchangers) {
        let before = &initial.address;
        let c = &initial.costs;
        let flags = [
            (current.bypass_hot, before.bypass_hot, c.base_bypass, c.remove_bypass),
            (current.bypass_cold, before.bypass_cold, c.base_bypass, c.remove_bypass),
            (current.admixer_hot, before.admixer_hot, c.base_admixer, c.remove_admixer),
            (current.admixer_cold, before.admixer_cold, c.base_admixer, c.remove_admixer),
        ];
        for (now, was, add, remove) in flags {
            match (now, was) {
                (true, false) => total += add,
                (false, true) => total += remove,
                _ => {}
            }
        }
    }
    total
}

/// Split costs per (stage, stream) between two topologies.
pub fn split_costs(case: &CaseStudy, initial: &Topology, current: &Topology) -> Real {
    let base = |e: usize| case.exchangers[e].costs.base_split;
    let remove = |e: usize| case.exchangers[e].costs.remove_split;

    let mut total = 0.0;
    for kind in [StreamKind::Hot, StreamKind::Cold] {
        for stream in 0..case.streams(kind).len() {
            for stage in 0..case.enthalpy_stages {
                let now = current.members(kind, stream, stage);
                let before = initial.members(kind, stream, stage);
                match (now.len() > 1, before.len() > 1) {
                    (true, true) => {
                        total += now.iter().filter(|e| !before.contains(e)).map(|&e| base(e)).sum::<Real>();
                        total += before.iter().filter(|e| !now.contains(e)).map(|&e| remove(e)).sum::<Real>();
                    }
                    (false, true) => total += before.iter().map(|&e| remove(e)).sum::<Real>(),
                    (true, false) => total += now.iter().map(|&e| base(e)).sum::<Real>(),
                    (false, false) => {}
                }
            }
        }
    }
    total
}

/// Exchangers kept in place but connected to a different stream.
pub fn repipe_costs(case: &CaseStudy, initial: &Topology, current: &Topology) -> Real {
    let mut total = 0.0;
    for (e, (now, was)) in current.iter().zip(initial.iter()).enumerate() {
        if !(now.exists && was.exists) {
            continue;
        }
        let base = case.exchangers[e].costs.base_repipe;
        if now.hot_stream != was.hot_stream {
            total += base;
        }
        if now.cold_stream != was.cold_stream {
            total += base;
        }
    }
    total
}

/// Exchangers whose position along a stream changed, charged once per side.
pub fn resequence_costs(case: &CaseStudy, initial: &Topology, current: &Topology) -> Real {
    let mut total = 0.0;
    for kind in [StreamKind::Hot, StreamKind::Cold] {
        let mut touched = BTreeSet::new();
        for stream in 0..case.streams(kind).len() {
            let before = initial.sequence(kind, stream);
            let now = current.sequence(kind, stream);
            for code in opcodes(&before, &now) {
                if code.tag == OpTag::Equal {
                    continue;
                }
                touched.extend(before[code.a].iter().copied());
                touched.extend(now[code.b].iter().copied());
            }
        }
        total += touched
            .into_iter()
            .map(|e| case.exchangers[e].costs.base_resequence)
            .sum::<Real>();
    }
    total
}

/// One-time cost of every (hot, cold) match absent from the as-built network.
pub fn match_costs(case: &CaseStudy, initial: &Topology, current: &Topology) -> Real {
    let existing: HashSet<(usize, usize)> = initial
        .iter()
        .filter(|a| a.exists)
        .map(|a| (a.hot_stream, a.cold_stream))
        .collect();
    let created: BTreeSet<(usize, usize)> = current
        .iter()
        .filter(|a| a.exists)
        .map(|a| (a.hot_stream, a.cold_stream))
        .filter(|pair| !existing.contains(pair))
        .collect();
    created
        .into_iter()
        .map(|(hot, cold)| case.match_costs[(cold, hot)])
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::two_stream_case;
    use crate::topology::ExchangerAddress;

    #[test]
    fn unchanged_topology_costs_nothing_structural() {
        let case = two_stream_case();
        let t = case.initial_topology();
        assert_eq!(split_costs(&case, &t, &t), 0.0);
        assert_eq!(repipe_costs(&case, &t, &t), 0.0);
        assert_eq!(resequence_costs(&case, &t, &t), 0.0);
        assert_eq!(match_costs(&case, &t, &t), 0.0);
        assert_eq!(mixer_costs(&case, &t), 0.0);
    }

    #[test]
    fn new_split_charges_every_branch() {
        let case = two_stream_case();
        let initial = case.initial_topology();
        // move exchanger 0 into stage 0 next to exchanger 1
        let current = Topology::new(vec![ExchangerAddress::new(0, 0, 0), ExchangerAddress::new(0, 0, 0)]);
        // hot 0 and cold 0 each gain a two-branch split
        assert_eq!(split_costs(&case, &initial, &current), 4.0 * 1_000.0);
        // and back: both splits are removed
        assert_eq!(split_costs(&case, &current, &initial), 4.0 * 500.0);
    }

    #[test]
    fn repipe_and_match_for_new_stream_pair() {
        let case = two_stream_case();
        let initial = case.initial_topology();
        let steam = case.utility_indices(StreamKind::Hot)[0];
        let current = Topology::new(vec![ExchangerAddress::new(steam, 0, 1), ExchangerAddress::new(0, 0, 0)]);
        assert_eq!(repipe_costs(&case, &initial, &current), 1_500.0);
        // match (steam, C1) is new: cost table is indexed (cold, hot)
        assert_eq!(match_costs(&case, &initial, &current), 1_800.0);
        // exchanger 0 left hot stream 0 and joined the steam stream
        assert_eq!(resequence_costs(&case, &initial, &current), 700.0);
    }

    #[test]
    fn resequencing_swapped_stages() {
        let case = two_stream_case();
        let initial = case.initial_topology();
        let current = Topology::new(vec![ExchangerAddress::new(0, 0, 0), ExchangerAddress::new(0, 0, 1)]);
        // same order problem on hot and cold side, one exchanger moves on each
        assert_eq!(resequence_costs(&case, &initial, &current), 2.0 * 700.0);
    }

    #[test]
    fn removed_exchanger_and_mixer_hardware() {
        let mut case = two_stream_case();
        case.exchangers[0].address.bypass_hot = true;
        let mut current = case.initial_topology();
        current.addresses_mut()[0] = ExchangerAddress::removed();
        current.addresses_mut()[1].admixer_cold = true;
        // bypass removed with exchanger 0, admixer added to exchanger 1
        assert_eq!(mixer_costs(&case, &current), 200.0 + 900.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn address() -> impl Strategy<Value = ExchangerAddress> {
            (0usize..2, 0usize..2, 0usize..2, any::<bool>()).prop_map(|(h, c, k, exists)| {
                if exists {
                    ExchangerAddress::new(h, c, k)
                } else {
                    ExchangerAddress::removed()
                }
            })
        }

        proptest! {
            #[test]
            fn split_delta_is_symmetric(
                a in proptest::collection::vec(address(), 4),
                b in proptest::collection::vec(address(), 4),
            ) {
                let mut case = two_stream_case();
                let template = case.exchangers[0].clone();
                case.exchangers = vec![template; 4];
                for e in &mut case.exchangers {
                    e.costs.remove_split = e.costs.base_split;
                }
                let a = Topology::new(a);
                let b = Topology::new(b);
                let forward = split_costs(&case, &a, &b);
                let backward = split_costs(&case, &b, &a);
                prop_assert!((forward - backward).abs() < 1e-9);
                prop_assert_eq!(split_costs(&case, &a, &a), 0.0);
            }
        }
    }
}
