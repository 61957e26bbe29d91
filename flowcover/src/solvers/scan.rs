// FlowCover: Selecting Switches to Cover Network Flows
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Switch Scans
//!
//! Different ways for the [`GreedySolver`](super::GreedySolver) to find the switch with the
//! largest marginal gain. Every scan returns the same switch: the one with the strictly largest
//! gain, and among those, the one with the lowest index. Hence, all scans produce exactly the same
//! sequence of steps, and only differ in their running time.

use super::greedy::CoverState;
use crate::index::MembershipIndex;
use crate::SwitchId;

use log::*;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::Range;

/// Minimal number of switches that each job of the [`ParallelScan`] has to evaluate.
const MIN_SWITCHES_PER_THREAD: usize = 64;

/// Interface for finding the next switch to choose
pub trait SwitchScan {
    /// Create the scan. The index is given in its initial state, where no flow is covered.
    fn new(index: &MembershipIndex) -> Self;

    /// Returns the unchosen switch with the largest (positive) marginal gain, together with its
    /// gain. If multiple switches have the same gain, the one with the lowest index is returned.
    /// If no switch has a positive gain, `None` is returned.
    fn best_switch(
        &mut self,
        index: &MembershipIndex,
        state: &CoverState,
    ) -> Option<(SwitchId, usize)>;

    /// Number of gain evaluations performed so far.
    fn num_evaluations(&self) -> usize;
}

/// Scan all switches in the given range in ascending order. Returns the best switch (first
/// maximum) and the number of gains that were computed.
fn scan_range(
    index: &MembershipIndex,
    state: &CoverState,
    range: Range<SwitchId>,
) -> (Option<(SwitchId, usize)>, usize) {
    let mut best: Option<(SwitchId, usize)> = None;
    let mut evaluations = 0;
    for switch in range {
        if state.is_chosen(switch) {
            continue;
        }
        let gain = index.gain(switch, |f| state.is_covered(f));
        evaluations += 1;
        if gain > best.map(|(_, g)| g).unwrap_or(0) {
            best = Some((switch, gain));
        }
    }
    (best, evaluations)
}

/// # Full Scan
///
/// Recompute the gain of every unchosen switch in every step. This is the reference behavior.
#[derive(Debug, Default)]
pub struct FullScan {
    evaluations: usize,
}

impl SwitchScan for FullScan {
    fn new(_index: &MembershipIndex) -> Self {
        Self::default()
    }

    fn best_switch(
        &mut self,
        index: &MembershipIndex,
        state: &CoverState,
    ) -> Option<(SwitchId, usize)> {
        let (best, evaluations) = scan_range(index, state, 0..index.num_switches());
        self.evaluations += evaluations;
        best
    }

    fn num_evaluations(&self) -> usize {
        self.evaluations
    }
}

/// # Lazy Scan
///
/// Keeps a max-heap of gains, ordered by gain (descending) and switch index (ascending). Since
/// covering flows never increases the gain of any switch, the gains stored in the heap are upper
/// bounds. The top of the heap is recomputed; if its gain did not change, no other switch can have
/// a larger gain, or the same gain and a lower index. Otherwise, it is pushed back with the new
/// gain.
#[derive(Debug)]
pub struct LazyScan {
    heap: BinaryHeap<(usize, Reverse<SwitchId>)>,
    evaluations: usize,
}

impl SwitchScan for LazyScan {
    fn new(index: &MembershipIndex) -> Self {
        let heap: BinaryHeap<(usize, Reverse<SwitchId>)> =
            index.iter().map(|(s, _)| (index.gain(s, |_| false), Reverse(s))).collect();
        let evaluations = heap.len();
        Self { heap, evaluations }
    }

    fn best_switch(
        &mut self,
        index: &MembershipIndex,
        state: &CoverState,
    ) -> Option<(SwitchId, usize)> {
        loop {
            let (bound, Reverse(switch)) = self.heap.pop()?;
            if bound == 0 {
                return None;
            }
            if state.is_chosen(switch) {
                continue;
            }
            let gain = index.gain(switch, |f| state.is_covered(f));
            self.evaluations += 1;
            if gain == bound {
                return Some((switch, gain));
            }
            self.heap.push((gain, Reverse(switch)));
        }
    }

    fn num_evaluations(&self) -> usize {
        self.evaluations
    }
}

/// # Parallel Scan
///
/// Computes the gains of all unchosen switches on a rayon thread pool, and reduces them to the
/// maximum of `(gain, Reverse(switch))`. This maximum is the switch with the largest gain and the
/// lowest index, independent of how the work is split. By default, all available cores are used.
#[derive(Debug)]
pub struct ParallelScan {
    num_threads: usize,
    pool: Option<ThreadPool>,
    evaluations: usize,
}

impl ParallelScan {
    /// Set the number of threads to use (at least 1). This rebuilds the thread pool.
    pub fn set_num_threads(&mut self, num_threads: usize) {
        self.num_threads = num_threads.max(1);
        self.pool = build_pool(self.num_threads);
    }

    /// Number of threads used for scanning.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

/// Build a thread pool of the given size. If this fails, the global rayon pool is used instead.
fn build_pool(num_threads: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new().num_threads(num_threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(
                "Cannot build a thread pool with {} threads ({}), using the global pool",
                num_threads, e
            );
            None
        }
    }
}

impl SwitchScan for ParallelScan {
    fn new(_index: &MembershipIndex) -> Self {
        let num_threads = num_cpus::get().max(1);
        Self { num_threads, pool: build_pool(num_threads), evaluations: 0 }
    }

    fn best_switch(
        &mut self,
        index: &MembershipIndex,
        state: &CoverState,
    ) -> Option<(SwitchId, usize)> {
        let n = index.num_switches();
        let scan = || {
            (0..n)
                .into_par_iter()
                .with_min_len(MIN_SWITCHES_PER_THREAD)
                .filter(|s| !state.is_chosen(*s))
                .map(|s| (Some((index.gain(s, |f| state.is_covered(f)), Reverse(s))), 1))
                .reduce(|| (None, 0), |(a, num_a), (b, num_b)| (a.max(b), num_a + num_b))
        };
        let (best, evaluations): (Option<(usize, Reverse<SwitchId>)>, usize) = match &self.pool {
            Some(pool) => pool.install(scan),
            None => scan(),
        };
        self.evaluations += evaluations;

        match best {
            Some((gain, Reverse(switch))) if gain > 0 => Some((switch, gain)),
            _ => None,
        }
    }

    fn num_evaluations(&self) -> usize {
        self.evaluations
    }
}
