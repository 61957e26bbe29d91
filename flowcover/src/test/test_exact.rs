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

#![cfg(test)]
use crate::dataset::{greedy_trap, Dataset, RandomDataset};
use crate::selection::count_covered_flows;
use crate::solvers::*;
use crate::{Error, Stopper};

use std::time::Duration;

/// Size of the minimum cover, computed by enumerating all subsets of switches.
fn brute_force(dataset: &Dataset) -> usize {
    let n = dataset.num_switches();
    (0u32..(1 << n))
        .filter(|mask| {
            let chosen: Vec<bool> = (0..n).map(|s| mask & (1 << s) != 0).collect();
            count_covered_flows(dataset, &chosen) == dataset.num_flows()
        })
        .map(|mask| mask.count_ones() as usize)
        .min()
        .unwrap_or(n)
}

fn small_dataset(seed: u64) -> Dataset {
    RandomDataset {
        num_flows: 25,
        num_switches: 10,
        min_path_len: 1,
        max_path_len: 3,
        empty_probability: 0.0,
    }
    .generate(seed)
}

#[test]
fn test_exact_is_optimal() {
    for seed in 0..10 {
        let d = small_dataset(seed);
        let exact = ExactSolver::solve(&d, None, Stopper::new()).unwrap();
        assert!(exact.is_complete());
        assert_eq!(count_covered_flows(&d, exact.chosen()), d.num_flows());
        assert_eq!(exact.num_chosen(), brute_force(&d));
    }
}

#[test]
fn test_exact_never_worse_than_greedy() {
    for seed in 0..10 {
        let d = small_dataset(100 + seed);
        let greedy = GreedySolver::<FullScan>::solve(&d, None, Stopper::new()).unwrap();
        let exact = ExactSolver::solve(&d, Some(Duration::from_secs(60)), Stopper::new()).unwrap();
        assert!(exact.num_chosen() <= greedy.num_chosen());
    }
}

#[test]
fn test_greedy_trap() {
    for k in 3..6 {
        let d = greedy_trap(k);
        let greedy = GreedySolver::<FullScan>::solve(&d, None, Stopper::new()).unwrap();
        assert_eq!(greedy.num_chosen(), k as usize);
        // the largest column is chosen first
        assert_eq!(greedy.steps()[0].switch, k as usize + 1);
        let exact = ExactSolver::solve(&d, None, Stopper::new()).unwrap();
        assert_eq!(exact.selected_switches(), vec![0, 1]);
    }
}

#[test]
fn test_exact_trace_is_replayed() {
    let d = greedy_trap(3);
    let exact = ExactSolver::solve(&d, None, Stopper::new()).unwrap();
    let steps = exact.steps();
    assert_eq!(steps.len(), 2);
    assert_eq!((steps[0].switch, steps[0].gain, steps[0].covered), (0, 7, 7));
    assert_eq!((steps[1].switch, steps[1].gain, steps[1].covered), (1, 7, 14));
}

#[test]
fn test_exact_time_budget() {
    let d = greedy_trap(4);
    match ExactSolver::solve(&d, Some(Duration::from_secs(0)), Stopper::new()) {
        Err(Error::OptimumNotFound(best)) => {
            assert!(best.is_complete());
            assert_eq!(best.num_chosen(), 4);
        }
        r => panic!("unexpected result: {:?}", r),
    }
}
