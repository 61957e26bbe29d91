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
use crate::dataset::{Dataset, RandomDataset};
use crate::observer::NoObserver;
use crate::selection::{count_covered_flows, Step};
use crate::solvers::*;
use crate::{Error, Stopper, SwitchId};

use maplit::btreeset;
use std::collections::BTreeSet;
use std::time::Duration;

fn run<S: SwitchScan>(dataset: &Dataset) -> Result<crate::selection::Selection, Error> {
    let mut solver = GreedySolver::<S>::new(dataset, None)?;
    solver.set_observer(NoObserver);
    solver.work(Stopper::new())
}

fn random_dataset(seed: u64) -> Dataset {
    RandomDataset {
        num_flows: 300,
        num_switches: 200,
        min_path_len: 1,
        max_path_len: 6,
        empty_probability: 0.0,
    }
    .generate(seed)
}

#[test]
fn test_tie_breaking() {
    // 0: [0], 1: [0, 1], 2: [1]
    let d = Dataset::from_pairs(vec![(0, 0), (1, 0), (1, 1), (2, 1)]);
    let selection = run::<FullScan>(&d).unwrap();
    assert_eq!(
        selection.steps(),
        &[Step { switch: 0, gain: 2, covered: 2 }, Step { switch: 1, gain: 1, covered: 3 }]
    );
    assert_eq!(selection.chosen(), &[true, true]);
    assert_eq!(selection.num_covered(), 3);
    assert!(selection.is_complete());
}

#[test]
fn test_empty_path_is_infeasible() {
    let d = Dataset::new(vec![vec![0], vec![0, 1], vec![]], 2).unwrap();
    match run::<FullScan>(&d) {
        Err(Error::InfeasibleCoverage(partial)) => {
            assert_eq!(partial.uncovered(), &[2]);
            assert_eq!(partial.num_covered(), 2);
            assert_eq!(partial.chosen(), &[true, false]);
            assert_eq!(partial.steps(), &[Step { switch: 0, gain: 2, covered: 2 }]);
        }
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn test_infeasible_error_carries_selection() {
    let d = Dataset::new(vec![vec![], vec![1], vec![]], 2).unwrap();
    let err = run::<LazyScan>(&d).unwrap_err();
    assert_eq!(err.to_string(), "2 flows cannot be covered by any switch!");
    let partial = err.into_partial_selection().unwrap();
    assert_eq!(partial.selected_switches(), vec![1]);
    assert_eq!(partial.uncovered(), &[0, 2]);
}

#[test]
fn test_duplicate_switch_on_path() {
    let d = Dataset::new(vec![vec![3, 3, 5]], 6).unwrap();
    let selection = run::<FullScan>(&d).unwrap();
    assert_eq!(selection.steps(), &[Step { switch: 3, gain: 1, covered: 1 }]);
}

#[test]
fn test_unused_switches() {
    let d = Dataset::new(vec![vec![4], vec![2, 4], vec![2]], 6).unwrap();
    let selection = run::<FullScan>(&d).unwrap();
    assert_eq!(selection.chosen().len(), 6);
    assert_eq!(selection.selected_switches(), vec![2, 4]);
}

#[test]
fn test_coverage_property() {
    for seed in 0..10 {
        let d = random_dataset(seed);
        let selection = run::<FullScan>(&d).unwrap();
        for path in d.paths() {
            assert!(path.iter().any(|s| selection.chosen()[*s]));
        }
        assert_eq!(count_covered_flows(&d, selection.chosen()), d.num_flows());
    }
}

#[test]
fn test_monotonicity() {
    for seed in 0..10 {
        let d = random_dataset(seed);
        let selection = run::<FullScan>(&d).unwrap();
        let mut last_covered = 0;
        let mut seen: BTreeSet<SwitchId> = BTreeSet::new();
        for step in selection.steps() {
            assert!(step.gain > 0);
            assert_eq!(step.covered, last_covered + step.gain);
            assert!(seen.insert(step.switch));
            last_covered = step.covered;
        }
        assert_eq!(last_covered, d.num_flows());
        assert_eq!(seen.len(), selection.num_chosen());
    }
}

#[test]
fn test_greedy_choice_per_step() {
    for seed in 0..5 {
        let d = random_dataset(seed);
        let selection = run::<FullScan>(&d).unwrap();
        let mut covered = vec![false; d.num_flows()];
        let mut chosen = vec![false; d.num_switches()];
        for step in selection.steps() {
            for s in 0..d.num_switches() {
                if chosen[s] {
                    continue;
                }
                let gain: BTreeSet<_> = (0..d.num_flows())
                    .filter(|f| !covered[*f] && d.path(*f).contains(&s))
                    .collect();
                assert!(gain.len() <= step.gain);
                if gain.len() == step.gain {
                    assert!(s >= step.switch);
                }
            }
            chosen[step.switch] = true;
            for f in 0..d.num_flows() {
                if d.path(f).contains(&step.switch) {
                    covered[f] = true;
                }
            }
        }
    }
}

#[test]
fn test_determinism() {
    let d = random_dataset(7);
    assert_eq!(run::<FullScan>(&d).unwrap(), run::<FullScan>(&d).unwrap());
}

#[test]
fn test_scans_produce_same_trace() {
    for seed in 0..5 {
        let d = random_dataset(seed);
        let full = run::<FullScan>(&d).unwrap();
        assert_eq!(full, run::<LazyScan>(&d).unwrap());

        let mut solver = ParallelGreedySolver::new(&d, None).unwrap();
        solver.set_observer(NoObserver);
        solver.scan_mut().set_num_threads(3);
        assert_eq!(full, solver.work(Stopper::new()).unwrap());
    }
}

#[test]
fn test_scans_agree_on_infeasible() {
    let params = RandomDataset {
        num_flows: 200,
        num_switches: 150,
        min_path_len: 1,
        max_path_len: 3,
        empty_probability: 0.1,
    };
    let d = params.generate(3);
    let empty: BTreeSet<_> = d.empty_flows().into_iter().collect();
    assert!(!empty.is_empty());

    let full = run::<FullScan>(&d).unwrap_err().into_partial_selection().unwrap();
    let lazy = run::<LazyScan>(&d).unwrap_err().into_partial_selection().unwrap();
    let parallel = run::<ParallelScan>(&d).unwrap_err().into_partial_selection().unwrap();
    assert_eq!(full, lazy);
    assert_eq!(full, parallel);
    assert_eq!(full.uncovered().iter().copied().collect::<BTreeSet<_>>(), empty);
}

#[test]
fn test_abort() {
    let d = random_dataset(1);
    let abort = Stopper::new();
    abort.send_stop();
    let mut solver = GreedySolver::<FullScan>::new(&d, None).unwrap();
    solver.set_observer(NoObserver);
    // the stopper is only checked every 9th iteration
    assert!(matches!(solver.work(abort), Err(Error::Abort)));
    assert_eq!(solver.steps().len(), 8);
    assert!(solver.num_covered() < d.num_flows());
}

#[test]
fn test_time_budget() {
    let d = random_dataset(2);
    let mut solver = GreedySolver::<FullScan>::new(&d, Some(Duration::from_secs(0))).unwrap();
    solver.set_observer(NoObserver);
    assert!(matches!(solver.work(Stopper::new()), Err(Error::Timeout)));

    // the state left behind is still a valid partial cover
    assert_eq!(count_covered_flows(&d, solver.chosen()), solver.num_covered());
    assert_eq!(solver.chosen().iter().filter(|c| **c).count(), solver.steps().len());
    assert!(solver.num_covered() < d.num_flows());

    // the solver can be driven to completion manually after the budget is used up
    while let Progress::Selected(_) = solver.step() {}
    assert_eq!(solver.num_covered(), d.num_flows());
    assert_eq!(solver.selection(), run::<FullScan>(&d).unwrap());
}

#[test]
fn test_chosen_switches_of_small_instance() {
    // flows 0 to 3 share switch 2, flow 4 only has switch 0
    let d = Dataset::new(vec![vec![1, 2], vec![2], vec![2, 3], vec![3, 2], vec![0]], 4).unwrap();
    let selection = run::<FullScan>(&d).unwrap();
    let chosen: BTreeSet<_> = selection.selected_switches().into_iter().collect();
    assert_eq!(chosen, btreeset! {0, 2});
}
