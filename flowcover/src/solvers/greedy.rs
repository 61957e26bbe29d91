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

//! # Greedy Solver

use super::scan::{FullScan, SwitchScan};
use super::Solver;
use crate::dataset::Dataset;
use crate::index::MembershipIndex;
use crate::observer::{LogObserver, StepObserver};
use crate::selection::{Selection, Step};
use crate::{Error, FlowId, Stopper, SwitchId};

use std::time::{Duration, SystemTime};

use log::*;

/// Coverage and selection state of the greedy solver. Both vectors only ever change from `false`
/// to `true`.
#[derive(Debug, Clone)]
pub struct CoverState {
    covered: Vec<bool>,
    chosen: Vec<bool>,
    num_covered: usize,
}

impl CoverState {
    pub(crate) fn new(num_flows: usize, num_switches: usize) -> Self {
        Self { covered: vec![false; num_flows], chosen: vec![false; num_switches], num_covered: 0 }
    }

    /// Returns true if the flow is covered by a chosen switch
    pub fn is_covered(&self, flow: FlowId) -> bool {
        self.covered[flow]
    }

    /// Returns true if the switch was chosen
    pub fn is_chosen(&self, switch: SwitchId) -> bool {
        self.chosen[switch]
    }

    /// Number of covered flows
    pub fn num_covered(&self) -> usize {
        self.num_covered
    }

    /// Flows that are not yet covered
    pub fn uncovered(&self) -> Vec<FlowId> {
        (0..self.covered.len()).filter(|f| !self.covered[*f]).collect()
    }

    /// Choose the switch and cover all of its flows. Returns the number of newly covered flows.
    fn apply(&mut self, switch: SwitchId, index: &MembershipIndex) -> usize {
        self.chosen[switch] = true;
        let before = self.num_covered;
        for &flow in index.flows(switch) {
            if !self.covered[flow] {
                self.covered[flow] = true;
                self.num_covered += 1;
            }
        }
        self.num_covered - before
    }
}

/// Outcome of a single iteration of the [`GreedySolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A switch was chosen
    Selected(Step),
    /// All flows are covered. This is a terminal state.
    Covered,
    /// The remaining flows cannot be covered by any switch. This is a terminal state.
    Infeasible,
}

/// # Greedy Solver
///
/// Solver that, at every step, chooses the switch which covers the most flows that are not yet
/// covered. If multiple switches cover the same number of uncovered flows, the one with the lowest
/// index is chosen, which makes the result deterministic. The solver stops as soon as every flow
/// is covered, or when no switch is able to cover any of the remaining flows. In the latter case,
/// [`Error::InfeasibleCoverage`] is returned, containing the partial selection.
///
/// The type argument `S` selects how the best switch is found (see [`SwitchScan`]). All scans
/// result in the same sequence of steps.
///
/// Every step is reported to the [`StepObserver`], which by default logs it
/// ([`LogObserver`]). The solver can also be driven manually by calling
/// [`GreedySolver::step`]. Between two steps, the partial state is always a valid partial cover.
pub struct GreedySolver<'a, S = FullScan>
where
    S: SwitchScan,
{
    dataset: &'a Dataset,
    index: MembershipIndex,
    state: CoverState,
    scan: S,
    steps: Vec<Step>,
    observer: Box<dyn StepObserver + 'a>,
    infeasibility_reported: bool,
    stop_time: Option<SystemTime>,
}

impl<'a, S> Solver<'a> for GreedySolver<'a, S>
where
    S: SwitchScan,
{
    fn new(dataset: &'a Dataset, time_budget: Option<Duration>) -> Result<Box<Self>, Error> {
        let index = MembershipIndex::build(dataset.num_switches(), dataset.paths())?;
        let scan = S::new(&index);
        let stop_time: Option<SystemTime> = time_budget.map(|dur| SystemTime::now() + dur);
        Ok(Box::new(Self {
            dataset,
            state: CoverState::new(dataset.num_flows(), dataset.num_switches()),
            index,
            scan,
            steps: Vec::new(),
            observer: Box::new(LogObserver::new()),
            infeasibility_reported: false,
            stop_time,
        }))
    }

    fn work(&mut self, mut abort: Stopper) -> Result<Selection, Error> {
        loop {
            // check for the time budget
            if self.stop_time.as_ref().map(|time| time.elapsed().is_ok()).unwrap_or(false) {
                error!("Time budget is used up! The cover is not yet complete!");
                break Err(Error::Timeout);
            }

            // check for abort criteria
            if abort.try_is_stop().unwrap_or(false) {
                info!("Operation was aborted!");
                break Err(Error::Abort);
            }

            match self.step() {
                Progress::Selected(_) => {}
                Progress::Covered => {
                    info!(
                        "All {} flows are covered using {} switches",
                        self.dataset.num_flows(),
                        self.steps.len()
                    );
                    break Ok(self.selection());
                }
                Progress::Infeasible => {
                    break Err(Error::InfeasibleCoverage(Box::new(self.selection())));
                }
            }
        }
    }

    #[cfg(feature = "count-states")]
    fn num_states(&self) -> usize {
        self.scan.num_evaluations()
    }
}

impl<'a, S> GreedySolver<'a, S>
where
    S: SwitchScan,
{
    /// Perform a single iteration: find the switch with the largest marginal gain, and choose it.
    /// Once a terminal state is reached, calling this function again returns the same state
    /// without changing anything.
    pub fn step(&mut self) -> Progress {
        let num_flows = self.dataset.num_flows();
        if self.state.num_covered == num_flows {
            return Progress::Covered;
        }

        match self.scan.best_switch(&self.index, &self.state) {
            Some((switch, gain)) => {
                let newly_covered = self.state.apply(switch, &self.index);
                debug_assert_eq!(newly_covered, gain);
                let step = Step { switch, gain, covered: self.state.num_covered };
                self.steps.push(step);
                self.observer.on_step(&step, num_flows);
                Progress::Selected(step)
            }
            None => {
                if !self.infeasibility_reported {
                    self.infeasibility_reported = true;
                    self.observer.on_infeasible(&self.state.uncovered());
                }
                Progress::Infeasible
            }
        }
    }

    /// Returns the current (possibly partial) selection
    pub fn selection(&self) -> Selection {
        Selection::new(
            self.state.chosen.clone(),
            self.steps.clone(),
            self.state.num_covered,
            self.state.uncovered(),
        )
    }

    /// Replace the observer to which every step is reported.
    pub fn set_observer(&mut self, observer: impl StepObserver + 'a) {
        self.observer = Box::new(observer);
    }

    /// Returns for every switch if it was chosen
    pub fn chosen(&self) -> &[bool] {
        &self.state.chosen
    }

    /// Number of flows covered so far
    pub fn num_covered(&self) -> usize {
        self.state.num_covered
    }

    /// Steps performed so far
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Current coverage state
    pub fn state(&self) -> &CoverState {
        &self.state
    }

    /// The membership index used by the solver
    pub fn index(&self) -> &MembershipIndex {
        &self.index
    }

    /// Mutable access to the scan, for configuring it.
    pub fn scan_mut(&mut self) -> &mut S {
        &mut self.scan
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::observer::NoObserver;
    use crate::solvers::{LazyScan, ParallelScan};

    fn steps_of<S: SwitchScan>(dataset: &Dataset) -> Vec<Step> {
        let mut solver = GreedySolver::<S>::new(dataset, None).unwrap();
        solver.set_observer(NoObserver);
        while let Progress::Selected(_) = solver.step() {}
        solver.steps().to_vec()
    }

    #[test]
    fn tie_goes_to_lower_index() {
        let d = Dataset::from_pairs(vec![(0, 0), (1, 0), (1, 1), (2, 1)]);
        let mut solver = GreedySolver::<FullScan>::new(&d, None).unwrap();
        solver.set_observer(NoObserver);
        assert_eq!(solver.step(), Progress::Selected(Step { switch: 0, gain: 2, covered: 2 }));
        assert_eq!(solver.num_covered(), 2);
        assert_eq!(solver.chosen(), &[true, false]);
        assert_eq!(solver.step(), Progress::Selected(Step { switch: 1, gain: 1, covered: 3 }));
        assert_eq!(solver.step(), Progress::Covered);
        assert_eq!(solver.step(), Progress::Covered);
    }

    #[test]
    fn duplicates_do_not_inflate_gain() {
        // switch 3 appears twice on flow 0, switch 5 covers flows 0 and 1.
        let d = Dataset::new(vec![vec![3, 3, 5], vec![5]], 6).unwrap();
        let mut solver = GreedySolver::<FullScan>::new(&d, None).unwrap();
        solver.set_observer(NoObserver);
        assert_eq!(solver.step(), Progress::Selected(Step { switch: 5, gain: 2, covered: 2 }));
        assert_eq!(solver.step(), Progress::Covered);
    }

    #[test]
    fn infeasible_is_terminal() {
        let d = Dataset::new(vec![vec![0], vec![], vec![0, 1]], 2).unwrap();
        let mut uncovered_reports = 0;
        let mut solver = GreedySolver::<FullScan>::new(&d, None).unwrap();
        solver.set_observer(CountInfeasible(&mut uncovered_reports));
        assert_eq!(solver.step(), Progress::Selected(Step { switch: 0, gain: 2, covered: 2 }));
        assert_eq!(solver.step(), Progress::Infeasible);
        assert_eq!(solver.step(), Progress::Infeasible);
        assert_eq!(solver.state().uncovered(), vec![1]);
        drop(solver);
        assert_eq!(uncovered_reports, 1);
    }

    struct CountInfeasible<'a>(&'a mut usize);

    impl<'a> StepObserver for CountInfeasible<'a> {
        fn on_step(&mut self, _step: &Step, _num_flows: usize) {}
        fn on_infeasible(&mut self, uncovered: &[FlowId]) {
            *self.0 += uncovered.len();
        }
    }

    #[test]
    fn scans_agree() {
        let d = Dataset::new(
            vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0], vec![4], vec![4, 4, 1]],
            5,
        )
        .unwrap();
        let full = steps_of::<FullScan>(&d);
        assert_eq!(full, steps_of::<LazyScan>(&d));
        assert_eq!(full, steps_of::<ParallelScan>(&d));
        assert_eq!(full[0], Step { switch: 1, gain: 3, covered: 3 });
    }

    #[test]
    fn observer_collects_steps() {
        let d = Dataset::from_pairs(vec![(0, 0), (1, 1)]);
        let mut collected: Vec<Step> = Vec::new();
        {
            let mut solver = GreedySolver::<FullScan>::new(&d, None).unwrap();
            solver.set_observer(&mut collected);
            solver.work(Stopper::new()).unwrap();
        }
        assert_eq!(
            collected,
            vec![Step { switch: 0, gain: 1, covered: 1 }, Step { switch: 1, gain: 1, covered: 2 }]
        );
    }

    #[test]
    fn empty_dataset_is_covered() {
        let d = Dataset::from_pairs(Vec::new());
        let mut solver = GreedySolver::<FullScan>::new(&d, None).unwrap();
        let selection = solver.work(Stopper::new()).unwrap();
        assert_eq!(selection.num_chosen(), 0);
        assert!(selection.is_complete());
    }
}
