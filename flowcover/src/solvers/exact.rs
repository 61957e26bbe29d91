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

//! # Exact Solver

use super::greedy::{GreedySolver, Progress};
use super::scan::FullScan;
use super::{OptimalSolver, Solver};
use crate::dataset::Dataset;
use crate::index::MembershipIndex;
use crate::observer::NoObserver;
use crate::selection::Selection;
use crate::{Error, FlowId, Stopper, SwitchId};

use itertools::Itertools;
use log::*;

use std::cmp::Reverse;
use std::time::{Duration, SystemTime};

/// # Exact Solver
///
/// Solver computing a minimum cover, using depth-first branch and bound. The search starts with
/// the greedy solution as the best known cover. At every node, it picks the uncovered flow with the
/// fewest candidate switches, and branches on each of them (the switch with the larger gain
/// first). After a branch is exhausted, its switch is forbidden for the remaining branches of the
/// same node. A node is pruned if the number of chosen switches, plus the number of uncovered
/// flows divided by the largest gain of any allowed switch (rounded up), is not smaller than the
/// size of the best cover.
///
/// Flows with an empty path are ignored during the search. If there are any, the minimum cover of
/// all other flows is returned within [`Error::InfeasibleCoverage`].
///
/// This solver is only feasible for small datasets. If the time budget (or the maximum number of
/// search nodes) is exceeded, the best cover found so far is returned within
/// [`Error::OptimumNotFound`]. The same happens as soon as the relative gap between the best cover
/// and the lower bound of the root falls below the maximum gap (see
/// [`ExactSolver::set_max_gap`]).
#[derive(Debug)]
pub struct ExactSolver<'a> {
    dataset: &'a Dataset,
    index: MembershipIndex,
    candidates: Vec<Vec<SwitchId>>,
    stop_time: Option<SystemTime>,
    max_nodes: Option<usize>,
    max_gap: Option<f64>,
    num_states: usize,
}

/// State of the depth-first search
#[derive(Debug)]
struct Search {
    cover_count: Vec<usize>,
    forbidden: Vec<bool>,
    chosen: Vec<SwitchId>,
    remaining: usize,
    best: Vec<SwitchId>,
    root_bound: usize,
}

impl Search {
    fn choose(&mut self, switch: SwitchId, index: &MembershipIndex) {
        for &flow in index.flows(switch) {
            if self.cover_count[flow] == 0 {
                self.remaining -= 1;
            }
            self.cover_count[flow] += 1;
        }
        self.chosen.push(switch);
    }

    fn unchoose(&mut self, switch: SwitchId, index: &MembershipIndex) {
        for &flow in index.flows(switch) {
            self.cover_count[flow] -= 1;
            if self.cover_count[flow] == 0 {
                self.remaining += 1;
            }
        }
        self.chosen.pop();
    }

    fn gain(&self, switch: SwitchId, index: &MembershipIndex) -> usize {
        index.gain(switch, |f| self.cover_count[f] > 0)
    }

    /// Lower bound on the number of switches required to cover all remaining flows. Returns
    /// `None` if the remaining flows cannot be covered with the allowed switches.
    fn lower_bound(&self, index: &MembershipIndex) -> Option<usize> {
        if self.remaining == 0 {
            return Some(self.chosen.len());
        }
        let max_gain = (0..index.num_switches())
            .filter(|s| !self.forbidden[*s])
            .map(|s| self.gain(s, index))
            .max()
            .unwrap_or(0);
        if max_gain == 0 {
            None
        } else {
            Some(self.chosen.len() + (self.remaining + max_gain - 1) / max_gain)
        }
    }
}

impl<'a> Solver<'a> for ExactSolver<'a> {
    fn new(dataset: &'a Dataset, time_budget: Option<Duration>) -> Result<Box<Self>, Error> {
        let index = MembershipIndex::build(dataset.num_switches(), dataset.paths())?;
        let candidates = dataset
            .paths()
            .iter()
            .map(|p| p.iter().copied().sorted().dedup().collect())
            .collect();
        let stop_time: Option<SystemTime> = time_budget.map(|dur| SystemTime::now() + dur);
        Ok(Box::new(Self {
            dataset,
            index,
            candidates,
            stop_time,
            max_nodes: None,
            max_gap: None,
            num_states: 0,
        }))
    }

    fn work(&mut self, mut abort: Stopper) -> Result<Selection, Error> {
        // start with the greedy solution
        let mut greedy = GreedySolver::<FullScan>::new(self.dataset, None)?;
        greedy.set_observer(NoObserver);
        while let Progress::Selected(_) = greedy.step() {}
        let greedy_best: Vec<SwitchId> =
            greedy.steps().iter().map(|s| s.switch).sorted().collect();
        info!("Greedy solution uses {} switches", greedy_best.len());

        let remaining = self.candidates.iter().filter(|c| !c.is_empty()).count();
        let mut search = Search {
            cover_count: vec![0; self.dataset.num_flows()],
            forbidden: vec![false; self.dataset.num_switches()],
            chosen: Vec::new(),
            remaining,
            best: greedy_best,
            root_bound: 0,
        };
        search.root_bound = search.lower_bound(&self.index).unwrap_or(0);
        let root_bound = search.root_bound;

        let result = self.branch(&mut search, &mut abort);

        let mut chosen = vec![false; self.dataset.num_switches()];
        search.best.iter().for_each(|s| chosen[*s] = true);
        let selection = Selection::from_chosen(self.dataset, chosen)?;

        match result {
            Ok(()) => {
                info!("Found the minimum cover with {} switches", selection.num_chosen());
                if selection.is_complete() {
                    Ok(selection)
                } else {
                    error!("{} flows cannot be covered!", selection.uncovered().len());
                    Err(Error::InfeasibleCoverage(Box::new(selection)))
                }
            }
            Err(Error::Timeout) => {
                let best = selection.num_chosen();
                warn!(
                    "Search stopped before proving optimality! Best solution uses {} switches \
                     (gap = {:.2}%)",
                    best,
                    relative_gap(best, root_bound) * 100.0
                );
                Err(Error::OptimumNotFound(Box::new(selection)))
            }
            Err(e) => Err(e),
        }
    }

    #[cfg(feature = "count-states")]
    fn num_states(&self) -> usize {
        self.num_states
    }
}

impl<'a> OptimalSolver<'a> for ExactSolver<'a> {}

impl<'a> ExactSolver<'a> {
    /// Set the maximum number of search nodes. If this number is exceeded, the solver returns
    /// [`Error::OptimumNotFound`] with the best cover found so far.
    pub fn set_max_nodes(&mut self, max_nodes: usize) {
        self.max_nodes = Some(max_nodes);
    }

    /// Set the maximum relative gap `(best - bound) / best`, where `bound` is the lower bound of
    /// the root. Once the best cover is within this gap, the solver stops and returns
    /// [`Error::OptimumNotFound`] with that cover. A cover that matches the bound is still
    /// reported as optimal.
    pub fn set_max_gap(&mut self, max_gap: f64) {
        self.max_gap = Some(max_gap.max(0.0));
    }

    fn branch(&mut self, search: &mut Search, abort: &mut Stopper) -> Result<(), Error> {
        self.num_states += 1;

        if self.stop_time.as_ref().map(|time| time.elapsed().is_ok()).unwrap_or(false)
            || self.max_nodes.map(|max| self.num_states > max).unwrap_or(false)
        {
            return Err(Error::Timeout);
        }
        // a small enough gap ends the search like a used up budget
        if let Some(max_gap) = self.max_gap {
            let best = search.best.len();
            let gap = relative_gap(best, search.root_bound);
            if best > search.root_bound && gap <= max_gap {
                debug!("Reached a relative gap of {:.2}%", gap * 100.0);
                return Err(Error::Timeout);
            }
        }
        if abort.try_is_stop().unwrap_or(false) {
            info!("Operation was aborted!");
            return Err(Error::Abort);
        }

        if search.remaining == 0 {
            if search.chosen.len() < search.best.len() {
                debug!("Found a better cover with {} switches", search.chosen.len());
                search.best = search.chosen.clone();
            }
            return Ok(());
        }

        match search.lower_bound(&self.index) {
            Some(bound) if bound < search.best.len() => {}
            _ => return Ok(()),
        }

        // branch on the uncovered flow with the fewest allowed switches
        let flow: FlowId = match (0..self.dataset.num_flows())
            .filter(|f| search.cover_count[*f] == 0 && !self.candidates[*f].is_empty())
            .min_by_key(|f| self.candidates[*f].iter().filter(|s| !search.forbidden[**s]).count())
        {
            Some(f) => f,
            None => return Ok(()),
        };

        let options: Vec<SwitchId> = self.candidates[flow]
            .iter()
            .copied()
            .filter(|s| !search.forbidden[*s])
            .sorted_by_key(|s| (Reverse(search.gain(*s, &self.index)), *s))
            .collect();

        let mut result = Ok(());
        for &switch in options.iter() {
            search.choose(switch, &self.index);
            result = self.branch(search, abort);
            search.unchoose(switch, &self.index);
            if result.is_err() {
                break;
            }
            search.forbidden[switch] = true;
        }
        for &switch in options.iter() {
            search.forbidden[switch] = false;
        }
        result
    }
}

/// Relative gap between the size of a cover and a lower bound.
fn relative_gap(best: usize, bound: usize) -> f64 {
    if best == 0 {
        0.0
    } else {
        (best - bound.min(best)) as f64 / best as f64
    }
}
