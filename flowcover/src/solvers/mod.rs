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

//! # Solvers
//!
//! This module contains the different solvers for selecting switches. All of them implement the
//! trait [`Solver`], and all of them return a [`Selection`].
//!
//! ## Solvers
//!
//! - **[`GreedySolver`]**: At every step, this solver chooses the switch covering the most flows
//!   that are still uncovered, until every flow is covered. Ties are broken by choosing the switch
//!   with the lowest index, which makes the result deterministic. The greedy solver is not
//!   optimal, but it only needs `O(S * M)` time, where `S` is the number of switches and `M` is
//!   the number of `(flow, switch)` pairs.
//!
//!   *Type Arguments*: The type argument `S` is the [`SwitchScan`], used to find the switch with
//!   the largest gain. [`FullScan`] recomputes every gain at every step, [`LazyScan`] keeps the
//!   gains in a max-heap and only recomputes the ones that are outdated, and [`ParallelScan`]
//!   recomputes every gain using multiple threads. All of them produce exactly the same sequence
//!   of steps. For convenience, the aliases [`LazyGreedySolver`] and [`ParallelGreedySolver`]
//!   exist.
//!
//! - **[`ExactSolver`]**: This solver computes a minimum cover using branch and bound, starting
//!   with the greedy solution. This solver is an [`OptimalSolver`]. However, it is only feasible
//!   for small datasets.

mod exact;
mod greedy;
mod scan;

pub use exact::ExactSolver;
pub use greedy::{CoverState, GreedySolver, Progress};
pub use scan::{FullScan, LazyScan, ParallelScan, SwitchScan};

use crate::dataset::Dataset;
use crate::selection::Selection;
use crate::{Error, Stopper};

use std::time::Duration;

use log::*;

/// Greedy solver using a max-heap for finding the best switch
pub type LazyGreedySolver<'a> = GreedySolver<'a, LazyScan>;

/// Greedy solver scanning the switches using multiple threads
pub type ParallelGreedySolver<'a> = GreedySolver<'a, ParallelScan>;

/// Infterface for all solvers
pub trait Solver<'a> {
    /// Wrapper, that creates the solver and computes the selection.
    fn solve(
        dataset: &'a Dataset,
        time_budget: Option<Duration>,
        abort: Stopper,
    ) -> Result<Selection, Error> {
        let mut solver = match Self::new(dataset, time_budget) {
            Ok(s) => {
                info!(
                    "Dataset with {} flows and {} switches is valid!",
                    dataset.num_flows(),
                    dataset.num_switches()
                );
                s
            }
            Err(e) => {
                error!("Unexpected error while setting up the solver: {}", e);
                return Err(e);
            }
        };
        solver.work(abort)
    }

    /// Create the solver
    fn new(dataset: &'a Dataset, time_budget: Option<Duration>) -> Result<Box<Self>, Error>;

    /// Main function to compute the selection. If some flows cannot be covered, the partial
    /// selection is returned within [`Error::InfeasibleCoverage`].
    fn work(&mut self, abort: Stopper) -> Result<Selection, Error>;

    /// Returns the number of states explored by the solver (gain evaluations for the greedy
    /// solvers, search nodes for the exact solver).
    ///
    /// *This method is only available if the `"count-states"` feature is enabled!*
    #[cfg(feature = "count-states")]
    fn num_states(&self) -> usize;
}

/// Marking to tell that this solver always returns a minimum cover.
pub trait OptimalSolver<'a>: Solver<'a> {}
