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

//! # FlowCover
//! Wrapper functions to select switches

use crate::dataset::Dataset;
use crate::selection::Selection;
use crate::solvers::{ExactSolver, FullScan, GreedySolver, ParallelGreedySolver, Solver};
use crate::{Error, Stopper};

use log::*;
use std::time::Duration;

/// # Select Switches
///
/// This is the main function to interact with the system. It uses the
/// [`GreedySolver`](crate::solvers::GreedySolver), and logs every step.
///
/// ## Usage
///
/// ```
/// use flowcover::dataset::Dataset;
/// use flowcover::{solve, Error};
///
/// fn main() -> Result<(), Error> {
///     // let dataset = Dataset::from_csv("flows.csv")?;
/// # let dataset = Dataset::from_pairs(vec![(0, 0), (1, 0), (1, 1), (2, 1)]);
///     let selection = solve(&dataset)?;
///     println!("{:?}", selection.selected_switches());
///     Ok(())
/// }
/// ```
///
/// If some flows cannot be covered, then [`Error::InfeasibleCoverage`] is returned, containing
/// the partial selection:
///
/// ```
/// use flowcover::dataset::Dataset;
/// use flowcover::{solve, Error};
///
/// let dataset = Dataset::new(vec![vec![0], vec![0, 1], vec![]], 2).unwrap();
/// match solve(&dataset) {
///     Err(Error::InfeasibleCoverage(partial)) => {
///         assert_eq!(partial.selected_switches(), vec![0]);
///         assert_eq!(partial.uncovered(), &[2]);
///     }
///     _ => unreachable!(),
/// }
/// ```
pub fn solve(dataset: &Dataset) -> Result<Selection, Error> {
    info!("Selecting switches...");
    report(GreedySolver::<FullScan>::solve(dataset, None, Stopper::new()))
}

/// # Select Switches using multiple threads
///
/// Same as [`solve`], but the gains of all switches are computed in parallel, using `n_threads`
/// threads (defaults to the number of available cores). The result is identical to [`solve`].
pub fn solve_parallel(dataset: &Dataset, n_threads: Option<usize>) -> Result<Selection, Error> {
    let mut solver = ParallelGreedySolver::new(dataset, None)?;
    if let Some(n) = n_threads {
        solver.scan_mut().set_num_threads(n);
    }
    info!("Selecting switches using {} threads...", solver.scan_mut().num_threads());
    report(solver.work(Stopper::new()))
}

/// # Select the minimum number of switches
///
/// Uses the [`ExactSolver`](crate::solvers::ExactSolver). If the time limit is reached before the
/// optimum is proven, [`Error::OptimumNotFound`] is returned, containing the best selection found.
pub fn solve_exact(dataset: &Dataset, time_limit: Option<Duration>) -> Result<Selection, Error> {
    info!("Searching for the minimum cover...");
    report(ExactSolver::solve(dataset, time_limit, Stopper::new()))
}

fn report(result: Result<Selection, Error>) -> Result<Selection, Error> {
    match result {
        Ok(selection) => {
            info!("Found a complete cover with {} switches!", selection.num_chosen());
            Ok(selection)
        }
        Err(e) => {
            error!("Could not solve the problem: {}", e);
            Err(e)
        }
    }
}
