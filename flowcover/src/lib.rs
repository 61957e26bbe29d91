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

#![deny(missing_docs)]

//! # FlowCover: Selecting Switches to Cover Network Flows
//! This is a library for choosing a small set of switches, such that every flow in a dataset
//! traverses at least one of the chosen switches. This is a set cover problem over the bipartite
//! relation between flows and the switches on their paths.
//!
//! ## Problem Statement
//! Given
//! - a set of flows $F$ and a set of switches $S$,
//! - for every flow $f \in F$ the path $p(f) \subseteq S$ it traverses,
//!
//! find a set $C \subseteq S$ of minimal size, such that $p(f) \cap C \neq \emptyset$ for every
//! flow $f$.
//!
//! ## Structure
//!
//! - **[`Dataset`](dataset)**: The flow to switch relation, together with a CSV loader and a
//!   generator for random datasets.
//!
//! - **[`MembershipIndex`](index::MembershipIndex)**: The reverse relation (switch to flows),
//!   which is built once per solve and used to compute the marginal gain of every switch.
//!
//! - **[`Solvers`](solvers)**: Collection of different solvers, all implementing the trait
//!   [`Solver`](solvers::Solver). The main one is the
//!   [`GreedySolver`](solvers::GreedySolver), which always picks the switch covering the most
//!   flows that are still uncovered. The [`ExactSolver`](solvers::ExactSolver) computes a
//!   minimum cover using branch and bound.
//!
//! - **[`Selection`](selection::Selection)**: The result of every solver, containing the chosen
//!   switches and the trace of the selection.
//!
//! - **[`Observer`](observer)**: Sink to which the greedy solver reports every step.
//!
//! ## Features
//!
//! - *`count-states`*: If this feature is enabled, then [solvers](solvers::Solver) will contain
//!   the method `num_states`, to get the number of gain evaluations (or search nodes) that were
//!   required.
//!
//! ## Usage
//!
//! ```
//! use flowcover::dataset::Dataset;
//! use flowcover::{solve, Error};
//!
//! fn main() -> Result<(), Error> {
//!     // prepare the dataset
//!     let dataset = Dataset::from_pairs(vec![(0, 0), (1, 0), (1, 1), (2, 1)]);
//!
//!     // select the switches
//!     let selection = solve(&dataset)?;
//!     assert_eq!(selection.selected_switches(), vec![0, 1]);
//!
//!     Ok(())
//! }
//! ```

pub mod dataset;
mod error;
pub mod index;
pub mod observer;
pub mod selection;
pub mod solvers;
#[cfg(test)]
mod test;

mod solve;
pub use solve::{solve, solve_exact, solve_parallel};

pub use error::{Entity, Error};

use std::sync::{Arc, RwLock};

/// Index of a flow, in the range `0..num_flows`.
pub type FlowId = usize;
/// Index of a switch, in the range `0..num_switches`.
pub type SwitchId = usize;

/// Stopper, to check when to stop, or to send the stop command
#[derive(Clone, Debug)]
pub struct Stopper {
    b: Arc<RwLock<bool>>,
    c: usize,
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopper {
    /// Create a new stopper
    pub fn new() -> Self {
        Self { b: Arc::new(RwLock::new(false)), c: 0 }
    }

    /// Send the stop command. This function will block until the write lock can be acquired. A
    /// poisoned lock is taken over, since the flag cannot be left in an inconsistent state.
    pub fn send_stop(&self) {
        match self.b.write() {
            Ok(mut b) => *b = true,
            Err(poisoned) => *poisoned.into_inner() = true,
        }
    }

    /// Checks if the stop flag is set. This funciton will not block, just continue if the
    /// read-lock cannot be acquired. The lock is only checked every 9th call.
    pub fn try_is_stop(&mut self) -> Option<bool> {
        self.c += 1;
        if self.c >= 9 {
            self.c = 0;
            self.b.try_read().map(|x| *x).ok()
        } else {
            None
        }
    }

    /// Checks if the stop flag is set. This funciton will block until the read lock can be
    /// acquired.
    pub fn is_stop(&self) -> bool {
        match self.b.read() {
            Ok(b) => *b,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
