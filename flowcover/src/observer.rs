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

//! # Observer
//!
//! The [`GreedySolver`](crate::solvers::GreedySolver) reports every step to a [`StepObserver`].
//! This decouples the algorithm from the way progress is reported.

use crate::selection::Step;
use crate::FlowId;

use log::*;

/// Sink for the progress of a solver
pub trait StepObserver {
    /// Called after a switch was chosen. `num_flows` is the total number of flows.
    fn on_step(&mut self, step: &Step, num_flows: usize);

    /// Called once, when the solver detects that the remaining flows cannot be covered.
    fn on_infeasible(&mut self, _uncovered: &[FlowId]) {}
}

/// Observer that logs every step with level `info`.
#[derive(Debug, Default)]
pub struct LogObserver {
    num_steps: usize,
}

impl LogObserver {
    /// Create a new log observer
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepObserver for LogObserver {
    fn on_step(&mut self, step: &Step, num_flows: usize) {
        self.num_steps += 1;
        info!(
            "Step {}: chose switch {} (gain = {}, total covered = {}/{})",
            self.num_steps, step.switch, step.gain, step.covered, num_flows
        );
    }

    fn on_infeasible(&mut self, uncovered: &[FlowId]) {
        error!("Remaining {} flows cannot be covered!", uncovered.len());
        debug!("Uncovered flows: {:?}", uncovered);
    }
}

/// Observer which ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl StepObserver for NoObserver {
    fn on_step(&mut self, _step: &Step, _num_flows: usize) {}
}

/// Collects all steps
impl StepObserver for Vec<Step> {
    fn on_step(&mut self, step: &Step, _num_flows: usize) {
        self.push(*step);
    }
}

impl<T: StepObserver + ?Sized> StepObserver for &mut T {
    fn on_step(&mut self, step: &Step, num_flows: usize) {
        (**self).on_step(step, num_flows)
    }

    fn on_infeasible(&mut self, uncovered: &[FlowId]) {
        (**self).on_infeasible(uncovered)
    }
}
