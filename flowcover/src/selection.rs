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

//! # Selection
//!
//! Result type shared by all [solvers](crate::solvers), and functions to persist it.

use crate::dataset::Dataset;
use crate::index::MembershipIndex;
use crate::{Error, FlowId, SwitchId};

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Single step of a selection: The switch which was chosen, its marginal gain at the time it was
/// chosen, and the number of covered flows right after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    /// The switch that was chosen
    pub switch: SwitchId,
    /// Number of flows, that were newly covered by this switch
    pub gain: usize,
    /// Total number of covered flows after this step
    pub covered: usize,
}

/// # Selection
///
/// Set of chosen switches, together with the chronological trace of how they were chosen. A
/// selection may be partial, in which case [`Selection::uncovered`] lists all flows which are not
/// covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    chosen: Vec<bool>,
    steps: Vec<Step>,
    num_covered: usize,
    uncovered: Vec<FlowId>,
}

impl Selection {
    pub(crate) fn new(
        chosen: Vec<bool>,
        steps: Vec<Step>,
        num_covered: usize,
        uncovered: Vec<FlowId>,
    ) -> Self {
        Self { chosen, steps, num_covered, uncovered }
    }

    /// Generate the selection from a vector of chosen switches (e.g., computed by an external
    /// solver). The chosen switches are replayed in ascending order to compute the coverage and
    /// the trace. Every chosen switch produces a step, even if its gain is zero. Returns
    /// [`Error::SelectionLength`] if `chosen` does not have one entry per switch.
    pub fn from_chosen(dataset: &Dataset, chosen: Vec<bool>) -> Result<Self, Error> {
        if chosen.len() != dataset.num_switches() {
            return Err(Error::SelectionLength {
                expected: dataset.num_switches(),
                found: chosen.len(),
            });
        }
        let index = MembershipIndex::build(dataset.num_switches(), dataset.paths())?;
        let mut covered = vec![false; dataset.num_flows()];
        let mut num_covered = 0;
        let mut steps = Vec::new();
        for switch in (0..chosen.len()).filter(|s| chosen[*s]) {
            let gain = index.gain(switch, |f| covered[f]);
            for &flow in index.flows(switch) {
                if !covered[flow] {
                    covered[flow] = true;
                    num_covered += 1;
                }
            }
            steps.push(Step { switch, gain, covered: num_covered });
        }
        let uncovered = (0..covered.len()).filter(|f| !covered[*f]).collect();
        Ok(Self { chosen, steps, num_covered, uncovered })
    }

    /// Returns for every switch if it was chosen
    pub fn chosen(&self) -> &[bool] {
        &self.chosen
    }

    /// Returns all chosen switches in ascending order
    pub fn selected_switches(&self) -> Vec<SwitchId> {
        self.chosen.iter().enumerate().filter(|(_, c)| **c).map(|(s, _)| s).collect()
    }

    /// Number of chosen switches
    pub fn num_chosen(&self) -> usize {
        self.chosen.iter().filter(|c| **c).count()
    }

    /// Number of flows covered by the chosen switches
    pub fn num_covered(&self) -> usize {
        self.num_covered
    }

    /// Total number of flows in the dataset
    pub fn num_flows(&self) -> usize {
        self.num_covered + self.uncovered.len()
    }

    /// Returns true if every flow is covered
    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }

    /// Flows which are not covered by the selection
    pub fn uncovered(&self) -> &[FlowId] {
        &self.uncovered
    }

    /// Chronological trace of the selection
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Write the chosen switches to a file, one switch index per line.
    pub fn write_to_file(&self, filename: impl AsRef<Path>) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(filename)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the chosen switches, one switch index per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for switch in self.selected_switches() {
            writeln!(writer, "{}", switch)?;
        }
        Ok(())
    }

    /// Read a list of switches, written by [`Selection::write_to_file`]. Empty lines are ignored.
    pub fn read_from_file(filename: impl AsRef<Path>) -> Result<Vec<SwitchId>, Error> {
        Self::read_from(BufReader::new(File::open(filename)?))
    }

    /// Read a list of switches, one switch index per line. Empty lines are ignored.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Vec<SwitchId>, Error> {
        let mut switches = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let switch = line.parse::<SwitchId>().map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("{}: {:?}", e, line))
            })?;
            switches.push(switch);
        }
        Ok(switches)
    }
}

/// Count the flows which have at least one chosen switch on their path. Switches outside of
/// `chosen` count as not chosen.
pub fn count_covered_flows(dataset: &Dataset, chosen: &[bool]) -> usize {
    dataset
        .paths()
        .iter()
        .filter(|path| path.iter().any(|s| chosen.get(*s).copied().unwrap_or(false)))
        .count()
}
