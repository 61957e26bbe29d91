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

//! # Dataset
//!
//! This module contains the flow to switch relation, which is the input of every
//! [solver](crate::solvers). A [`Dataset`] can be loaded from a CSV file (see
//! [`Dataset::from_csv`]), built from a list of `(flow, switch)` pairs, or generated randomly (see
//! [`RandomDataset`]).

mod loader;
mod random;

pub use random::{greedy_trap, RandomDataset};

use crate::{Entity, Error, FlowId, SwitchId};

use log::*;
use thiserror::Error;

/// # Dataset
///
/// Flow to switch relation. Every flow `f` in `0..num_flows` has a path, which is the sequence of
/// switches it traverses. The path may be empty, and it may contain the same switch multiple
/// times. All switch indices on paths are smaller than `num_switches`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    paths: Vec<Vec<SwitchId>>,
    num_switches: usize,
}

impl Dataset {
    /// Create a new dataset from the paths of all flows. The number of flows is given by the
    /// length of `paths`. Returns [`Error::InvalidIndex`] if any path references a switch outside
    /// of `0..num_switches`.
    pub fn new(paths: Vec<Vec<SwitchId>>, num_switches: usize) -> Result<Self, Error> {
        for path in paths.iter() {
            if let Some(&index) = path.iter().find(|s| **s >= num_switches) {
                return Err(Error::InvalidIndex {
                    entity: Entity::Switch,
                    index,
                    bound: num_switches,
                });
            }
        }
        let dataset = Self { paths, num_switches };
        dataset.warn_empty_flows();
        Ok(dataset)
    }

    /// Create a dataset from a sequence of `(flow, switch)` pairs. The number of flows and switches
    /// is derived as `1 + max index`, hence, every index below the maximum exists, even if it does
    /// not occur in any pair. The order of the pairs of a single flow is kept.
    ///
    /// # Panics
    /// Panics if an index is `usize::MAX`, or if the flows do not fit into memory. Use
    /// [`Dataset::try_from_pairs`] for indices from untrusted input.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (FlowId, SwitchId)>,
    {
        match Self::try_from_pairs(pairs) {
            Ok(dataset) => dataset,
            Err(e) => panic!("Cannot build the dataset: {}", e),
        }
    }

    /// Same as [`Dataset::from_pairs`], but returns [`Error::InvalidIndex`] if an index cannot be
    /// represented (it is `usize::MAX`, or the flows do not fit into memory).
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (FlowId, SwitchId)>,
    {
        let mut builder = PathsBuilder::default();
        for (flow, switch) in pairs {
            builder.push(flow, switch).map_err(|entity| Error::InvalidIndex {
                entity,
                index: if entity == Entity::Flow { flow } else { switch },
                bound: usize::MAX,
            })?;
        }
        Ok(builder.build())
    }

    /// Number of flows
    pub fn num_flows(&self) -> usize {
        self.paths.len()
    }

    /// Number of switches
    pub fn num_switches(&self) -> usize {
        self.num_switches
    }

    /// Returns the path of a flow. Panics if the flow does not exist.
    pub fn path(&self, flow: FlowId) -> &[SwitchId] {
        &self.paths[flow]
    }

    /// Returns the paths of all flows, indexed by the flow.
    pub fn paths(&self) -> &[Vec<SwitchId>] {
        &self.paths
    }

    /// Total number of `(flow, switch)` pairs, including duplicates.
    pub fn num_memberships(&self) -> usize {
        self.paths.iter().map(|p| p.len()).sum()
    }

    /// Returns all flows with an empty path. These flows can never be covered.
    pub fn empty_flows(&self) -> Vec<FlowId> {
        self.paths.iter().enumerate().filter(|(_, p)| p.is_empty()).map(|(f, _)| f).collect()
    }

    /// Iterate over all `(flow, switch)` pairs, in the order of the flows.
    pub fn pairs(&self) -> impl Iterator<Item = (FlowId, SwitchId)> + '_ {
        self.paths.iter().enumerate().flat_map(|(f, p)| p.iter().map(move |s| (f, *s)))
    }

    fn warn_empty_flows(&self) {
        for flow in self.empty_flows() {
            warn!("Flow {} has no switches in its path, it can never be covered!", flow);
        }
    }
}

/// Collects the paths of all flows from `(flow, switch)` pairs.
#[derive(Debug, Default)]
struct PathsBuilder {
    paths: Vec<Vec<SwitchId>>,
    num_switches: usize,
}

impl PathsBuilder {
    /// Add a pair. On failure, returns the entity whose index cannot be represented.
    fn push(&mut self, flow: FlowId, switch: SwitchId) -> Result<(), Entity> {
        let num_switches = switch.checked_add(1).ok_or(Entity::Switch)?;
        if flow >= self.paths.len() {
            let num_flows = flow.checked_add(1).ok_or(Entity::Flow)?;
            self.paths.try_reserve(num_flows - self.paths.len()).map_err(|_| Entity::Flow)?;
            self.paths.resize_with(num_flows, Vec::new);
        }
        self.paths[flow].push(switch);
        self.num_switches = self.num_switches.max(num_switches);
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn build(self) -> Dataset {
        let dataset = Dataset { paths: self.paths, num_switches: self.num_switches };
        dataset.warn_empty_flows();
        dataset
    }
}

/// Error while loading or writing a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Cannot read or write the file
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// Error of the CSV reader or writer
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    /// A record contains a value which is not a non-negative integer
    #[error("Invalid record on line {line}: {content}")]
    InvalidRecord {
        /// Line number of the record
        line: u64,
        /// Content of the record
        content: String,
    },
    /// The file contains no valid `(flow, switch)` pair
    #[error("No valid edges found in the dataset")]
    NoEdges,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_pairs_derives_sizes() {
        let d = Dataset::from_pairs(vec![(0, 3), (2, 1), (0, 3)]);
        assert_eq!(d.num_flows(), 3);
        assert_eq!(d.num_switches(), 4);
        assert_eq!(d.path(0), &[3, 3]);
        assert!(d.path(1).is_empty());
        assert_eq!(d.path(2), &[1]);
        assert_eq!(d.empty_flows(), vec![1]);
        assert_eq!(d.num_memberships(), 3);
    }

    #[test]
    fn from_pairs_empty() {
        let d = Dataset::from_pairs(Vec::new());
        assert_eq!(d.num_flows(), 0);
        assert_eq!(d.num_switches(), 0);
    }

    #[test]
    fn new_rejects_invalid_switch() {
        match Dataset::new(vec![vec![0, 1], vec![2]], 2) {
            Err(Error::InvalidIndex { entity: Entity::Switch, index: 2, bound: 2 }) => {}
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn try_from_pairs_rejects_max_index() {
        match Dataset::try_from_pairs(vec![(0, 1), (1, usize::MAX)]) {
            Err(Error::InvalidIndex { entity: Entity::Switch, index: usize::MAX, .. }) => {}
            r => panic!("unexpected result: {:?}", r),
        }
        match Dataset::try_from_pairs(vec![(usize::MAX, 0)]) {
            Err(Error::InvalidIndex { entity: Entity::Flow, index: usize::MAX, .. }) => {}
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn pairs_keep_path_order() {
        let d = Dataset::new(vec![vec![2, 0], vec![], vec![1]], 3).unwrap();
        let pairs: Vec<_> = d.pairs().collect();
        assert_eq!(pairs, vec![(0, 2), (0, 0), (2, 1)]);
    }
}
