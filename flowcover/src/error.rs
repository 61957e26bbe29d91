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

//! Module containing all error types

use crate::dataset::DatasetError;
use crate::selection::Selection;
use std::fmt;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// A flow or switch index lies outside of its declared range.
    #[error("Invalid index: {entity} {index} is out of range (expected < {bound})")]
    InvalidIndex {
        /// Kind of the entity which was referenced
        entity: Entity,
        /// The index that was found
        index: usize,
        /// Number of entities of this kind
        bound: usize,
    },
    /// A vector of chosen switches does not have one entry per switch of the dataset.
    #[error("Selection has {found} entries, but the dataset has {expected} switches")]
    SelectionLength {
        /// Number of switches in the dataset
        expected: usize,
        /// Length of the given selection
        found: usize,
    },
    /// Some flows can never be covered, because no switch on their path exists. The error
    /// contains the best partial selection, including the list of uncovered flows.
    #[error("{} flows cannot be covered by any switch!", .0.uncovered().len())]
    InfeasibleCoverage(Box<Selection>),
    /// The optimum was not found in the given budget. The error contains the best (complete)
    /// selection found so far.
    #[error("Optimum was not found: Best solution yet uses {} switches", .0.num_chosen())]
    OptimumNotFound(Box<Selection>),
    /// Used up all of the time budget
    #[error("The time budget was used up without finding any solution")]
    Timeout,
    /// On an operation abort
    #[error("The operation was aborted")]
    Abort,
    /// Error while loading or writing a dataset
    #[error("Dataset Error: {0}")]
    DatasetError(#[from] DatasetError),
    /// Error while writing or reading a selection
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the selection carried by the error, if there is one. This is the case for
    /// [`Error::InfeasibleCoverage`] and [`Error::OptimumNotFound`].
    pub fn partial_selection(&self) -> Option<&Selection> {
        match self {
            Self::InfeasibleCoverage(s) | Self::OptimumNotFound(s) => Some(&**s),
            _ => None,
        }
    }

    /// Consumes the error and returns the carried selection, if there is one.
    pub fn into_partial_selection(self) -> Option<Selection> {
        match self {
            Self::InfeasibleCoverage(s) | Self::OptimumNotFound(s) => Some(*s),
            _ => None,
        }
    }
}

/// Kind of entity referenced by an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A flow index
    Flow,
    /// A switch index
    Switch,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Entity::Flow => write!(f, "flow"),
            Entity::Switch => write!(f, "switch"),
        }
    }
}
