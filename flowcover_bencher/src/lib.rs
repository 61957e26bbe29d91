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

//! # FlowCover Bencher
//!
//! This library benchmarks the solvers on a dataset, or on a sequence of random datasets.
#![deny(missing_docs)]

mod runner;
mod utils;

pub use runner::bench;

use flowcover::dataset::{Dataset, RandomDataset};

use clap::{Args, ValueEnum};
use serde::Serialize;
use std::borrow::Cow;

/// Source of the datasets used by the bencher
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// Every iteration uses the same dataset
    Fixed(Dataset),
    /// Iteration `i` uses a random dataset, generated with seed `seed + i`.
    Random {
        /// Parameters of the generator
        params: RandomDataset,
        /// Seed of the first iteration
        seed: u64,
    },
}

impl DatasetSource {
    /// Get the dataset for the given iteration
    pub fn dataset(&self, iteration: usize) -> Cow<'_, Dataset> {
        match self {
            DatasetSource::Fixed(d) => Cow::Borrowed(d),
            DatasetSource::Random { params, seed } => {
                Cow::Owned(params.generate(seed.wrapping_add(iteration as u64)))
            }
        }
    }
}

/// Arguments required for the bencher
#[derive(Args, Debug, Clone)]
pub struct BencherArguments {
    /// Number of iterations to repeat
    #[arg(short = 'i', long, default_value = "100")]
    pub iterations: usize,
    /// Maximum allowed time per run, in seconds. If the time exceeds the limit, the run is marked
    /// accordingly.
    #[arg(short = 't', long, default_value = "300")]
    pub max_time: u64,
    /// Perform benching the greedy solver (full scan)
    #[arg(long)]
    pub greedy: bool,
    /// Perform benching the greedy solver using a max-heap
    #[arg(long)]
    pub lazy: bool,
    /// Perform benching the greedy solver using parallel scans
    #[arg(long)]
    pub parallel: bool,
    /// Perform benching the exact solver
    #[arg(long)]
    pub exact: bool,
    /// Number of threads to use. Defaults to the number of threads available on the system.
    #[arg(short = 'p', long)]
    pub threads: Option<usize>,
    /// Output file to store the results. One file per solver will be created, e.g.
    /// "NAME_greedy.csv" and "NAME_exact.csv"! Don't provide the file ending ".csv"!
    #[arg(long = "csv")]
    pub output_csv: Option<String>,
    /// Output file to store the results in json format. Give the entire path, including the json
    /// ending.
    #[arg(long = "json")]
    pub output_json: Option<String>,
}

impl BencherArguments {
    /// Returns all solvers which are enabled
    pub fn solvers(&self) -> Vec<BenchSolver> {
        let mut solvers = Vec::new();
        if self.greedy {
            solvers.push(BenchSolver::Greedy);
        }
        if self.lazy {
            solvers.push(BenchSolver::Lazy);
        }
        if self.parallel {
            solvers.push(BenchSolver::Parallel);
        }
        if self.exact {
            solvers.push(BenchSolver::Exact);
        }
        solvers
    }
}

/// Solvers that can be benchmarked
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BenchSolver {
    /// [`GreedySolver`](flowcover::solvers::GreedySolver) using a full scan
    Greedy,
    /// [`LazyGreedySolver`](flowcover::solvers::LazyGreedySolver)
    Lazy,
    /// [`ParallelGreedySolver`](flowcover::solvers::ParallelGreedySolver)
    Parallel,
    /// [`ExactSolver`](flowcover::solvers::ExactSolver)
    Exact,
}

impl BenchSolver {
    /// Name of the solver, used for file names and the summary.
    pub fn name(&self) -> &'static str {
        match self {
            BenchSolver::Greedy => "greedy",
            BenchSolver::Lazy => "lazy",
            BenchSolver::Parallel => "parallel",
            BenchSolver::Exact => "exact",
        }
    }
}

/// Result type that contains the entire output
#[derive(Debug, Clone, Serialize)]
pub struct BencherResult {
    /// String describing the scenario
    pub scenario: String,
    /// Number of flows in the (first) dataset
    pub num_flows: usize,
    /// Number of switches in the (first) dataset
    pub num_switches: usize,
    /// Number of flow-switch pairs in the (first) dataset
    pub num_memberships: usize,
    /// Result of the greedy solver
    pub greedy_result: Vec<Run>,
    /// Result of the lazy greedy solver
    pub lazy_result: Vec<Run>,
    /// Result of the parallel greedy solver
    pub parallel_result: Vec<Run>,
    /// Result of the exact solver
    pub exact_result: Vec<Run>,
}

impl BencherResult {
    /// Returns the runs of a specific solver
    pub fn runs(&self, solver: BenchSolver) -> &[Run] {
        match solver {
            BenchSolver::Greedy => &self.greedy_result,
            BenchSolver::Lazy => &self.lazy_result,
            BenchSolver::Parallel => &self.parallel_result,
            BenchSolver::Exact => &self.exact_result,
        }
    }

    fn runs_mut(&mut self, solver: BenchSolver) -> &mut Vec<Run> {
        match solver {
            BenchSolver::Greedy => &mut self.greedy_result,
            BenchSolver::Lazy => &mut self.lazy_result,
            BenchSolver::Parallel => &mut self.parallel_result,
            BenchSolver::Exact => &mut self.exact_result,
        }
    }
}

/// Result of a single run
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    /// Iteration of the run (determines the dataset)
    pub iteration: usize,
    /// Outcome of the run
    pub status: RunStatus,
    /// Number of chosen switches
    pub num_chosen: usize,
    /// Number of covered flows
    pub num_covered: usize,
    /// Running time, measured in seconds
    pub time: f64,
    /// Number of states explored
    pub num_states: usize,
}

/// Outcome of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Every flow is covered
    Covered,
    /// Some flows cannot be covered
    Infeasible,
    /// The exact solver ran out of time, the result is the best one found
    NotOptimal,
    /// The solver did not produce any selection
    Failed,
}
