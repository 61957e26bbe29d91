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

use flowcover::dataset::{greedy_trap, Dataset, RandomDataset};
use flowcover::selection::Selection;
use flowcover::solvers::*;
use flowcover::{Error as CoverError, Stopper};
use flowcover_bencher::*;

use clap::{Parser, Subcommand};
use log::*;
use std::error::Error;
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn Error>> {
    // run clap
    let args = CommandLineArguments::parse();

    // match on the action
    match args.cmd {
        MainCommand::Solve {
            csv_file,
            solver,
            threads,
            time_limit,
            max_gap,
            output,
            allow_partial,
        } => {
            // initialize the env logger
            pretty_env_logger::init();
            let dataset = Dataset::from_csv(&csv_file)?;
            println!("Loaded dataset:");
            println!("  Flows    : {}", dataset.num_flows());
            println!("  Switches : {}", dataset.num_switches());

            let start = Instant::now();
            let time_budget = time_limit.map(Duration::from_secs);
            let result = run_solver(&dataset, solver, threads, time_budget, max_gap);
            let runtime = start.elapsed().as_secs_f64();

            let (selection, complete) = match result {
                Ok(selection) => (selection, true),
                Err(CoverError::OptimumNotFound(selection)) => {
                    warn!("Search stopped early, the cover is not proven to be minimal!");
                    (*selection, true)
                }
                Err(CoverError::InfeasibleCoverage(selection)) => (*selection, false),
                Err(e) => return Err(e.into()),
            };

            print_selection(&selection, solver, runtime);

            if !complete {
                println!(
                    "Covered flows = {} / {} ({} flows have an empty path)",
                    selection.num_covered(),
                    selection.num_flows(),
                    selection.uncovered().len()
                );
                if !allow_partial {
                    return Err(CoverError::InfeasibleCoverage(Box::new(selection)).into());
                }
            }

            let output =
                output.unwrap_or_else(|| format!("selected_switches_{}.txt", solver.name()));
            selection.write_to_file(&output)?;
            println!("Selected switches written to {}", output);
        }
        MainCommand::Generate { csv_file, dataset, seed } => {
            pretty_env_logger::init();
            let params = dataset.params();
            info!(
                "Generating {} flows over {} switches (seed {})",
                params.num_flows, params.num_switches, seed
            );
            params.generate(seed).write_csv(&csv_file)?;
            println!("Dataset written to {}", csv_file);
        }
        MainCommand::Verify { csv_file, selection_file } => {
            pretty_env_logger::init();
            let dataset = Dataset::from_csv(&csv_file)?;
            let switches = Selection::read_from_file(&selection_file)?;
            let mut chosen = vec![false; dataset.num_switches()];
            for s in switches {
                match chosen.get_mut(s) {
                    Some(c) => *c = true,
                    None => {
                        return Err(CoverError::InvalidIndex {
                            entity: flowcover::Entity::Switch,
                            index: s,
                            bound: dataset.num_switches(),
                        }
                        .into())
                    }
                }
            }
            let selection = Selection::from_chosen(&dataset, chosen)?;
            println!("Chosen switches = {}", selection.num_chosen());
            println!("Covered flows   = {} / {}", selection.num_covered(), selection.num_flows());
            if !selection.is_complete() {
                return Err(format!(
                    "{} flows are not covered, e.g., {:?}",
                    selection.uncovered().len(),
                    &selection.uncovered()[..selection.uncovered().len().min(10)]
                )
                .into());
            }
        }
        MainCommand::Bencher { dataset, args } => {
            let scenario = dataset.repr();
            let source = dataset.source()?;
            bench(source, scenario, args)?;
        }
    }
    Ok(())
}

/// Run the chosen solver on the dataset.
fn run_solver(
    dataset: &Dataset,
    solver: BenchSolver,
    threads: Option<usize>,
    time_budget: Option<Duration>,
    max_gap: Option<f64>,
) -> Result<Selection, CoverError> {
    match solver {
        BenchSolver::Greedy => {
            GreedySolver::<FullScan>::solve(dataset, time_budget, Stopper::new())
        }
        BenchSolver::Lazy => LazyGreedySolver::solve(dataset, time_budget, Stopper::new()),
        BenchSolver::Parallel => {
            let mut solver = ParallelGreedySolver::new(dataset, time_budget)?;
            if let Some(n) = threads {
                solver.scan_mut().set_num_threads(n);
            }
            info!("Scanning the switches with {} threads", solver.scan_mut().num_threads());
            solver.work(Stopper::new())
        }
        BenchSolver::Exact => {
            let mut solver = ExactSolver::new(dataset, time_budget)?;
            if let Some(gap) = max_gap {
                solver.set_max_gap(gap);
            }
            solver.work(Stopper::new())
        }
    }
}

fn print_selection(selection: &Selection, solver: BenchSolver, runtime: f64) {
    println!("\nChosen switches ({} solution):", solver.name());
    for s in selection.selected_switches() {
        println!("  switch {}", s);
    }
    println!("Total chosen switches = {}", selection.num_chosen());
    println!("Runtime = {:.6} seconds", runtime);
}

/// Select switches to cover all network flows, generate datasets, and benchmark the solvers.
#[derive(Parser, Debug)]
#[command(name = "FlowCover", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Action to perform
    #[command(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Select the switches covering all flows of a dataset
    #[command(name = "solve")]
    Solve {
        /// CSV file with a header line, followed by `flow_id,switch_id` records
        csv_file: String,
        /// Solver to use
        #[arg(short = 's', long, value_enum, default_value = "greedy")]
        solver: BenchSolver,
        /// Number of threads for the parallel solver. Defaults to the number of cores.
        #[arg(short = 'p', long)]
        threads: Option<usize>,
        /// Time limit in seconds. The exact solver returns the best cover found so far.
        #[arg(short = 't', long)]
        time_limit: Option<u64>,
        /// Relative gap at which the exact solver stops, e.g., 0.01 for 1%
        #[arg(long)]
        max_gap: Option<f64>,
        /// Output file for the selected switches. Defaults to `selected_switches_<solver>.txt`
        #[arg(short = 'o', long)]
        output: Option<String>,
        /// Write the partial selection if some flows cannot be covered
        #[arg(long)]
        allow_partial: bool,
    },
    /// Generate a random dataset and write it as CSV
    #[command(name = "generate")]
    Generate {
        /// Output CSV file
        csv_file: String,
        /// Parameters of the random dataset
        #[command(flatten)]
        dataset: RandomArgs,
        /// Random seed, to get reproducable datasets
        #[arg(short = 's', long, default_value = "42")]
        seed: u64,
    },
    /// Check that a selection covers every flow of a dataset
    #[command(name = "verify")]
    Verify {
        /// CSV file of the dataset
        csv_file: String,
        /// File with one selected switch per line
        selection_file: String,
    },
    /// Run the Bencher
    #[command(name = "bench")]
    Bencher {
        /// Datasets to use
        #[command(subcommand)]
        dataset: DatasetSelection,
        /// Bencher Arguments
        #[command(flatten)]
        args: BencherArguments,
    },
}

#[derive(Subcommand, Debug)]
enum DatasetSelection {
    /// Use the same dataset, read from a CSV file, for every iteration
    #[command(name = "file")]
    File {
        /// CSV file of the dataset
        csv_file: String,
    },
    /// Use a new random dataset for every iteration
    #[command(name = "random")]
    Random {
        /// Parameters of the random dataset
        #[command(flatten)]
        dataset: RandomArgs,
        /// Seed of the first iteration. Iteration `i` uses `seed + i`.
        #[arg(short = 's', long, default_value = "42")]
        seed: u64,
    },
    /// Use the dataset on which the greedy solver chooses `k` switches instead of 2
    #[command(name = "trap")]
    Trap {
        /// Number of column switches
        #[arg(short = 'k', long, default_value = "10")]
        k: u32,
    },
}

impl DatasetSelection {
    fn repr(&self) -> String {
        match self {
            Self::File { csv_file } => format!("File({})", csv_file),
            Self::Random { dataset, seed } => format!(
                "Random(f={}, s={}, len={}..={}, empty={}, seed={})",
                dataset.flows,
                dataset.switches,
                dataset.min_path,
                dataset.max_path,
                dataset.empty,
                seed
            ),
            Self::Trap { k } => format!("Trap(k={})", k),
        }
    }

    fn source(self) -> Result<DatasetSource, Box<dyn Error>> {
        Ok(match self {
            Self::File { csv_file } => DatasetSource::Fixed(Dataset::from_csv(&csv_file)?),
            Self::Random { dataset, seed } => {
                DatasetSource::Random { params: dataset.params(), seed }
            }
            Self::Trap { k } => DatasetSource::Fixed(greedy_trap(k)),
        })
    }
}

#[derive(clap::Args, Debug, Clone)]
struct RandomArgs {
    /// Number of flows
    #[arg(short = 'f', long, default_value = "10000")]
    flows: usize,
    /// Number of switches
    #[arg(short = 'n', long, default_value = "100")]
    switches: usize,
    /// Minimal number of switches on every path
    #[arg(long, default_value = "2")]
    min_path: usize,
    /// Maximal number of switches on every path
    #[arg(long, default_value = "8")]
    max_path: usize,
    /// Probability that a flow has an empty path
    #[arg(long, default_value = "0.0")]
    empty: f64,
}

impl RandomArgs {
    fn params(&self) -> RandomDataset {
        RandomDataset {
            num_flows: self.flows,
            num_switches: self.switches,
            min_path_len: self.min_path,
            max_path_len: self.max_path,
            empty_probability: self.empty,
        }
    }
}
