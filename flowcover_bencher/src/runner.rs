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

//! Runner for the Benchmark, based on the provided configuration

use super::utils::*;
use super::{BenchSolver, BencherArguments, BencherResult, DatasetSource, Run, RunStatus};

use flowcover::dataset::Dataset;
use flowcover::selection::Selection;
use flowcover::solvers::*;
use flowcover::{Error, Stopper};

use console::{style, Term};
use indicatif::ProgressBar;
use log::*;

use std::error::Error as StdError;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{spawn, JoinHandle};
use std::time::{Duration, Instant};

/// Benches the dataset source with the given configuration, producing a result, and generating
/// the files (if necessary).
pub fn bench(
    source: DatasetSource,
    scenario: String,
    args: BencherArguments,
) -> Result<BencherResult, Box<dyn StdError>> {
    // get the number of threads
    let num_threads = args.threads.unwrap_or_else(num_cpus::get);
    let solvers = args.solvers();

    // generate a TERM for nicer outputs
    let term = Term::stdout();
    term.write_line(&format!("{} {}...", style("Scenario:").bold().blue(), scenario,))?;

    term.write_line(&format!(
        "{} {}",
        style(format!("[0/{}]", solvers.len() + 1)).bright().black(),
        "checking the dataset..."
    ))?;

    let first = source.dataset(0).into_owned();
    let mut result = BencherResult {
        scenario: scenario.clone(),
        num_flows: first.num_flows(),
        num_switches: first.num_switches(),
        num_memberships: first.num_memberships(),
        greedy_result: Vec::new(),
        lazy_result: Vec::new(),
        parallel_result: Vec::new(),
        exact_result: Vec::new(),
    };

    if let Err(e) = check_dataset(&first) {
        term.clear_last_lines(2)?;
        term.write_line(&format!(
            "{} {}... {} {}",
            style("Scenario:").bold().blue(),
            scenario,
            style("Error:").bold().red(),
            e
        ))?;
        return Ok(result);
    }

    let source = Arc::new(source);
    for (i, solver) in solvers.iter().enumerate() {
        term.clear_last_lines(1)?;
        term.write_line(&format!(
            "{} Benchmarking {} solver...",
            style(format!("[{}/{}]", i + 1, solvers.len() + 1)).bright().black(),
            solver.name()
        ))?;
        *result.runs_mut(*solver) =
            worker_runner(&source, *solver, args.max_time, args.iterations, num_threads);
    }

    term.clear_last_lines(1)?;
    term.write_line(&format!(
        "{} {}",
        style(format!("[{}/{}]", solvers.len() + 1, solvers.len() + 1)).bright().black(),
        "Collecting results..."
    ))?;

    let summ = summary(&result, &args);

    export_result(&result, &args)?;

    term.clear_last_lines(2)?;
    term.write_line(&format!(
        "{} {}... {} {}",
        style("Scenario:").bold().blue(),
        scenario,
        style("Done").bold().green(),
        style(&summ).bright().black(),
    ))?;

    Ok(result)
}

fn worker_runner(
    source: &Arc<DatasetSource>,
    solver: BenchSolver,
    max_time: u64,
    iterations: usize,
    num_threads: usize,
) -> Vec<Run> {
    let mut result = Vec::with_capacity(iterations);

    let (sender, receiver) = channel::<Run>();
    let abort = Stopper::new();
    let jobs_todo = Arc::new(Mutex::new(iterations));
    let time_budget = Some(Duration::from_secs(max_time));

    let bar = ProgressBar::new(iterations as u64);
    bar.tick();

    // spawn all workers
    let _workers: Vec<JoinHandle<()>> = (0..num_threads.max(1))
        .map(|_| {
            let s = source.clone();
            let tx = sender.clone();
            let kill = abort.clone();
            let todo = jobs_todo.clone();
            spawn(move || worker(s, solver, iterations, time_budget, tx, kill, todo))
        })
        .collect();
    drop(sender);

    for _ in 0..iterations {
        match receiver.recv() {
            Ok(run) => {
                bar.inc(1);
                result.push(run);
            }
            Err(_) => {
                error!("All workers have stopped before finishing the benchmark!");
                break;
            }
        }
    }

    abort.send_stop();
    bar.finish_and_clear();

    result.sort_by_key(|r| r.iteration);
    result
}

fn worker(
    source: Arc<DatasetSource>,
    solver: BenchSolver,
    iterations: usize,
    time_budget: Option<Duration>,
    sender: Sender<Run>,
    mut kill: Stopper,
    jobs_todo: Arc<Mutex<usize>>,
) {
    loop {
        // check if kill switch was toggled
        if kill.try_is_stop().unwrap_or(false) {
            break;
        }

        // check if there are jobs todo
        let iteration = match jobs_todo.lock() {
            Ok(mut jobs_todo_lock) if *jobs_todo_lock > 0 => {
                *jobs_todo_lock -= 1;
                iterations - *jobs_todo_lock - 1
            }
            _ => break,
        };

        let dataset = source.dataset(iteration);
        let start_time = Instant::now();
        let (selection, num_states) = run_solver(solver, &dataset, time_budget, kill.clone());
        let time = start_time.elapsed().as_secs_f64();

        let (status, selection) = match selection {
            Ok(s) => (RunStatus::Covered, Some(s)),
            Err(Error::InfeasibleCoverage(s)) => (RunStatus::Infeasible, Some(*s)),
            Err(Error::OptimumNotFound(s)) => (RunStatus::NotOptimal, Some(*s)),
            Err(e) => {
                warn!("Iteration {} failed: {}", iteration, e);
                (RunStatus::Failed, None)
            }
        };

        let run = Run {
            iteration,
            status,
            num_chosen: selection.as_ref().map(|s| s.num_chosen()).unwrap_or(0),
            num_covered: selection.as_ref().map(|s| s.num_covered()).unwrap_or(0),
            time,
            num_states,
        };
        if sender.send(run).is_err() {
            break;
        }
    }
}

/// Run a single solver on the dataset. Returns the result and the number of states explored.
fn run_solver(
    solver: BenchSolver,
    dataset: &Dataset,
    time_budget: Option<Duration>,
    abort: Stopper,
) -> (Result<Selection, Error>, usize) {
    match solver {
        BenchSolver::Greedy => finish(GreedySolver::<FullScan>::new(dataset, time_budget), abort),
        BenchSolver::Lazy => finish(LazyGreedySolver::new(dataset, time_budget), abort),
        BenchSolver::Parallel => finish(ParallelGreedySolver::new(dataset, time_budget), abort),
        BenchSolver::Exact => finish(ExactSolver::new(dataset, time_budget), abort),
    }
}

fn finish<'a, S>(solver: Result<Box<S>, Error>, abort: Stopper) -> (Result<Selection, Error>, usize)
where
    S: Solver<'a>,
{
    match solver {
        Ok(mut solver) => {
            let result = solver.work(abort);
            (result, solver.num_states())
        }
        Err(e) => (Err(e), 0),
    }
}
