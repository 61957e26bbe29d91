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

//! Utility Functions for the bencher

use super::{BencherArguments, BencherResult, Run, RunStatus};

use flowcover::dataset::Dataset;
use flowcover::index::MembershipIndex;
use flowcover::Error as CoverError;

use csv::Writer;

use std::error::Error;

pub fn export_result(
    result: &BencherResult,
    args: &BencherArguments,
) -> Result<(), Box<dyn Error>> {
    if let Some(csv_base) = args.output_csv.as_ref() {
        for solver in args.solvers() {
            let solver_file = format!("{}_{}.csv", csv_base, solver.name());
            let mut wtr = Writer::from_path(solver_file)?;
            for run in result.runs(solver).iter() {
                wtr.serialize(run)?;
            }
            wtr.flush()?;
        }
    }

    if let Some(json_file) = args.output_json.as_ref() {
        let result_str = serde_json::to_string_pretty(result)?;
        std::fs::write(json_file, result_str)?;
    }

    Ok(())
}

pub fn summary(result: &BencherResult, args: &BencherArguments) -> String {
    let mut summ = format!(
        "[info: f={}, s={}, m={}]",
        result.num_flows, result.num_switches, result.num_memberships
    );
    for solver in args.solvers() {
        summ.push_str(&summary_bench(solver.name(), result.runs(solver)));
    }
    summ
}

fn summary_bench(title: &str, bench: &[Run]) -> String {
    let len = bench.len() as f64;
    let finished: Vec<&Run> = bench.iter().filter(|r| r.status != RunStatus::Failed).collect();
    let num_infeasible = bench.iter().filter(|r| r.status == RunStatus::Infeasible).count();
    format!(
        " [{}: k={:.1}, t={:.3}s, i={:.1}{}]",
        title,
        finished.iter().fold(0.0, |x, r| x + r.num_chosen as f64) / finished.len() as f64,
        bench.iter().fold(0.0, |x, r| x + r.time) / len,
        bench.iter().fold(0.0, |x, r| x + (r.num_states as f64)) / len,
        if num_infeasible > 0 { format!(", infeasible={}", num_infeasible) } else { String::new() },
    )
}

/// Check that every switch referenced by the dataset is in range. Infeasible datasets are still
/// benchmarked, since every solver reports its partial selection.
pub fn check_dataset(dataset: &Dataset) -> Result<(), CoverError> {
    MembershipIndex::build(dataset.num_switches(), dataset.paths()).map(|_| ())
}
