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

//! Generated datasets

use super::Dataset;
use crate::SwitchId;

use rand::prelude::*;
use rand::seq::index::sample;

/// # Random Dataset
///
/// Parameters for generating random datasets. Every flow traverses between `min_path_len` and
/// `max_path_len` distinct switches, chosen uniformly at random. With probability
/// `empty_probability`, a flow gets an empty path instead, which makes the dataset infeasible.
/// The same seed always produces the same dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomDataset {
    /// Number of flows to generate
    pub num_flows: usize,
    /// Number of switches in the network
    pub num_switches: usize,
    /// Minimal number of switches on every path
    pub min_path_len: usize,
    /// Maximal number of switches on every path
    pub max_path_len: usize,
    /// Probability that a flow has an empty path
    pub empty_probability: f64,
}

impl Default for RandomDataset {
    fn default() -> Self {
        Self {
            num_flows: 10_000,
            num_switches: 100,
            min_path_len: 2,
            max_path_len: 8,
            empty_probability: 0.0,
        }
    }
}

impl RandomDataset {
    /// Generate the dataset from the given seed.
    pub fn generate(&self, seed: u64) -> Dataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let max_len = self.max_path_len.max(self.min_path_len).min(self.num_switches);
        let min_len = self.min_path_len.min(max_len);
        let empty_probability = self.empty_probability.max(0.0).min(1.0);

        let paths = (0..self.num_flows)
            .map(|_| {
                if empty_probability > 0.0 && rng.gen_bool(empty_probability) {
                    return Vec::new();
                }
                let len = rng.gen_range(min_len, max_len + 1);
                sample(&mut rng, self.num_switches, len).into_vec()
            })
            .collect();

        Dataset { paths, num_switches: self.num_switches }
    }
}

/// Generates the classic dataset on which the greedy approach performs badly. The dataset has
/// `k + 2` switches. Switch 0 and 1 each cover one half of all flows, so the optimal cover has
/// size 2. Switch `1 + i` covers `2^i` flows, half of them on each side, such that at every step,
/// it covers strictly more uncovered flows than switch 0 or 1. Hence, the greedy approach chooses
/// all switches `2..k+2`.
pub fn greedy_trap(k: u32) -> Dataset {
    let mut paths: Vec<Vec<SwitchId>> = Vec::new();
    for i in 1..=k {
        let column = 1 + i as SwitchId;
        for _ in 0..(1usize << (i - 1)) {
            paths.push(vec![0, column]);
            paths.push(vec![1, column]);
        }
    }
    Dataset { paths, num_switches: k as usize + 2 }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn random_is_reproducible() {
        let params = RandomDataset { num_flows: 200, num_switches: 20, ..Default::default() };
        assert_eq!(params.generate(42), params.generate(42));
        assert_ne!(params.generate(42), params.generate(43));
    }

    #[test]
    fn random_respects_parameters() {
        let params = RandomDataset {
            num_flows: 500,
            num_switches: 10,
            min_path_len: 2,
            max_path_len: 4,
            empty_probability: 0.0,
        };
        let d = params.generate(1);
        assert_eq!(d.num_flows(), 500);
        assert_eq!(d.num_switches(), 10);
        for path in d.paths() {
            assert!(path.len() >= 2 && path.len() <= 4);
            assert!(path.iter().all(|s| *s < 10));
        }
    }

    #[test]
    fn random_with_empty_paths() {
        let params = RandomDataset {
            num_flows: 1000,
            num_switches: 10,
            empty_probability: 1.0,
            ..Default::default()
        };
        assert_eq!(params.generate(0).empty_flows().len(), 1000);
    }

    #[test]
    fn greedy_trap_shape() {
        let d = greedy_trap(3);
        assert_eq!(d.num_switches(), 5);
        assert_eq!(d.num_flows(), 14);
        assert_eq!(d.paths().iter().filter(|p| p[0] == 0).count(), 7);
        assert_eq!(d.paths().iter().filter(|p| p[1] == 4).count(), 8);
    }
}
