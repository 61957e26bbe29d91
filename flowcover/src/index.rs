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

//! # Membership Index
//!
//! The reverse relation of a [`Dataset`](crate::dataset::Dataset): for every switch, the list of
//! flows which traverse it.

use crate::{Entity, Error, FlowId, SwitchId};

use log::*;

/// # Membership Index
///
/// For every switch `s`, the flows which contain `s` on their path. The multiplicity of the
/// forward relation is kept: if the path of a flow lists the same switch twice, the flow appears
/// twice in the list of that switch. The index is built in a single pass over all flows in
/// ascending order. Therefore, every list is sorted, and all copies of the same flow are adjacent.
/// [`MembershipIndex::gain`] relies on this to count every flow at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipIndex {
    switch_flows: Vec<Vec<FlowId>>,
}

impl MembershipIndex {
    /// Build the index from the paths of all flows. Every switch in `0..num_switches` gets an
    /// entry, which is empty if no flow traverses this switch. Returns [`Error::InvalidIndex`] as
    /// soon as a path contains a switch outside of this range.
    pub fn build(num_switches: usize, paths: &[Vec<SwitchId>]) -> Result<Self, Error> {
        let mut switch_flows: Vec<Vec<FlowId>> = vec![Vec::new(); num_switches];
        for (flow, path) in paths.iter().enumerate() {
            for &switch in path.iter() {
                match switch_flows.get_mut(switch) {
                    Some(flows) => flows.push(flow),
                    None => {
                        error!("Flow {} references switch {}, which does not exist!", flow, switch);
                        return Err(Error::InvalidIndex {
                            entity: Entity::Switch,
                            index: switch,
                            bound: num_switches,
                        });
                    }
                }
            }
        }
        trace!(
            "Built the membership index for {} flows and {} switches",
            paths.len(),
            num_switches
        );
        Ok(Self { switch_flows })
    }

    /// Number of switches in the index
    pub fn num_switches(&self) -> usize {
        self.switch_flows.len()
    }

    /// Returns the flows traversing the switch, including duplicates. Panics if the switch does
    /// not exist.
    pub fn flows(&self, switch: SwitchId) -> &[FlowId] {
        &self.switch_flows[switch]
    }

    /// Iterate over all switches and their flows
    pub fn iter(&self) -> impl Iterator<Item = (SwitchId, &[FlowId])> + '_ {
        self.switch_flows.iter().map(|f| f.as_slice()).enumerate()
    }

    /// Marginal gain of a switch: the number of distinct flows in its list for which `is_covered`
    /// returns false. Duplicate entries of a flow are counted once.
    pub fn gain<F>(&self, switch: SwitchId, is_covered: F) -> usize
    where
        F: Fn(FlowId) -> bool,
    {
        let mut gain = 0;
        let mut last: Option<FlowId> = None;
        for &flow in self.switch_flows[switch].iter() {
            if last != Some(flow) && !is_covered(flow) {
                gain += 1;
            }
            last = Some(flow);
        }
        gain
    }
}
