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

//! Reads and writes datasets in the flat CSV format. Every line (after the header) contains a
//! single `flow_id,switch_id` pair.

use super::{Dataset, DatasetError, PathsBuilder};
use crate::{FlowId, SwitchId};

use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use itertools::Itertools;
use log::*;
use serde::Serialize;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct EdgeRecord {
    flow_id: FlowId,
    switch_id: SwitchId,
}

impl Dataset {
    /// Load a dataset from a CSV file. See [`Dataset::from_reader`] for the format.
    pub fn from_csv(filename: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(filename.as_ref())?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded dataset from {}: {} flows, {} switches",
            filename.as_ref().display(),
            dataset.num_flows(),
            dataset.num_switches()
        );
        Ok(dataset)
    }

    /// Load a dataset in CSV format. The first line is a header and is ignored. Every other line
    /// contains a pair `flow_id,switch_id`, both non-negative integers. Empty lines, and lines
    /// with a missing field are skipped. The number of flows and switches is derived from the
    /// largest index found.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut builder = PathsBuilder::default();
        for record in rdr.records() {
            let record = record?;
            if let Some((flow, switch)) = parse_record(&record)? {
                builder.push(flow, switch).map_err(|entity| {
                    debug!("The {} index of record {:?} is too large", entity, record);
                    invalid_record(&record)
                })?;
            }
        }

        if builder.is_empty() {
            return Err(DatasetError::NoEdges);
        }

        Ok(builder.build())
    }

    /// Write the dataset to a CSV file, including the header `flow_id,switch_id`.
    pub fn write_csv(&self, filename: impl AsRef<Path>) -> Result<(), DatasetError> {
        self.write_to(File::create(filename)?)
    }

    /// Write the dataset in CSV format, including the header `flow_id,switch_id`. Flows with an
    /// empty path cannot be represented in this format.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut wtr = Writer::from_writer(writer);
        for (flow_id, switch_id) in self.pairs() {
            wtr.serialize(EdgeRecord { flow_id, switch_id })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Parses a single record. Returns `Ok(None)` if the record should be skipped.
fn parse_record(record: &StringRecord) -> Result<Option<(FlowId, SwitchId)>, DatasetError> {
    let (flow, switch) = match (record.get(0), record.get(1)) {
        (Some(f), Some(s)) if !f.is_empty() && !s.is_empty() => (f, s),
        _ => {
            debug!("Skipping incomplete record: {:?}", record);
            return Ok(None);
        }
    };
    match (flow.parse::<FlowId>(), switch.parse::<SwitchId>()) {
        (Ok(f), Ok(s)) => Ok(Some((f, s))),
        _ => Err(invalid_record(record)),
    }
}

fn invalid_record(record: &StringRecord) -> DatasetError {
    DatasetError::InvalidRecord {
        line: record.position().map(|p| p.line()).unwrap_or(0),
        content: record.iter().join(","),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn load_simple() {
        let data = "flow_id,switch_id\n0,0\n1,0\n1,1\n2,1\n";
        let d = Dataset::from_reader(data.as_bytes()).unwrap();
        assert_eq!(d.num_flows(), 3);
        assert_eq!(d.num_switches(), 2);
        assert_eq!(d.path(1), &[0, 1]);
    }

    #[test]
    fn load_skips_empty_and_incomplete_lines() {
        let data = "flow,switch\n0,4\n\n1,\n3\n 2 , 1 \n";
        let d = Dataset::from_reader(data.as_bytes()).unwrap();
        assert_eq!(d.num_flows(), 3);
        assert_eq!(d.num_switches(), 5);
        assert_eq!(d.path(0), &[4]);
        assert!(d.path(1).is_empty());
        assert_eq!(d.path(2), &[1]);
    }

    #[test]
    fn load_reports_invalid_record() {
        let data = "flow_id,switch_id\n0,0\n1,-3\n";
        match Dataset::from_reader(data.as_bytes()) {
            Err(DatasetError::InvalidRecord { line, content }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "1,-3");
            }
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn load_rejects_unrepresentable_index() {
        let data = "flow_id,switch_id\n0,1\n0,18446744073709551615\n";
        match Dataset::from_reader(data.as_bytes()) {
            Err(DatasetError::InvalidRecord { line, content }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "0,18446744073709551615");
            }
            r => panic!("unexpected result: {:?}", r),
        }

        let data = "flow_id,switch_id\n18446744073709551615,0\n";
        match Dataset::from_reader(data.as_bytes()) {
            Err(DatasetError::InvalidRecord { line, .. }) => assert_eq!(line, 2),
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn load_without_edges() {
        let data = "flow_id,switch_id\n";
        assert!(matches!(Dataset::from_reader(data.as_bytes()), Err(DatasetError::NoEdges)));
        assert!(matches!(Dataset::from_reader("".as_bytes()), Err(DatasetError::NoEdges)));
    }

    #[test]
    fn write_then_load() {
        let d = Dataset::from_pairs(vec![(0, 2), (0, 2), (1, 0), (2, 1), (2, 0)]);
        let mut buffer: Vec<u8> = Vec::new();
        d.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("flow_id,switch_id\n0,2\n"));
        assert_eq!(Dataset::from_reader(buffer.as_slice()).unwrap(), d);
    }
}
