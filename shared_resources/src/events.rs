/// ----- EVENT SOURCE MODULE -----
/// Reads the simulated floor-call events from a CSV file. The source is
/// finite and time-ordered; iterators over it can be recreated at will, so
/// a floor process can restart its injection pass without re-reading the
/// file.
use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::direction::Direction;

#[derive(Debug, serde::Deserialize)]
struct EventRow {
    time_offset_ms: u64,
    floor: u8,
    direction: String,
    destination: u8,
    #[serde(default)]
    fault_code: u8,
    #[serde(default)]
    fault_floor: u8,
}

/// One simulated floor call: press `direction` at `floor` after `offset`,
/// wanting to go to `destination`. The fault fields ride along to let the
/// simulation inject car faults at a given floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallEvent {
    pub offset: Duration,
    pub floor: u8,
    pub direction: Direction,
    pub destination: u8,
    pub fault_code: u8,
    pub fault_floor: u8,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("could not read event file: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse event file: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {record}: unknown direction {direction:?}")]
    BadDirection { record: usize, direction: String },
}

#[derive(Debug, Clone)]
pub struct EventSource {
    events: Vec<CallEvent>,
}

impl EventSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EventError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, EventError> {
        let mut events = Vec::new();
        let mut csv_reader = csv::Reader::from_reader(reader);
        for (record, row) in csv_reader.deserialize().enumerate() {
            let row: EventRow = row?;
            let direction = Direction::from_name(&row.direction).ok_or(
                EventError::BadDirection {
                    record,
                    direction: row.direction.clone(),
                },
            )?;
            events.push(CallEvent {
                offset: Duration::from_millis(row.time_offset_ms),
                floor: row.floor,
                direction,
                destination: row.destination,
                fault_code: row.fault_code,
                fault_floor: row.fault_floor,
            });
        }
        // the file is expected to be time-ordered already; a stable sort
        // keeps same-offset events in file order either way
        events.sort_by_key(|event| event.offset);
        Ok(EventSource { events })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallEvent> {
        self.events.iter()
    }

    /// Fresh pass over the events raised at one floor.
    pub fn for_floor(&self, floor: u8) -> impl Iterator<Item = &CallEvent> {
        self.events.iter().filter(move |event| event.floor == floor)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
