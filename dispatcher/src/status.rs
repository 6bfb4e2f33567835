/// ----- STATUS DISPLAY MODULE -----
/// Live terminal table of every car's position, heading and workload, plus
/// the unscheduled-pool depth. Redrawn in place on each update.
use std::collections::{BTreeMap, BTreeSet};
use std::io::{stdout, Stdout, Write};

use crossbeam_channel::Receiver;
use crossterm::{cursor, terminal, ExecutableCommand, Result};

use shared_resources::config::Building;

use crate::records::CarRecord;

/// Car-state change or pool-depth update for the display thread.
#[derive(Debug, Clone)]
pub enum StatusEvent {
    Car(CarRecord),
    CarRemoved(u8),
    Unscheduled(usize),
}

pub fn main(building: Building, events_rx: Receiver<StatusEvent>) -> Result<()> {
    let mut stdout = stdout();

    let mut cars: BTreeMap<u8, CarRecord> = (0..building.num_cars)
        .map(|id| (id, CarRecord::new(id)))
        .collect();
    let mut removed: BTreeSet<u8> = BTreeSet::new();
    let mut unscheduled = 0;

    for event in events_rx {
        match event {
            StatusEvent::Car(record) => {
                cars.insert(record.id, record);
            }
            StatusEvent::CarRemoved(id) => {
                cars.remove(&id);
                removed.insert(id);
            }
            StatusEvent::Unscheduled(count) => unscheduled = count,
        }
        printstatus(&mut stdout, &cars, &removed, unscheduled)?;
    }
    Ok(())
}

fn printstatus(
    stdout: &mut Stdout,
    cars: &BTreeMap<u8, CarRecord>,
    removed: &BTreeSet<u8>,
    unscheduled: usize,
) -> Result<()> {
    stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

    writeln!(stdout, "+---------------------------------------------------------------+")?;
    writeln!(stdout, "| CARS IN SERVICE                                               |")?;
    writeln!(stdout, "+------------+------------+------------+------------+-----------+")?;
    writeln!(
        stdout,
        "| {0:<10} | {1:<10} | {2:<10} | {3:<10} | {4:<9} |",
        "CAR", "FLOOR", "HEADING", "GOING TO", "PENDING"
    )?;
    let mut lines: u16 = 4;
    for record in cars.values() {
        writeln!(stdout, "+------------+------------+------------+------------+-----------+")?;
        writeln!(
            stdout,
            "| {0:<10} | {1:<10} | {2:<10} | {3:<10} | {4:<9} |",
            record.id,
            record.floor,
            record.direction.as_str(),
            record.destination,
            record.pending
        )?;
        lines += 2;
    }
    writeln!(stdout, "+------------+------------+------------+------------+-----------+")?;
    lines += 1;

    if !removed.is_empty() {
        let ids: Vec<String> = removed.iter().map(|id| id.to_string()).collect();
        writeln!(stdout, "| OUT OF SERVICE: {0:<45} |", ids.join(", "))?;
        writeln!(stdout, "+---------------------------------------------------------------+")?;
        lines += 2;
    }
    writeln!(stdout, "| UNSCHEDULED REQUESTS: {0:<39} |", unscheduled)?;
    writeln!(stdout, "+---------------------------------------------------------------+")?;
    lines += 2;

    stdout.execute(cursor::MoveUp(lines))?;
    Ok(())
}
