/// ----- DOORS MODULE -----
/// This module owns the door state of one car. A stop opens the doors,
/// keeps them open for the configured dwell, then closes them and reports
/// completion to the state machine. A force close cuts the dwell short. A
/// simulated fault leaves the doors in error until a force close arrives.
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Door {
    Open,
    Closed,
    InProgress,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorCommand {
    Open { faulty: bool },
    ForceClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEvent {
    Closed,
    Fault,
}

pub fn main(
    door_time: Duration,
    command_rx: Receiver<DoorCommand>,
    event_tx: Sender<DoorEvent>,
    state_tx: Sender<Door>,
) {
    loop {
        let command = match command_rx.recv() {
            Ok(command) => command,
            Err(_) => return,
        };
        let faulty = match command {
            DoorCommand::Open { faulty } => faulty,
            // doors are already closed, nothing to force
            DoorCommand::ForceClose => continue,
        };

        state_tx.send(Door::InProgress).unwrap();
        debug!("doors opening");
        state_tx.send(Door::Open).unwrap();

        // dwell with the doors open; a force close cuts it short
        select! {
            recv(command_rx) -> msg => match msg {
                Ok(DoorCommand::ForceClose) => debug!("force close cut the dwell short"),
                Ok(other) => warn!("unexpected door command {:?} while open", other),
                Err(_) => return,
            },
            default(door_time) => (),
        }

        if faulty {
            state_tx.send(Door::Error).unwrap();
            warn!("simulated door fault, doors stuck");
            event_tx.send(DoorEvent::Fault).unwrap();
            // only a force close recovers the doors
            loop {
                match command_rx.recv() {
                    Ok(DoorCommand::ForceClose) => break,
                    Ok(other) => warn!("unexpected door command {:?} while faulted", other),
                    Err(_) => return,
                }
            }
        }

        state_tx.send(Door::InProgress).unwrap();
        debug!("doors closing");
        state_tx.send(Door::Closed).unwrap();
        event_tx.send(DoorEvent::Closed).unwrap();
    }
}
