/// ----- FSM MODULE -----
/// The physical state machine of one car: motor state plus the door cycle
/// delegated to the doors module. The car never picks its own stops; it
/// executes the single destination most recently commanded and answers with
/// one arrival report per completed stop, sent back to the address the
/// command came from.
use std::net::SocketAddr;

use crossbeam_channel::{after, select, Receiver, Sender};
use log::{debug, error, info, warn};

use shared_resources::config::CarConfig;
use shared_resources::direction::Direction;
use shared_resources::message::{Message, FAULT_DOOR, FAULT_NONE, FAULT_OTHER};

use crate::doors::{DoorCommand, DoorEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    Idle,
    MovingUp,
    MovingDown,
    Error,
}

enum Flow {
    Continue,
    Exit,
}

pub fn main(
    config: CarConfig,
    command_rx: Receiver<(Message, SocketAddr)>,
    door_command_tx: Sender<DoorCommand>,
    door_event_rx: Receiver<DoorEvent>,
    send_tx: Sender<(Message, SocketAddr)>,
) {
    let mut motor = Motor::Idle;
    let mut floor: u8 = 0;

    loop {
        let (message, from) = match command_rx.recv() {
            Ok(received) => received,
            Err(_) => return,
        };
        match message {
            Message::Shutdown => {
                info!("car {} shutting down", config.id);
                return;
            }
            Message::Car {
                destination,
                arrived: false,
                fault_code,
                fault_floor,
                ..
            } => {
                let flow = serve(
                    &config,
                    &mut motor,
                    &mut floor,
                    destination,
                    fault_code,
                    fault_floor,
                    from,
                    &command_rx,
                    &door_command_tx,
                    &door_event_rx,
                    &send_tx,
                );
                if let Flow::Exit = flow {
                    return;
                }
                if motor == Motor::Error {
                    // terminal until the car process is restarted; stay
                    // silent so the dispatcher's timeout takes over
                    error!("car {} is faulted and will not answer again", config.id);
                    wait_for_shutdown(&command_rx);
                    return;
                }
            }
            Message::ForceClose => warn!("force close outside a stop, ignoring"),
            other => warn!("car {} ignoring unexpected message {:?}", config.id, other),
        }
    }
}

/// Drives the car to `destination` floor by floor, runs the door cycle and
/// reports the arrival. Fault injection: a door fault at the fault floor
/// interrupts the door close, any other fault silences the car there.
fn serve(
    config: &CarConfig,
    motor: &mut Motor,
    floor: &mut u8,
    destination: u8,
    fault_code: u8,
    fault_floor: u8,
    from: SocketAddr,
    command_rx: &Receiver<(Message, SocketAddr)>,
    door_command_tx: &Sender<DoorCommand>,
    door_event_rx: &Receiver<DoorEvent>,
    send_tx: &Sender<(Message, SocketAddr)>,
) -> Flow {
    if destination >= config.building.num_floors {
        error!(
            "car {} commanded to floor {} of {}, faulting",
            config.id, destination, config.building.num_floors
        );
        *motor = Motor::Error;
        return Flow::Continue;
    }

    *motor = match Direction::of_travel(*floor, destination) {
        Direction::Up => Motor::MovingUp,
        Direction::Down => Motor::MovingDown,
        Direction::Stationary => Motor::Idle,
    };

    let mut step = after(config.timing.travel_time);
    while *floor != destination {
        select! {
            recv(step) -> _ => {
                *floor = if destination > *floor { *floor + 1 } else { *floor - 1 };
                debug!("car {} at floor {}", config.id, floor);
                step = after(config.timing.travel_time);
            },
            recv(command_rx) -> msg => match msg {
                Ok((Message::Shutdown, _)) => return Flow::Exit,
                Ok((other, _)) => warn!("car {} ignoring {:?} while moving", config.id, other),
                Err(_) => return Flow::Exit,
            },
        }
    }
    *motor = Motor::Idle;

    if fault_code == FAULT_OTHER && fault_floor == *floor {
        *motor = Motor::Error;
        return Flow::Continue;
    }

    let faulty = fault_code == FAULT_DOOR && fault_floor == *floor;
    door_command_tx.send(DoorCommand::Open { faulty }).unwrap();
    loop {
        select! {
            recv(door_event_rx) -> event => match event {
                Ok(DoorEvent::Closed) => {
                    let arrival = Message::Car {
                        floor: *floor,
                        destination: *floor,
                        arrived: true,
                        car: config.id,
                        fault_code: FAULT_NONE,
                        fault_floor: 0,
                    };
                    send_tx.send((arrival, from)).unwrap();
                    return Flow::Continue;
                }
                Ok(DoorEvent::Fault) => {
                    send_tx.send((Message::DoorFailure, from)).unwrap();
                }
                Err(_) => return Flow::Exit,
            },
            recv(command_rx) -> msg => match msg {
                Ok((Message::ForceClose, _)) => {
                    door_command_tx.send(DoorCommand::ForceClose).unwrap();
                }
                Ok((Message::Shutdown, _)) => return Flow::Exit,
                Ok((other, _)) => warn!("car {} ignoring {:?} during a stop", config.id, other),
                Err(_) => return Flow::Exit,
            },
        }
    }
}

fn wait_for_shutdown(command_rx: &Receiver<(Message, SocketAddr)>) {
    loop {
        match command_rx.recv() {
            Ok((Message::Shutdown, _)) | Err(_) => return,
            Ok(_) => (),
        }
    }
}
