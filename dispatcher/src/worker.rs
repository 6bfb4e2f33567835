/// ----- DISPATCH WORKER MODULE -----
/// One worker thread per car. The worker owns the car's pending queue,
/// commands the car over its own socket one destination at a time and
/// blocks on that same socket for exactly one reply per command. A car
/// that misses its reply budget is taken out of service and its queue is
/// handed back to the scheduler through the unscheduled pool.
use std::net::{SocketAddr, UdpSocket};
use std::process;
use std::time::Instant;

use crossbeam_channel::{select, Receiver, Sender};
use log::{debug, error, info, warn};

use shared_resources::config::Timing;
use shared_resources::direction::Direction;
use shared_resources::message::{self, Message, FAULT_NONE};
use shared_resources::request::{Fault, Request, CAR_UNASSIGNED};
use udpnet::sock;

use crate::floors::Arrival;
use crate::queue;
use crate::records::{CarRecord, CarStatus, SharedRecords};
use crate::scheduler::SharedPool;
use crate::status::StatusEvent;

enum Reply {
    Arrived(u8),
    DoorFailure,
    TimedOut,
}

pub struct Channels {
    pub inbox_rx: Receiver<Request>,
    pub shutdown_rx: Receiver<()>,
    pub arrival_txs: Vec<Sender<Arrival>>,
    pub scheduler_tx: Sender<CarStatus>,
    pub coordinator_tx: Sender<CarStatus>,
    pub display_tx: Sender<StatusEvent>,
}

pub fn main(
    car: u8,
    car_addr: SocketAddr,
    timing: Timing,
    num_floors: u8,
    records: SharedRecords,
    pool: SharedPool,
    channels: Channels,
) {
    let socket = match sock::new_tx() {
        Ok(socket) => socket,
        Err(e) => {
            eprintln!("dispatch worker for car {} has no socket: {}", car, e);
            process::exit(1);
        }
    };

    let mut floor: u8 = 0;
    let mut direction = Direction::Stationary;
    let mut queue: Vec<Request> = Vec::new();

    loop {
        if queue.is_empty() {
            select! {
                recv(channels.inbox_rx) -> msg => match msg {
                    Ok(request) => queue.push(request),
                    Err(_) => return,
                },
                recv(channels.shutdown_rx) -> _ => {
                    info!("dispatch worker for car {} stopping", car);
                    return;
                },
            }
        }
        while let Ok(request) = channels.inbox_rx.try_recv() {
            queue.push(request);
        }

        queue::resort(&mut queue, direction);
        let (destination, heading) = match queue::next_stop(&mut queue, direction) {
            Some(next) => next,
            None => continue,
        };
        direction = heading;

        // the served request carries the fault injection for this stop
        let (fault_code, fault_floor) = queue
            .iter()
            .find(|request| request.served_by(destination, direction))
            .map(|request| (request.fault.as_code(), request.fault_floor))
            .unwrap_or((FAULT_NONE, 0));

        publish(&channels, &records, car, floor, destination, direction, queue.len());

        let command = Message::Car {
            floor,
            destination,
            arrived: false,
            car,
            fault_code,
            fault_floor,
        };
        if socket.send_to(&message::encode(&command), car_addr).is_err() {
            warn!("car {} unreachable, retrying on the next pass", car);
            continue;
        }
        debug!("car {} commanded from floor {} to floor {}", car, floor, destination);

        let distance = destination.abs_diff(floor);
        let mut reply = wait_reply(&socket, &timing, distance, car, num_floors);
        if let Reply::DoorFailure = reply {
            // one forced close, then one more chance to report the arrival
            warn!("car {} reports stuck doors at floor {}, forcing close", car, destination);
            if socket
                .send_to(&message::encode(&Message::ForceClose), car_addr)
                .is_err()
            {
                reply = Reply::TimedOut;
            } else {
                reply = wait_reply(&socket, &timing, 0, car, num_floors);
            }
        }

        match reply {
            Reply::Arrived(at) => {
                floor = at;
                let served = queue::remove_served(&mut queue, floor, direction);
                if !served.is_empty() {
                    channels.arrival_txs[floor as usize]
                        .send(Arrival { floor, car })
                        .unwrap();
                }
                if queue.is_empty() {
                    direction = Direction::Stationary;
                    publish(&channels, &records, car, floor, floor, direction, 0);
                }
            }
            Reply::DoorFailure => {
                // a second failure in a row counts as a dead car
                remove_car(&channels, &records, &pool, car, queue);
                return;
            }
            Reply::TimedOut => {
                error!("car {} missed its reply budget, removing from service", car);
                remove_car(&channels, &records, &pool, car, queue);
                return;
            }
        }
    }
}

/// Waits on the worker's own socket for the one reply the outstanding
/// command owes, discarding datagrams from the wrong car or with an
/// impossible floor. Returns `TimedOut` once the budget is spent.
fn wait_reply(socket: &UdpSocket, timing: &Timing, distance: u8, car: u8, num_floors: u8) -> Reply {
    let deadline = Instant::now() + timing.reply_budget(distance);
    let mut buf = [0; message::MESSAGE_SIZE];
    loop {
        let remaining = match deadline.checked_duration_since(Instant::now()) {
            Some(remaining) if !remaining.is_zero() => remaining,
            _ => return Reply::TimedOut,
        };
        socket.set_read_timeout(Some(remaining)).unwrap();
        let n = match socket.recv(&mut buf) {
            Ok(n) => n,
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                return Reply::TimedOut;
            }
            Err(e) => {
                warn!("receive error while waiting on car {}: {}", car, e);
                continue;
            }
        };
        match message::decode(&buf[..n]) {
            Ok(Message::Car {
                floor,
                arrived: true,
                car: reply_car,
                ..
            }) => {
                if reply_car != car || floor >= num_floors {
                    warn!("discarding implausible arrival report {:?}", (reply_car, floor));
                    continue;
                }
                return Reply::Arrived(floor);
            }
            Ok(Message::DoorFailure) => return Reply::DoorFailure,
            Ok(other) => warn!("unexpected reply from car {}: {:?}", car, other),
            Err(e) => warn!("undecodable reply from car {}: {}", car, e),
        }
    }
}

/// Writes the worker's view of its car into the shared record and fans the
/// update out to the scheduler, the shutdown coordinator and the display.
/// A listener that has already stopped at shutdown just misses the update.
fn publish(
    channels: &Channels,
    records: &SharedRecords,
    car: u8,
    floor: u8,
    destination: u8,
    direction: Direction,
    pending: usize,
) {
    let record = CarRecord {
        id: car,
        floor,
        destination,
        direction,
        pending,
    };
    records.lock().unwrap().insert(car, record.clone());
    let _ = channels.scheduler_tx.send(CarStatus::Updated(record.clone()));
    let _ = channels.coordinator_tx.send(CarStatus::Updated(record.clone()));
    let _ = channels.display_tx.send(StatusEvent::Car(record));
}

/// Takes the car out of service: drops its record so it cannot be picked
/// again and returns its whole queue to the unscheduled pool. The injected
/// fault is stripped on the way back, one request takes down one car at
/// most.
fn remove_car(
    channels: &Channels,
    records: &SharedRecords,
    pool: &SharedPool,
    car: u8,
    queue: Vec<Request>,
) {
    records.lock().unwrap().remove(&car);
    pool.lock().unwrap().extend(queue.into_iter().map(|request| Request {
        car: CAR_UNASSIGNED,
        fault: Fault::None,
        fault_floor: 0,
        ..request
    }));
    let _ = channels.scheduler_tx.send(CarStatus::Removed(car));
    let _ = channels.coordinator_tx.send(CarStatus::Removed(car));
    let _ = channels.display_tx.send(StatusEvent::CarRemoved(car));
}
