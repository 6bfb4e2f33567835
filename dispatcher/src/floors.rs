/// ----- FLOOR NOTIFIER MODULE -----
/// One notifier thread per floor. Dispatch workers report each completed
/// stop here; the notifier turns it into an arrival datagram for the floor
/// process so its panel can show which car has arrived.
use std::net::SocketAddr;

use crossbeam_channel::{Receiver, Sender};
use log::debug;

use shared_resources::message::{self, Message};

/// A car has stopped at a floor and opened its doors.
#[derive(Debug, Clone, Copy)]
pub struct Arrival {
    pub floor: u8,
    pub car: u8,
}

pub fn main(
    floor: u8,
    floor_addr: SocketAddr,
    arrival_rx: Receiver<Arrival>,
    send_tx: Sender<(Message, SocketAddr)>,
) {
    for arrival in arrival_rx {
        debug!("notifying floor {} that car {} has arrived", floor, arrival.car);
        let notice = Message::Car {
            floor: arrival.floor,
            destination: arrival.floor,
            arrived: true,
            car: arrival.car,
            fault_code: message::FAULT_NONE,
            fault_floor: 0,
        };
        if send_tx.send((notice, floor_addr)).is_err() {
            return;
        }
    }
}
