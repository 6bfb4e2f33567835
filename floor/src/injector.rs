/// ----- INJECTOR MODULE -----
/// Plays back this floor's share of the event script in real time: sleeps
/// until each event's offset, raises the floor call towards the dispatcher
/// and announces end-of-events once the script is spent.
use std::thread;
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, info};

use shared_resources::direction::Direction;
use shared_resources::events::CallEvent;
use shared_resources::message::Message;
use shared_resources::request::CAR_UNASSIGNED;

pub fn main(
    floor: u8,
    events: Vec<CallEvent>,
    send_tx: Sender<Message>,
    lamp_tx: Sender<Direction>,
) {
    let start = Instant::now();
    for event in &events {
        if let Some(wait) = event.offset.checked_sub(start.elapsed()) {
            thread::sleep(wait);
        }
        debug!(
            "floor {} raising a call {} to floor {}",
            floor,
            event.direction.as_str(),
            event.destination
        );
        let call = Message::FloorCall {
            direction: event.direction,
            source_floor: floor,
            target_floor: event.destination,
            car: CAR_UNASSIGNED,
            fault_code: event.fault_code,
            fault_floor: event.fault_floor,
        };
        if send_tx.send(call).is_err() {
            return;
        }
        let _ = lamp_tx.send(event.direction);
    }
    info!("floor {} is out of events", floor);
    let _ = send_tx.send(Message::Shutdown);
}
