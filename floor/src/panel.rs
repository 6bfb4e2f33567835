/// ----- PANEL MODULE -----
/// The floor's call panel: lamps lit by the injector when a call is raised,
/// cleared when the dispatcher reports a car's arrival at this floor. Exits
/// on the dispatcher's shutdown broadcast.
use std::collections::BTreeSet;
use std::net::SocketAddr;

use crossbeam_channel::{select, Receiver};
use log::{info, warn};

use shared_resources::direction::Direction;
use shared_resources::message::Message;

pub fn main(
    floor: u8,
    lamp_rx: Receiver<Direction>,
    recv_rx: Receiver<(Message, SocketAddr)>,
) {
    let mut lamps: BTreeSet<&'static str> = BTreeSet::new();

    loop {
        select! {
            recv(lamp_rx) -> msg => {
                if let Ok(direction) = msg {
                    lamps.insert(direction.as_str());
                    info!("floor {} lamps lit: {:?}", floor, lamps);
                }
            },
            recv(recv_rx) -> msg => {
                let message = match msg {
                    Ok((message, _)) => message,
                    Err(_) => return,
                };
                match message {
                    Message::Car { arrived: true, car, .. } => {
                        lamps.clear();
                        info!("floor {}: car {} has arrived", floor, car);
                    }
                    Message::Shutdown => {
                        info!("floor {} shutting down", floor);
                        return;
                    }
                    other => warn!("floor {} ignoring unexpected message {:?}", floor, other),
                }
            },
        }
    }
}
