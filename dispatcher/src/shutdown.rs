/// ----- SHUTDOWN COORDINATOR MODULE -----
/// Ends the simulation cleanly. Every floor process announces that its
/// event script is spent; once all floors have and every car still in
/// service is parked, the coordinator broadcasts shutdown datagrams to all
/// processes, stops the worker and scheduler threads and releases main.
use std::collections::HashSet;
use std::net::SocketAddr;
use std::process;

use crossbeam_channel::{select, Receiver, Sender};
use log::{debug, info, warn};

use shared_resources::config::Building;
use shared_resources::message::{self, Message};
use udpnet::sock;

use crate::records::{self, CarStatus, SharedRecords};

pub fn main(
    building: Building,
    records: SharedRecords,
    end_rx: Receiver<SocketAddr>,
    status_rx: Receiver<CarStatus>,
    car_addrs: Vec<SocketAddr>,
    floor_addrs: Vec<SocketAddr>,
    worker_shutdown_txs: Vec<Sender<()>>,
    scheduler_shutdown_tx: Sender<()>,
    done_tx: Sender<()>,
) {
    // bound up front so a missing socket fails at startup, not at the end
    let socket = match sock::new_tx() {
        Ok(socket) => socket,
        Err(e) => {
            eprintln!("shutdown coordinator has no socket: {}", e);
            process::exit(1);
        }
    };

    let mut floors_done: HashSet<SocketAddr> = HashSet::new();

    loop {
        select! {
            recv(end_rx) -> msg => match msg {
                Ok(from) => {
                    floors_done.insert(from);
                    debug!("{} of {} floors out of events", floors_done.len(), building.num_floors);
                }
                Err(_) => return,
            },
            recv(status_rx) -> msg => {
                if msg.is_err() {
                    return;
                }
            },
        }
        if floors_done.len() >= building.num_floors as usize && records::all_stationary(&records) {
            break;
        }
    }

    info!("all floors done and all cars parked, shutting down");
    // sent from this thread's own socket; the datagrams are on the wire
    // before main is released and the process exits
    for addr in car_addrs.iter().chain(floor_addrs.iter()) {
        if let Err(e) = socket.send_to(&message::encode(&Message::Shutdown), *addr) {
            warn!("could not deliver shutdown to {}: {}", addr, e);
        }
    }
    for worker in &worker_shutdown_txs {
        let _ = worker.send(());
    }
    let _ = scheduler_shutdown_tx.send(());
    done_tx.send(()).unwrap();
}
