/// ----- NETWORK ROUTER MODULE -----
/// Sorts decoded datagrams arriving on the dispatcher's fixed port. Floor
/// calls go to the scheduler, end-of-events announcements go to the
/// shutdown coordinator. Car replies never pass through here, each dispatch
/// worker waits for those on its own socket.
use std::net::SocketAddr;

use crossbeam_channel::{Receiver, Sender};
use log::{info, warn};

use shared_resources::message::Message;
use shared_resources::request::Request;

pub fn main(
    recv_rx: Receiver<(Message, SocketAddr)>,
    floor_call_tx: Sender<Request>,
    end_tx: Sender<SocketAddr>,
) {
    for (message, from) in recv_rx {
        match message {
            Message::FloorCall { .. } => {
                // from_message cannot fail for a floor call
                let request = Request::from_message(&message, from).unwrap();
                if floor_call_tx.send(request).is_err() {
                    return;
                }
            }
            Message::Shutdown => {
                if end_tx.send(from).is_err() {
                    return;
                }
            }
            Message::Init => info!("process at {} came online", from),
            other => warn!("unroutable message from {}: {:?}", from, other),
        }
    }
}
