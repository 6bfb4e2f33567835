/// ----- DATAGRAM COMM MODULE -----
/// Channel-driven send and receive loops. A tx loop drains a channel of
/// messages and sends each as one encoded datagram; an rx loop decodes every
/// datagram arriving on a bound port and forwards it, with its sender
/// address, on a channel. Invalid datagrams are logged and dropped here so
/// protocol errors never propagate past the receive boundary.
use std::io;
use std::net;

use crossbeam_channel as cbc;
use log::warn;

use shared_resources::message::{self, Message};

use crate::sock;

pub enum RxError<T> {
    IoError(io::Error),
    SendError(cbc::SendError<T>),
}

impl<T> From<io::Error> for RxError<T> {
    fn from(e: io::Error) -> Self {
        RxError::IoError(e)
    }
}

impl<T> From<cbc::SendError<T>> for RxError<T> {
    fn from(e: cbc::SendError<T>) -> Self {
        RxError::SendError(e)
    }
}

/// Sends every message from `ch` to the fixed `target`. Returns when the
/// sending side of the channel is gone.
pub fn tx(target: net::SocketAddr, ch: cbc::Receiver<Message>) -> io::Result<()> {
    let sock = sock::new_tx()?;
    loop {
        let data = match ch.recv() {
            Ok(data) => data,
            Err(_) => return Ok(()),
        };
        if let Err(e) = sock.send_to(&message::encode(&data), target) {
            warn!("unable to send packet to {}: {}", target, e);
        }
    }
}

/// Like `tx` but every message carries its own target address.
pub fn tx_to(ch: cbc::Receiver<(Message, net::SocketAddr)>) -> io::Result<()> {
    let sock = sock::new_tx()?;
    loop {
        let (data, target) = match ch.recv() {
            Ok(pair) => pair,
            Err(_) => return Ok(()),
        };
        if let Err(e) = sock.send_to(&message::encode(&data), target) {
            warn!("unable to send packet to {}: {}", target, e);
        }
    }
}

/// Receives on `port` forever, forwarding every valid message with its
/// sender address. Returns `Err` only when creating the socket fails;
/// afterwards bad datagrams are logged and dropped.
pub fn rx(
    port: u16,
    ch: cbc::Sender<(Message, net::SocketAddr)>,
) -> Result<(), RxError<(Message, net::SocketAddr)>> {
    let sock = sock::new_rx(port)?;
    let mut buf = [0; 1024];
    loop {
        let (n, from) = match sock.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) => {
                warn!("receive on port {} failed: {}", port, e);
                continue;
            }
        };
        match message::decode(&buf[..n]) {
            Ok(data) => ch.send((data, from))?,
            Err(e) => warn!("dropping bad datagram from {}: {}", from, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use shared_resources::direction::Direction;

    #[test]
    fn tx_to_and_rx_carry_a_message_across_loopback() {
        let receiver = sock::new_rx(0).unwrap();
        let port = receiver.local_addr().unwrap().port();
        drop(receiver); // rx() rebinds the port itself
        let (incoming_tx, incoming_rx) = cbc::unbounded();
        thread::spawn(move || {
            let _ = rx(port, incoming_tx);
        });

        let (send_tx, send_rx) = cbc::unbounded();
        thread::spawn(move || {
            let _ = tx_to(send_rx);
        });

        let sent = Message::FloorCall {
            direction: Direction::Up,
            source_floor: 1,
            target_floor: 3,
            car: u8::MAX,
            fault_code: 0,
            fault_floor: 0,
        };
        send_tx.send((sent, sock::localhost(port))).unwrap();

        let (received, _from) = incoming_rx
            .recv_timeout(std::time::Duration::from_secs(2))
            .unwrap();
        assert_eq!(received, sent);
    }

    #[test]
    fn tx_sends_every_message_to_its_fixed_target() {
        let receiver = sock::new_rx(0).unwrap();
        let port = receiver.local_addr().unwrap().port();
        drop(receiver); // rx() rebinds the port itself
        let (incoming_tx, incoming_rx) = cbc::unbounded();
        thread::spawn(move || {
            let _ = rx(port, incoming_tx);
        });

        let (send_tx, send_rx) = cbc::unbounded();
        let target = sock::localhost(port);
        thread::spawn(move || {
            let _ = tx(target, send_rx);
        });

        send_tx.send(Message::Init).unwrap();
        send_tx.send(Message::Shutdown).unwrap();

        let timeout = std::time::Duration::from_secs(2);
        assert_eq!(incoming_rx.recv_timeout(timeout).unwrap().0, Message::Init);
        assert_eq!(incoming_rx.recv_timeout(timeout).unwrap().0, Message::Shutdown);
    }
}
