use std::io;
use std::net::{self, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};

/// Ephemeral socket for sends (and for waiting on direct replies).
pub fn new_tx() -> io::Result<UdpSocket> {
    let sock = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    sock.set_reuse_address(true)?;
    let local_addr = net::SocketAddr::from(([0, 0, 0, 0], 0));
    sock.bind(&local_addr.into())?;
    Ok(sock.into())
}

/// Bound receive socket for a process's fixed listen port.
pub fn new_rx(port: u16) -> io::Result<UdpSocket> {
    let sock = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    sock.set_reuse_address(true)?;
    let local_addr = net::SocketAddr::from(([0, 0, 0, 0], port));
    sock.bind(&local_addr.into())?;
    Ok(sock.into())
}

pub fn localhost(port: u16) -> net::SocketAddr {
    net::SocketAddr::from(([127, 0, 0, 1], port))
}
