use std::process;
use std::thread;

use crossbeam_channel::unbounded;
use log::info;

use shared_resources::config::FloorConfig;
use shared_resources::events::EventSource;
use shared_resources::message::Message;
use udpnet::{comm, sock};

pub mod injector;
pub mod panel;

fn main() {
    env_logger::init();

    // READ CONFIGURATION
    let config = match FloorConfig::get() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            process::exit(1);
        }
    };
    info!("floor {} listening on port {}", config.id, config.port);

    // READ EVENT SCRIPT
    let source = match EventSource::from_path(&config.events_file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("event script error: {}", e);
            process::exit(1);
        }
    };
    let events: Vec<_> = source.for_floor(config.id).copied().collect();
    info!("floor {} has {} events to play", config.id, events.len());

    // INITIALIZE CHANNELS
    let (recv_tx, recv_rx) = unbounded();
    let (send_tx, send_rx) = unbounded();
    let (lamp_tx, lamp_rx) = unbounded();

    // INITIALIZE NETWORK
    let port = config.port;
    thread::Builder::new()
        .name("udp_receiver".to_string())
        .spawn(move || {
            if comm::rx(port, recv_tx).is_err() {
                eprintln!("could not bind port {}, already in use?", port);
                process::exit(1);
            }
        })
        .unwrap();
    // everything a floor sends goes to the dispatcher
    let dispatcher_addr = sock::localhost(config.dispatcher_port);
    thread::Builder::new()
        .name("udp_sender".to_string())
        .spawn(move || {
            if comm::tx(dispatcher_addr, send_rx).is_err() {
                process::exit(1);
            }
        })
        .unwrap();

    // ANNOUNCE TO DISPATCHER
    send_tx.send(Message::Init).unwrap();

    // INITIALIZE THREAD FOR EVENT INJECTION
    let floor = config.id;
    thread::Builder::new()
        .name("injector".to_string())
        .spawn(move || injector::main(floor, events, send_tx, lamp_tx))
        .unwrap();

    // RUN PANEL
    panel::main(config.id, lamp_rx, recv_rx);
}
