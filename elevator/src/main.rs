use std::process;
use std::thread;

use crossbeam_channel::unbounded;
use log::{debug, info};

use shared_resources::config::CarConfig;
use shared_resources::message::Message;
use udpnet::{comm, sock};

pub mod doors;
pub mod fsm;

fn main() {
    env_logger::init();

    // READ CONFIGURATION
    let config = match CarConfig::get() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            process::exit(1);
        }
    };
    info!("car {} listening on port {}", config.id, config.port);

    // INITIALIZE CHANNELS
    let (command_tx, command_rx) = unbounded();
    let (door_command_tx, door_command_rx) = unbounded();
    let (door_event_tx, door_event_rx) = unbounded();
    let (door_state_tx, door_state_rx) = unbounded();
    let (send_tx, send_rx) = unbounded();

    // INITIALIZE NETWORK
    let port = config.port;
    thread::Builder::new()
        .name("udp_receiver".to_string())
        .spawn(move || {
            if comm::rx(port, command_tx).is_err() {
                eprintln!("could not bind port {}, already in use?", port);
                process::exit(1);
            }
        })
        .unwrap();
    thread::Builder::new()
        .name("udp_sender".to_string())
        .spawn(move || {
            if comm::tx_to(send_rx).is_err() {
                process::exit(1);
            }
        })
        .unwrap();

    // INITIALIZE THREAD FOR DOOR EVENTS
    let door_time = config.timing.door_time;
    thread::Builder::new()
        .name("doors".to_string())
        .spawn(move || doors::main(door_time, door_command_rx, door_event_tx, door_state_tx))
        .unwrap();

    // DOOR STATE MONITOR
    let car = config.id;
    thread::Builder::new()
        .name("door_monitor".to_string())
        .spawn(move || {
            for state in door_state_rx {
                debug!("car {} doors {:?}", car, state);
            }
        })
        .unwrap();

    // ANNOUNCE TO DISPATCHER
    send_tx
        .send((Message::Init, sock::localhost(config.dispatcher_port)))
        .unwrap();

    // RUN STATE MACHINE
    fsm::main(config, command_rx, door_command_tx, door_event_rx, send_tx);
}
