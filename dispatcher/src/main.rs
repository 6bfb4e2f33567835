use std::collections::HashMap;
use std::process;
use std::thread;

use crossbeam_channel::unbounded;
use log::info;

use shared_resources::config::DispatcherConfig;
use udpnet::{comm, sock};

pub mod floors;
pub mod network;
pub mod queue;
pub mod records;
pub mod scheduler;
pub mod shutdown;
pub mod status;
pub mod worker;

fn main() {
    env_logger::init();

    // READ CONFIGURATION
    let config = match DispatcherConfig::get() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            process::exit(1);
        }
    };
    info!("dispatcher listening on port {}", config.port);

    // INITIALIZE SHARED STATE
    let records = records::new_shared(config.building.num_cars);
    let pool = scheduler::new_pool();

    // INITIALIZE CHANNELS
    let (recv_tx, recv_rx) = unbounded();
    let (send_tx, send_rx) = unbounded();
    let (floor_call_tx, floor_call_rx) = unbounded();
    let (scheduler_status_tx, scheduler_status_rx) = unbounded();
    let (coordinator_status_tx, coordinator_status_rx) = unbounded();
    let (display_tx, display_rx) = unbounded();
    let (end_tx, end_rx) = unbounded();
    let (done_tx, done_rx) = unbounded();
    let (scheduler_shutdown_tx, scheduler_shutdown_rx) = unbounded();

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
    thread::Builder::new()
        .name("udp_sender".to_string())
        .spawn(move || {
            if comm::tx_to(send_rx).is_err() {
                process::exit(1);
            }
        })
        .unwrap();
    thread::Builder::new()
        .name("router".to_string())
        .spawn({
            let floor_call_tx = floor_call_tx.clone();
            move || network::main(recv_rx, floor_call_tx, end_tx)
        })
        .unwrap();

    // INITIALIZE THREADS FOR FLOOR NOTIFIERS
    let mut arrival_txs = Vec::new();
    for floor in 0..config.building.num_floors {
        let (arrival_tx, arrival_rx) = unbounded();
        arrival_txs.push(arrival_tx);
        let floor_addr = sock::localhost(config.floor_ports[floor as usize]);
        let send_tx = send_tx.clone();
        thread::Builder::new()
            .name(format!("floor_notifier_{}", floor))
            .spawn(move || floors::main(floor, floor_addr, arrival_rx, send_tx))
            .unwrap();
    }

    // INITIALIZE THREADS FOR DISPATCH WORKERS
    let mut inboxes = HashMap::new();
    let mut worker_shutdown_txs = Vec::new();
    for car in 0..config.building.num_cars {
        let (inbox_tx, inbox_rx) = unbounded();
        inboxes.insert(car, inbox_tx);
        let (worker_shutdown_tx, worker_shutdown_rx) = unbounded();
        worker_shutdown_txs.push(worker_shutdown_tx);
        let channels = worker::Channels {
            inbox_rx,
            shutdown_rx: worker_shutdown_rx,
            arrival_txs: arrival_txs.clone(),
            scheduler_tx: scheduler_status_tx.clone(),
            coordinator_tx: coordinator_status_tx.clone(),
            display_tx: display_tx.clone(),
        };
        let car_addr = sock::localhost(config.car_ports[car as usize]);
        let timing = config.timing;
        let num_floors = config.building.num_floors;
        let records = records.clone();
        let pool = pool.clone();
        thread::Builder::new()
            .name(format!("dispatch_worker_{}", car))
            .spawn(move || {
                worker::main(car, car_addr, timing, num_floors, records, pool, channels)
            })
            .unwrap();
    }

    // INITIALIZE THREAD FOR SCHEDULER
    thread::Builder::new()
        .name("scheduler".to_string())
        .spawn({
            let records = records.clone();
            let pool = pool.clone();
            let display_tx = display_tx.clone();
            move || {
                scheduler::main(
                    records,
                    pool,
                    floor_call_rx,
                    scheduler_status_rx,
                    inboxes,
                    display_tx,
                    scheduler_shutdown_rx,
                )
            }
        })
        .unwrap();

    // INITIALIZE THREAD FOR STATUS DISPLAY
    let building = config.building;
    thread::Builder::new()
        .name("status_display".to_string())
        .spawn(move || status::main(building, display_rx))
        .unwrap();

    // INITIALIZE THREAD FOR SHUTDOWN COORDINATOR
    let car_addrs = config
        .car_ports
        .iter()
        .map(|port| sock::localhost(*port))
        .collect();
    let floor_addrs = config
        .floor_ports
        .iter()
        .map(|port| sock::localhost(*port))
        .collect();
    thread::Builder::new()
        .name("shutdown_coordinator".to_string())
        .spawn({
            let records = records.clone();
            move || {
                shutdown::main(
                    building,
                    records,
                    end_rx,
                    coordinator_status_rx,
                    car_addrs,
                    floor_addrs,
                    worker_shutdown_txs,
                    scheduler_shutdown_tx,
                    done_tx,
                )
            }
        })
        .unwrap();

    // main keeps the status senders alive so the scheduler and coordinator
    // outlive any removed worker
    done_rx.recv().unwrap();
    info!("simulation complete");
}
