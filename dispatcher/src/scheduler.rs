/// ----- SCHEDULER MODULE -----
/// Routes incoming floor calls to exactly one dispatch worker. A request
/// goes to a car already moving toward it in its direction, else to a
/// stationary car with the fewest pending requests. When no car qualifies
/// the request lands in the shared unscheduled pool, which is retried on
/// every car-status update and never discarded.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{select, Receiver, SendError, Sender};
use log::{debug, info};

use shared_resources::direction::Direction;
use shared_resources::request::{Request, CAR_UNASSIGNED};

use crate::records::{CarRecord, CarStatus, SharedRecords};
use crate::status::StatusEvent;

pub type SharedPool = Arc<Mutex<Vec<Request>>>;

pub fn new_pool() -> SharedPool {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn main(
    records: SharedRecords,
    pool: SharedPool,
    floor_call_rx: Receiver<Request>,
    status_rx: Receiver<CarStatus>,
    inboxes: HashMap<u8, Sender<Request>>,
    display_tx: Sender<StatusEvent>,
    shutdown_rx: Receiver<()>,
) {
    loop {
        select! {
            recv(floor_call_rx) -> msg => {
                let request = match msg {
                    Ok(request) => request,
                    Err(_) => return,
                };
                if schedule(&records, &inboxes, &pool, request).is_none() {
                    info!("no car can take the new request yet, pooled");
                }
            },
            recv(status_rx) -> msg => {
                if msg.is_err() {
                    return;
                }
                retry_pool(&records, &inboxes, &pool);
            },
            recv(shutdown_rx) -> _ => return,
        }
        display_tx
            .send(StatusEvent::Unscheduled(pool.lock().unwrap().len()))
            .unwrap();
    }
}

/// Places one request on the chosen worker's inbox, waking that worker.
/// Returns the car id, or `None` when the request went to the pool instead.
pub fn schedule(
    records: &SharedRecords,
    inboxes: &HashMap<u8, Sender<Request>>,
    pool: &SharedPool,
    request: Request,
) -> Option<u8> {
    let choice = select_car(&records.lock().unwrap(), &request);
    if let Some(car) = choice {
        let assigned = Request { car, ..request };
        match inboxes.get(&car) {
            Some(inbox) => match inbox.send(assigned) {
                Ok(()) => {
                    debug!("request for floor {} assigned to car {}", request.destination, car);
                    return Some(car);
                }
                // the worker exited between selection and send
                Err(SendError(returned)) => {
                    pool.lock().unwrap().push(Request {
                        car: CAR_UNASSIGNED,
                        ..returned
                    });
                    return None;
                }
            },
            None => (),
        }
    }
    pool.lock().unwrap().push(request);
    None
}

/// Re-attempts every pooled request; anything still unschedulable goes
/// straight back to the pool.
pub fn retry_pool(
    records: &SharedRecords,
    inboxes: &HashMap<u8, Sender<Request>>,
    pool: &SharedPool,
) {
    let pending: Vec<Request> = pool.lock().unwrap().drain(..).collect();
    for request in pending {
        schedule(records, inboxes, pool, request);
    }
}

/// The routing rule: a car serving the request's direction and still on the
/// far side of the request's floor, else any stationary car, fewest pending
/// requests first.
pub fn select_car(records: &HashMap<u8, CarRecord>, request: &Request) -> Option<u8> {
    let moving = records
        .values()
        .filter(|record| record.direction == request.direction && toward(record, request))
        .min_by_key(|record| record.id);
    if let Some(record) = moving {
        return Some(record.id);
    }
    records
        .values()
        .filter(|record| record.direction == Direction::Stationary)
        .min_by_key(|record| (record.pending, record.id))
        .map(|record| record.id)
}

fn toward(record: &CarRecord, request: &Request) -> bool {
    match record.direction {
        Direction::Up => record.floor <= request.floor,
        Direction::Down => record.floor >= request.floor,
        Direction::Stationary => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    use crate::records;
    use shared_resources::request::{Fault, Origin};

    fn request(floor: u8, destination: u8, direction: Direction) -> Request {
        Request {
            origin: Origin::Floor,
            floor,
            direction,
            destination,
            car: CAR_UNASSIGNED,
            fault: Fault::None,
            fault_floor: 0,
            reply_to: None,
        }
    }

    struct Harness {
        records: SharedRecords,
        pool: SharedPool,
        inboxes: HashMap<u8, Sender<Request>>,
        inbox_rxs: HashMap<u8, Receiver<Request>>,
    }

    fn harness(num_cars: u8) -> Harness {
        let mut inboxes = HashMap::new();
        let mut inbox_rxs = HashMap::new();
        for car in 0..num_cars {
            let (tx, rx) = unbounded();
            inboxes.insert(car, tx);
            inbox_rxs.insert(car, rx);
        }
        Harness {
            records: records::new_shared(num_cars),
            pool: new_pool(),
            inboxes,
            inbox_rxs,
        }
    }

    #[test]
    fn two_up_requests_to_two_idle_cars_both_get_scheduled() {
        let h = harness(2);
        let first = schedule(&h.records, &h.inboxes, &h.pool, request(0, 3, Direction::Up));
        assert!(first.is_some());
        // make the chosen car look busy so the second request spreads out
        {
            let mut records = h.records.lock().unwrap();
            records.get_mut(&first.unwrap()).unwrap().pending = 1;
        }
        let second = schedule(&h.records, &h.inboxes, &h.pool, request(0, 5, Direction::Up));
        assert!(second.is_some());
        assert_ne!(first, second);
        assert!(h.pool.lock().unwrap().is_empty());
    }

    #[test]
    fn a_down_request_pools_while_every_car_serves_up() {
        let h = harness(2);
        for record in h.records.lock().unwrap().values_mut() {
            record.direction = Direction::Up;
            record.floor = 4;
        }
        let choice = schedule(&h.records, &h.inboxes, &h.pool, request(3, 0, Direction::Down));
        assert_eq!(choice, None);
        assert_eq!(h.pool.lock().unwrap().len(), 1);

        // once a car goes stationary the retry pass places it
        h.records.lock().unwrap().get_mut(&0).unwrap().direction = Direction::Stationary;
        retry_pool(&h.records, &h.inboxes, &h.pool);
        assert!(h.pool.lock().unwrap().is_empty());
        assert_eq!(h.inbox_rxs[&0].try_recv().unwrap().destination, 0);
    }

    #[test]
    fn a_moving_car_only_takes_requests_it_has_not_passed() {
        let h = harness(1);
        {
            let mut records = h.records.lock().unwrap();
            let record = records.get_mut(&0).unwrap();
            record.direction = Direction::Up;
            record.floor = 5;
        }
        // the car is above floor 3 and climbing, it cannot pick this up
        assert_eq!(
            select_car(&h.records.lock().unwrap(), &request(3, 7, Direction::Up)),
            None
        );
        assert_eq!(
            select_car(&h.records.lock().unwrap(), &request(6, 8, Direction::Up)),
            Some(0)
        );
    }

    #[test]
    fn a_dead_worker_inbox_sends_the_request_back_to_the_pool() {
        let mut h = harness(1);
        h.inbox_rxs.remove(&0); // worker gone, receiver dropped
        let choice = schedule(&h.records, &h.inboxes, &h.pool, request(0, 2, Direction::Up));
        assert_eq!(choice, None);
        let pool = h.pool.lock().unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].car, CAR_UNASSIGNED);
    }
}
