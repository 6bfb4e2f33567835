/// ----- CAR RECORDS MODULE -----
/// Dispatcher-side bookkeeping for the cars in service. Each record is
/// written only by the owning dispatch worker; the scheduler, the shutdown
/// coordinator and the status display read it under the same lock.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use shared_resources::direction::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRecord {
    pub id: u8,
    pub floor: u8,
    pub destination: u8,
    pub direction: Direction,
    pub pending: usize,
}

impl CarRecord {
    pub fn new(id: u8) -> Self {
        CarRecord {
            id,
            floor: 0,
            destination: 0,
            direction: Direction::Stationary,
            pending: 0,
        }
    }
}

pub type SharedRecords = Arc<Mutex<HashMap<u8, CarRecord>>>;

/// One record per car, all starting stationary at floor 0.
pub fn new_shared(num_cars: u8) -> SharedRecords {
    let records = (0..num_cars).map(|id| (id, CarRecord::new(id))).collect();
    Arc::new(Mutex::new(records))
}

/// True when every car still in service is stationary. Cars removed from
/// service no longer hold up shutdown.
pub fn all_stationary(records: &SharedRecords) -> bool {
    records
        .lock()
        .unwrap()
        .values()
        .all(|record| record.direction == Direction::Stationary)
}

/// Car-state change published by a dispatch worker.
#[derive(Debug, Clone)]
pub enum CarStatus {
    Updated(CarRecord),
    Removed(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cars_start_stationary_at_the_ground_floor() {
        let records = new_shared(3);
        assert_eq!(records.lock().unwrap().len(), 3);
        assert!(all_stationary(&records));
    }

    #[test]
    fn a_moving_car_blocks_stationarity_until_removed() {
        let records = new_shared(2);
        records.lock().unwrap().get_mut(&1).unwrap().direction = Direction::Up;
        assert!(!all_stationary(&records));
        records.lock().unwrap().remove(&1);
        assert!(all_stationary(&records));
    }
}
