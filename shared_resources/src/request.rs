use std::net::SocketAddr;

use crate::direction::Direction;
use crate::message::{self, Message};

/// Car id carried by a request that no dispatch worker has claimed yet
/// (the protocol's "-1" in a single-byte field).
pub const CAR_UNASSIGNED: u8 = u8::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Floor,
    Elevator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    Door,
    Other,
}

impl Fault {
    pub fn from_code(code: u8) -> Self {
        match code {
            message::FAULT_NONE => Fault::None,
            message::FAULT_DOOR => Fault::Door,
            _ => Fault::Other,
        }
    }

    pub fn as_code(self) -> u8 {
        match self {
            Fault::None => message::FAULT_NONE,
            Fault::Door => message::FAULT_DOOR,
            Fault::Other => message::FAULT_OTHER,
        }
    }
}

/// One unit of work flowing into the dispatcher, either a floor call or a
/// car status report. Immutable once constructed; ordered by destination
/// floor with a secondary tie on matching direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub origin: Origin,
    pub floor: u8,
    pub direction: Direction,
    pub destination: u8,
    pub car: u8,
    pub fault: Fault,
    pub fault_floor: u8,
    pub reply_to: Option<SocketAddr>,
}

impl Request {
    /// Builds a request from a decoded datagram, keeping the sender address
    /// for replies. Returns `None` for message kinds that carry no request.
    pub fn from_message(message: &Message, from: SocketAddr) -> Option<Self> {
        match *message {
            Message::FloorCall {
                direction,
                source_floor,
                target_floor,
                car,
                fault_code,
                fault_floor,
            } => Some(Request {
                origin: Origin::Floor,
                floor: source_floor,
                direction,
                destination: target_floor,
                car,
                fault: Fault::from_code(fault_code),
                fault_floor,
                reply_to: Some(from),
            }),
            Message::Car {
                floor,
                destination,
                car,
                fault_code,
                fault_floor,
                ..
            } => Some(Request {
                origin: Origin::Elevator,
                floor,
                direction: Direction::of_travel(floor, destination),
                destination,
                car,
                fault: Fault::from_code(fault_code),
                fault_floor,
                reply_to: Some(from),
            }),
            _ => None,
        }
    }

    /// True when serving a stop at `floor` in `direction` completes this
    /// request. The direction match is mandatory; an opposite-direction
    /// request at the same floor stays queued for a later pass.
    pub fn served_by(&self, floor: u8, direction: Direction) -> bool {
        self.destination == floor && self.direction == direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_addr() -> SocketAddr {
        "127.0.0.1:4711".parse().unwrap()
    }

    #[test]
    fn floor_call_becomes_a_floor_originated_request() {
        let message = Message::FloorCall {
            direction: Direction::Up,
            source_floor: 2,
            target_floor: 5,
            car: CAR_UNASSIGNED,
            fault_code: message::FAULT_DOOR,
            fault_floor: 5,
        };
        let request = Request::from_message(&message, some_addr()).unwrap();
        assert_eq!(request.origin, Origin::Floor);
        assert_eq!(request.floor, 2);
        assert_eq!(request.destination, 5);
        assert_eq!(request.car, CAR_UNASSIGNED);
        assert_eq!(request.fault, Fault::Door);
        assert_eq!(request.reply_to, Some(some_addr()));
    }

    #[test]
    fn car_report_becomes_an_elevator_originated_request() {
        let message = Message::Car {
            floor: 5,
            destination: 2,
            arrived: false,
            car: 1,
            fault_code: message::FAULT_NONE,
            fault_floor: 0,
        };
        let request = Request::from_message(&message, some_addr()).unwrap();
        assert_eq!(request.origin, Origin::Elevator);
        // the travel direction is derived from the report, not carried
        assert_eq!(request.direction, Direction::Down);
        assert_eq!(request.floor, 5);
        assert_eq!(request.destination, 2);
        assert_eq!(request.reply_to, Some(some_addr()));
    }

    #[test]
    fn control_messages_carry_no_request() {
        assert_eq!(Request::from_message(&Message::Shutdown, some_addr()), None);
        assert_eq!(Request::from_message(&Message::Init, some_addr()), None);
    }

    #[test]
    fn serving_requires_both_floor_and_direction_to_match() {
        let message = Message::FloorCall {
            direction: Direction::Up,
            source_floor: 1,
            target_floor: 4,
            car: 0,
            fault_code: message::FAULT_NONE,
            fault_floor: 0,
        };
        let request = Request::from_message(&message, some_addr()).unwrap();
        assert!(request.served_by(4, Direction::Up));
        assert!(!request.served_by(4, Direction::Down));
        assert!(!request.served_by(3, Direction::Up));
    }
}
