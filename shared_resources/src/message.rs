/// ----- WIRE CODEC -----
/// Fixed-layout datagram format shared by the dispatcher, car and floor
/// processes. Every binary message starts with a one-byte type tag, fields
/// are single bytes separated by zero spacer bytes, and the buffer is padded
/// with trailing zeros to `MESSAGE_SIZE`. The control signals are raw UTF-8
/// strings matched verbatim before any binary parsing is attempted.
use thiserror::Error;

use crate::direction::Direction;

/// Length of an encoded binary message. Receivers may use larger buffers;
/// the trailing zero padding decodes as "no further fields".
pub const MESSAGE_SIZE: usize = 32;

pub const TAG_FLOOR: u8 = 0;
pub const TAG_CAR: u8 = 1;
pub const TAG_INIT: u8 = 2;

pub const INIT_TAG_STRING: &str = "Init";
pub const SHUTDOWN_TEXT: &str = "Shutdown";
pub const FORCE_CLOSE_TEXT: &str = "Force Close";
pub const DOOR_FAILURE_TEXT: &str = "Door Failure";

/// Fault codes carried in the errorCode field.
pub const FAULT_NONE: u8 = 0;
pub const FAULT_DOOR: u8 = 1;
pub const FAULT_OTHER: u8 = 2;

// [0][dir-hi][dir-lo][0][sourceFloor][0][targetFloor][0][carId][0][errorCode][0][errorFloor][0]
const FLOOR_CALL_LEN: usize = 14;
const FLOOR_SPACERS: [usize; 6] = [3, 5, 7, 9, 11, 13];

// [1][currentFloor][0][destFloor][0][arrivedFlag][0][carId][0][errorCode][0][errorFloor][0]
const CAR_LEN: usize = 13;
const CAR_SPACERS: [usize; 6] = [2, 4, 6, 8, 10, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// A call raised at a floor panel (tag 0).
    FloorCall {
        direction: Direction,
        source_floor: u8,
        target_floor: u8,
        car: u8,
        fault_code: u8,
        fault_floor: u8,
    },
    /// A car command or arrival report (tag 1); the two share the layout
    /// and are told apart by the arrived flag.
    Car {
        floor: u8,
        destination: u8,
        arrived: bool,
        car: u8,
        fault_code: u8,
        fault_floor: u8,
    },
    /// Startup announcement (tag 2 plus a literal tag string).
    Init,
    Shutdown,
    ForceClose,
    DoorFailure,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty datagram")]
    Empty,
    #[error("unknown message tag {0}")]
    UnknownTag(u8),
    #[error("message truncated, got {got} of {need} bytes")]
    Truncated { need: usize, got: usize },
    #[error("non-zero spacer byte at offset {0}")]
    BadSpacer(usize),
    #[error("unrecognized direction pair ({0}, {1})")]
    BadDirection(u8, u8),
    #[error("non-zero byte in trailing padding at offset {0}")]
    BadPadding(usize),
    #[error("malformed init tag string")]
    BadInitTag,
}

pub fn encode(message: &Message) -> Vec<u8> {
    match message {
        Message::FloorCall {
            direction,
            source_floor,
            target_floor,
            car,
            fault_code,
            fault_floor,
        } => {
            let mut buf = vec![0; MESSAGE_SIZE];
            let [hi, lo] = direction.as_wire_pair();
            buf[0] = TAG_FLOOR;
            buf[1] = hi;
            buf[2] = lo;
            buf[4] = *source_floor;
            buf[6] = *target_floor;
            buf[8] = *car;
            buf[10] = *fault_code;
            buf[12] = *fault_floor;
            buf
        }
        Message::Car {
            floor,
            destination,
            arrived,
            car,
            fault_code,
            fault_floor,
        } => {
            let mut buf = vec![0; MESSAGE_SIZE];
            buf[0] = TAG_CAR;
            buf[1] = *floor;
            buf[3] = *destination;
            buf[5] = *arrived as u8;
            buf[7] = *car;
            buf[9] = *fault_code;
            buf[11] = *fault_floor;
            buf
        }
        Message::Init => {
            let mut buf = vec![0; MESSAGE_SIZE];
            buf[0] = TAG_INIT;
            buf[1..1 + INIT_TAG_STRING.len()].copy_from_slice(INIT_TAG_STRING.as_bytes());
            buf
        }
        Message::Shutdown => SHUTDOWN_TEXT.as_bytes().to_vec(),
        Message::ForceClose => FORCE_CLOSE_TEXT.as_bytes().to_vec(),
        Message::DoorFailure => DOOR_FAILURE_TEXT.as_bytes().to_vec(),
    }
}

pub fn decode(buf: &[u8]) -> Result<Message, DecodeError> {
    // control signals are matched verbatim before any binary parsing
    if buf == SHUTDOWN_TEXT.as_bytes() {
        return Ok(Message::Shutdown);
    }
    if buf == FORCE_CLOSE_TEXT.as_bytes() {
        return Ok(Message::ForceClose);
    }
    if buf == DOOR_FAILURE_TEXT.as_bytes() {
        return Ok(Message::DoorFailure);
    }

    match *buf.first().ok_or(DecodeError::Empty)? {
        TAG_FLOOR => {
            check_layout(buf, FLOOR_CALL_LEN, &FLOOR_SPACERS)?;
            let direction = Direction::from_wire_pair(buf[1], buf[2])
                .ok_or(DecodeError::BadDirection(buf[1], buf[2]))?;
            Ok(Message::FloorCall {
                direction,
                source_floor: buf[4],
                target_floor: buf[6],
                car: buf[8],
                fault_code: buf[10],
                fault_floor: buf[12],
            })
        }
        TAG_CAR => {
            check_layout(buf, CAR_LEN, &CAR_SPACERS)?;
            Ok(Message::Car {
                floor: buf[1],
                destination: buf[3],
                arrived: buf[5] != 0,
                car: buf[7],
                fault_code: buf[9],
                fault_floor: buf[11],
            })
        }
        TAG_INIT => {
            let tag = INIT_TAG_STRING.as_bytes();
            if buf.len() < 1 + tag.len() {
                return Err(DecodeError::Truncated {
                    need: 1 + tag.len(),
                    got: buf.len(),
                });
            }
            if &buf[1..1 + tag.len()] != tag {
                return Err(DecodeError::BadInitTag);
            }
            check_padding(buf, 1 + tag.len())?;
            Ok(Message::Init)
        }
        tag => Err(DecodeError::UnknownTag(tag)),
    }
}

fn check_layout(buf: &[u8], used: usize, spacers: &[usize]) -> Result<(), DecodeError> {
    if buf.len() < used {
        return Err(DecodeError::Truncated {
            need: used,
            got: buf.len(),
        });
    }
    for &offset in spacers {
        if buf[offset] != 0 {
            return Err(DecodeError::BadSpacer(offset));
        }
    }
    check_padding(buf, used)
}

fn check_padding(buf: &[u8], used: usize) -> Result<(), DecodeError> {
    match buf[used..].iter().position(|&b| b != 0) {
        Some(i) => Err(DecodeError::BadPadding(used + i)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(message: Message) {
        let encoded = encode(&message);
        assert_eq!(decode(&encoded), Ok(message));
    }

    #[test]
    fn floor_call_roundtrips_for_every_direction() {
        for direction in [Direction::Up, Direction::Down, Direction::Stationary] {
            roundtrip(Message::FloorCall {
                direction,
                source_floor: 3,
                target_floor: 6,
                car: u8::MAX,
                fault_code: FAULT_NONE,
                fault_floor: 0,
            });
        }
    }

    #[test]
    fn car_message_roundtrips_with_and_without_arrival() {
        for arrived in [false, true] {
            roundtrip(Message::Car {
                floor: 0,
                destination: 255,
                arrived,
                car: 1,
                fault_code: FAULT_DOOR,
                fault_floor: 255,
            });
        }
    }

    #[test]
    fn init_and_control_signals_roundtrip() {
        roundtrip(Message::Init);
        roundtrip(Message::Shutdown);
        roundtrip(Message::ForceClose);
        roundtrip(Message::DoorFailure);
    }

    #[test]
    fn control_signals_encode_as_raw_text() {
        assert_eq!(encode(&Message::Shutdown), SHUTDOWN_TEXT.as_bytes());
        assert_eq!(encode(&Message::ForceClose), FORCE_CLOSE_TEXT.as_bytes());
        assert_eq!(encode(&Message::DoorFailure), DOOR_FAILURE_TEXT.as_bytes());
    }

    #[test]
    fn non_zero_spacer_is_invalid() {
        let mut buf = encode(&Message::FloorCall {
            direction: Direction::Up,
            source_floor: 1,
            target_floor: 4,
            car: 0,
            fault_code: FAULT_NONE,
            fault_floor: 0,
        });
        buf[7] = 9;
        assert_eq!(decode(&buf), Err(DecodeError::BadSpacer(7)));
    }

    #[test]
    fn unrecognized_direction_pair_is_invalid() {
        let mut buf = encode(&Message::FloorCall {
            direction: Direction::Down,
            source_floor: 1,
            target_floor: 0,
            car: 0,
            fault_code: FAULT_NONE,
            fault_floor: 0,
        });
        buf[1] = 1;
        buf[2] = 1;
        assert_eq!(decode(&buf), Err(DecodeError::BadDirection(1, 1)));
    }

    #[test]
    fn garbage_in_padding_is_invalid() {
        let mut buf = encode(&Message::Car {
            floor: 2,
            destination: 2,
            arrived: true,
            car: 0,
            fault_code: FAULT_NONE,
            fault_floor: 0,
        });
        buf[MESSAGE_SIZE - 1] = 1;
        assert_eq!(decode(&buf), Err(DecodeError::BadPadding(MESSAGE_SIZE - 1)));
    }

    #[test]
    fn truncated_and_unknown_buffers_are_invalid_not_panics() {
        assert_eq!(decode(&[]), Err(DecodeError::Empty));
        assert_eq!(
            decode(&[TAG_CAR, 3, 0]),
            Err(DecodeError::Truncated { need: 13, got: 3 })
        );
        assert_eq!(decode(&[7, 0, 0]), Err(DecodeError::UnknownTag(7)));
        assert_eq!(
            decode(&[TAG_INIT, b'X', b'x', b'x', b'x']),
            Err(DecodeError::BadInitTag)
        );
    }
}
