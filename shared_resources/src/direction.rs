#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Stationary,
}

impl Direction {
    /// Two-byte pair used by the wire format.
    pub fn as_wire_pair(self) -> [u8; 2] {
        match self {
            Direction::Up => [0, 1],
            Direction::Down => [1, 0],
            Direction::Stationary => [0, 0],
        }
    }

    pub fn from_wire_pair(hi: u8, lo: u8) -> Option<Self> {
        match (hi, lo) {
            (0, 1) => Some(Direction::Up),
            (1, 0) => Some(Direction::Down),
            (0, 0) => Some(Direction::Stationary),
            _ => None,
        }
    }

    /// Travel direction needed to get from `from` to `to`.
    pub fn of_travel(from: u8, to: u8) -> Self {
        if to > from {
            Direction::Up
        } else if to < from {
            Direction::Down
        } else {
            Direction::Stationary
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "stationary" => Some(Direction::Stationary),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Stationary => "stationary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_pairs_are_distinct_and_reversible() {
        for direction in [Direction::Up, Direction::Down, Direction::Stationary] {
            let [hi, lo] = direction.as_wire_pair();
            assert_eq!(Direction::from_wire_pair(hi, lo), Some(direction));
        }
        assert_eq!(Direction::from_wire_pair(1, 1), None);
        assert_eq!(Direction::from_wire_pair(2, 0), None);
    }

    #[test]
    fn travel_direction_follows_sign_of_difference() {
        assert_eq!(Direction::of_travel(2, 5), Direction::Up);
        assert_eq!(Direction::of_travel(5, 2), Direction::Down);
        assert_eq!(Direction::of_travel(3, 3), Direction::Stationary);
    }
}
