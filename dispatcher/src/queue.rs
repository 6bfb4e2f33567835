/// ----- PENDING QUEUE MODULE -----
/// Operations on one car's pending queue. The queue is a plain vector owned
/// by the car's dispatch worker; these functions keep it in serving order
/// and clear completed stops. Requests whose direction conflicts with the
/// serving direction are excluded from selection entirely, not sorted last:
/// they keep their arrival order at the back of the vector until the car's
/// direction matches or the car picks a new direction.
use std::cmp::Reverse;

use shared_resources::direction::Direction;
use shared_resources::request::Request;

/// Re-sorts the queue for the serving direction: matching requests first,
/// ascending by destination while serving UP, descending while DOWN.
pub fn resort(queue: &mut Vec<Request>, direction: Direction) {
    if direction == Direction::Stationary {
        return;
    }
    let (mut serving, waiting): (Vec<Request>, Vec<Request>) =
        queue.drain(..).partition(|request| request.direction == direction);
    match direction {
        Direction::Up => serving.sort_by_key(|request| request.destination),
        Direction::Down => serving.sort_by_key(|request| Reverse(request.destination)),
        Direction::Stationary => unreachable!(),
    }
    queue.extend(serving);
    queue.extend(waiting);
}

/// Picks the next stop: the first request matching the serving direction,
/// or, when none matches, a fresh direction taken from the head of whatever
/// is queued (the car passes through stationary). `None` on an empty queue.
pub fn next_stop(queue: &mut Vec<Request>, direction: Direction) -> Option<(u8, Direction)> {
    if direction != Direction::Stationary {
        if let Some(request) = queue.iter().find(|request| request.direction == direction) {
            return Some((request.destination, direction));
        }
    }
    let new_direction = queue.first()?.direction;
    resort(queue, new_direction);
    queue
        .first()
        .map(|request| (request.destination, new_direction))
}

/// Removes every request completed by a stop at `floor` serving
/// `direction`. The direction match is mandatory; an opposite-direction
/// request at the same floor stays queued for a later pass. Calling this
/// again for the same stop removes nothing.
pub fn remove_served(queue: &mut Vec<Request>, floor: u8, direction: Direction) -> Vec<Request> {
    let mut served = Vec::new();
    for index in (0..queue.len()).rev() {
        if queue[index].served_by(floor, direction) {
            served.push(queue.remove(index));
        }
    }
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_resources::request::{Fault, Origin};

    fn request(destination: u8, direction: Direction) -> Request {
        Request {
            origin: Origin::Floor,
            floor: 0,
            direction,
            destination,
            car: 0,
            fault: Fault::None,
            fault_floor: 0,
            reply_to: None,
        }
    }

    fn destinations(queue: &[Request]) -> Vec<u8> {
        queue.iter().map(|request| request.destination).collect()
    }

    #[test]
    fn serving_up_sorts_ascending_by_destination() {
        let mut queue = vec![
            request(5, Direction::Up),
            request(2, Direction::Up),
            request(7, Direction::Up),
        ];
        resort(&mut queue, Direction::Up);
        assert_eq!(destinations(&queue), vec![2, 5, 7]);
    }

    #[test]
    fn serving_down_sorts_descending_by_destination() {
        let mut queue = vec![
            request(1, Direction::Down),
            request(6, Direction::Down),
            request(3, Direction::Down),
        ];
        resort(&mut queue, Direction::Down);
        assert_eq!(destinations(&queue), vec![6, 3, 1]);
    }

    #[test]
    fn conflicting_direction_requests_are_kept_behind_unsorted() {
        let mut queue = vec![
            request(6, Direction::Down),
            request(5, Direction::Up),
            request(1, Direction::Down),
            request(2, Direction::Up),
        ];
        resort(&mut queue, Direction::Up);
        assert_eq!(destinations(&queue), vec![2, 5, 6, 1]);
        // the down requests are never selected while serving up
        assert_eq!(next_stop(&mut queue, Direction::Up), Some((2, Direction::Up)));
    }

    #[test]
    fn a_car_out_of_matching_work_takes_a_new_direction_from_the_head() {
        let mut queue = vec![request(6, Direction::Down), request(1, Direction::Down)];
        let next = next_stop(&mut queue, Direction::Up);
        assert_eq!(next, Some((6, Direction::Down)));
        assert_eq!(destinations(&queue), vec![6, 1]);
    }

    #[test]
    fn next_stop_on_an_empty_queue_is_none() {
        assert_eq!(next_stop(&mut Vec::new(), Direction::Stationary), None);
    }

    #[test]
    fn serving_a_stop_requires_the_direction_to_match() {
        let mut queue = vec![
            request(4, Direction::Up),
            request(4, Direction::Down),
            request(4, Direction::Up),
        ];
        let served = remove_served(&mut queue, 4, Direction::Up);
        assert_eq!(served.len(), 2);
        assert_eq!(queue, vec![request(4, Direction::Down)]);
    }

    #[test]
    fn serving_the_same_stop_twice_is_a_no_op() {
        let mut queue = vec![request(3, Direction::Up)];
        assert_eq!(remove_served(&mut queue, 3, Direction::Up).len(), 1);
        assert!(remove_served(&mut queue, 3, Direction::Up).is_empty());
        assert!(queue.is_empty());
    }
}
