//! Explicit, manually adjustable ordering of questions, answers and replies.
//!
//! Every ordered record carries a `position`. New records go after the last
//! one in their scope; moving a record swaps its position with the adjacent
//! record of the same scope (all questions, or the answers/replies of one
//! question).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction \"{0}\", expected \"up\" or \"down\"")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}

/// Position for a record appended to a scope whose highest position is `max`.
pub fn next_position(max: Option<i64>) -> i64 {
    max.map_or(0, |max| max + 1)
}

/// Finds the record adjacent to `current` in the given direction.
///
/// `items` yields `(id, position)` pairs of a single scope, in any order.
pub fn neighbour<I>(items: I, current: i64, direction: Direction) -> Option<(i64, i64)>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let candidates = items.into_iter();
    match direction {
        Direction::Up => candidates
            .filter(|(_, position)| *position < current)
            .max_by_key(|(_, position)| *position),
        Direction::Down => candidates
            .filter(|(_, position)| *position > current)
            .min_by_key(|(_, position)| *position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_position() {
        assert_eq!(next_position(None), 0);
        assert_eq!(next_position(Some(0)), 1);
        assert_eq!(next_position(Some(41)), 42);
    }

    #[test]
    fn test_neighbour_skips_gaps() {
        let items = vec![(1, 0), (2, 3), (3, 7)];
        assert_eq!(neighbour(items.clone(), 3, Direction::Up), Some((1, 0)));
        assert_eq!(neighbour(items.clone(), 3, Direction::Down), Some((3, 7)));
        assert_eq!(neighbour(items.clone(), 0, Direction::Up), None);
        assert_eq!(neighbour(items, 7, Direction::Down), None);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert!("sideways".parse::<Direction>().is_err());
    }
}
