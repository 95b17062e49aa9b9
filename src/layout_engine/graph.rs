use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Rect, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn toggle(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Orientation that splits `area` across its longer axis.
    pub fn for_area(area: Rect) -> Orientation {
        if area.width > area.height {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn orientation(self) -> Orientation {
        match self {
            Direction::Left | Direction::Right => Orientation::Horizontal,
            Direction::Up | Direction::Down => Orientation::Vertical,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Whether this direction points away from the origin of its axis.
    pub fn is_forward(self) -> bool { matches!(self, Direction::Right | Direction::Down) }

    pub fn side(self) -> Side {
        match self {
            Direction::Left => Side::Left,
            Direction::Right => Side::Right,
            Direction::Up => Side::Top,
            Direction::Down => Side::Bottom,
        }
    }

    pub fn from_placement(orientation: Orientation, swap: bool) -> Direction {
        match (orientation, swap) {
            (Orientation::Horizontal, true) => Direction::Left,
            (Orientation::Horizontal, false) => Direction::Right,
            (Orientation::Vertical, true) => Direction::Up,
            (Orientation::Vertical, false) => Direction::Down,
        }
    }
}
