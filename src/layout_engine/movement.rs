//! Classifies the change between two rectangles of the same window.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Rect, Side};

bitflags! {
    /// Direction flags name the direction the moved edge travelled, so
    /// `GROW | LEFT` is a left edge pulled outward and `SHRINK | LEFT` is a
    /// right edge pushed inward.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Movement: u8 {
        const NONE = 0;
        const MOVED = 0b1;
        const GROW = 0b10;
        const SHRINK = 0b100;
        const LEFT = 0b1000;
        const UP = 0b1_0000;
        const RIGHT = 0b10_0000;
        const DOWN = 0b100_0000;
    }
}

impl Movement {
    /// The window edge this resize moved, if it is a resize at all.
    pub fn edge(self) -> Option<Side> {
        let grow = self.contains(Movement::GROW);
        let shrink = self.contains(Movement::SHRINK);
        if grow == shrink {
            return None;
        }

        let side = if self.contains(Movement::LEFT) {
            if grow { Side::Left } else { Side::Right }
        } else if self.contains(Movement::RIGHT) {
            if grow { Side::Right } else { Side::Left }
        } else if self.contains(Movement::UP) {
            if grow { Side::Top } else { Side::Bottom }
        } else if self.contains(Movement::DOWN) {
            if grow { Side::Bottom } else { Side::Top }
        } else {
            return None;
        };
        Some(side)
    }

    pub fn is_resize(self) -> bool { self.edge().is_some() }
}

/// Splits a geometry change into one movement per resized axis.
///
/// A pure translation yields `[MOVED]`, and identical rectangles yield
/// `[NONE]`.
pub fn calculate(from: Rect, change: Rect) -> Vec<Movement> {
    let xchange = change.x - from.x;
    let ychange = change.y - from.y;
    let wchange = change.width - from.width;
    let hchange = change.height - from.height;

    if xchange == 0 && ychange == 0 && wchange == 0 && hchange == 0 {
        return vec![Movement::NONE];
    }

    let mut result = Vec::with_capacity(2);

    if wchange > 0 {
        let edge = if xchange < 0 { Movement::LEFT } else { Movement::RIGHT };
        result.push(Movement::GROW | edge);
    } else if wchange < 0 {
        let edge = if xchange > 0 { Movement::RIGHT } else { Movement::LEFT };
        result.push(Movement::SHRINK | edge);
    }

    if hchange > 0 {
        let edge = if ychange < 0 { Movement::UP } else { Movement::DOWN };
        result.push(Movement::GROW | edge);
    } else if hchange < 0 {
        let edge = if ychange > 0 { Movement::DOWN } else { Movement::UP };
        result.push(Movement::SHRINK | edge);
    }

    if result.is_empty() {
        result.push(Movement::MOVED);
    }

    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn r(x: i32, y: i32, w: i32, h: i32) -> Rect { Rect::new(x, y, w, h) }

    #[test]
    fn unchanged_is_none() {
        assert_eq!(calculate(r(0, 0, 100, 100), r(0, 0, 100, 100)), vec![Movement::NONE]);
    }

    #[test]
    fn grow_right() {
        assert_eq!(
            calculate(r(0, 0, 100, 100), r(0, 0, 150, 100)),
            vec![Movement::GROW | Movement::RIGHT]
        );
    }

    #[test]
    fn grow_left() {
        assert_eq!(
            calculate(r(100, 0, 100, 100), r(50, 0, 150, 100)),
            vec![Movement::GROW | Movement::LEFT]
        );
    }

    #[test]
    fn shrink_from_either_side() {
        assert_eq!(
            calculate(r(0, 0, 100, 100), r(0, 0, 60, 100)),
            vec![Movement::SHRINK | Movement::LEFT]
        );
        assert_eq!(
            calculate(r(0, 0, 100, 100), r(40, 0, 60, 100)),
            vec![Movement::SHRINK | Movement::RIGHT]
        );
    }

    #[test]
    fn both_axes_report_separately() {
        assert_eq!(
            calculate(r(0, 100, 100, 100), r(0, 50, 120, 150)),
            vec![Movement::GROW | Movement::RIGHT, Movement::GROW | Movement::UP]
        );
    }

    #[test]
    fn translation_is_moved() {
        assert_eq!(calculate(r(0, 0, 100, 100), r(30, 20, 100, 100)), vec![Movement::MOVED]);
    }

    #[test]
    fn edges_decode_from_flags() {
        assert_eq!((Movement::GROW | Movement::RIGHT).edge(), Some(Side::Right));
        assert_eq!((Movement::GROW | Movement::LEFT).edge(), Some(Side::Left));
        assert_eq!((Movement::SHRINK | Movement::RIGHT).edge(), Some(Side::Left));
        assert_eq!((Movement::SHRINK | Movement::LEFT).edge(), Some(Side::Right));
        assert_eq!((Movement::GROW | Movement::UP).edge(), Some(Side::Top));
        assert_eq!((Movement::SHRINK | Movement::UP).edge(), Some(Side::Bottom));
        assert_eq!(Movement::MOVED.edge(), None);
        assert_eq!(Movement::NONE.edge(), None);
    }
}
