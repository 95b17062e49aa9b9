//! Integer screen geometry shared by the layout engine and the window system.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Point { x, y } }

    pub fn distance(self, other: Point) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

/// Axis-aligned rectangle in screen pixels, origin at the top left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> i32 { self.x + self.width }

    pub fn bottom(&self) -> i32 { self.y + self.height }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> i64 { i64::from(self.width) * i64::from(self.height) }

    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }

    pub fn contains(&self, point: Point) -> bool {
        (self.x..=self.right()).contains(&point.x) && (self.y..=self.bottom()).contains(&point.y)
    }

    pub fn contains_rect(&self, other: Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    pub fn intersects(&self, other: Rect) -> bool {
        self.x < other.right()
            && self.y < other.bottom()
            && other.x < self.right()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: Rect) -> Rect {
        let min_x = self.x.max(other.x);
        let max_x = self.right().min(other.right());
        let min_y = self.y.max(other.y);
        let max_y = self.bottom().min(other.bottom());
        Rect::new(min_x, min_y, (max_x - min_x).max(0), (max_y - min_y).max(0))
    }

    /// Pulls this rectangle inside `bounds`, trimming whatever sticks out.
    pub fn clamp(&mut self, bounds: Rect) {
        self.x = self.x.max(bounds.x);
        self.y = self.y.max(bounds.y);
        if self.right() > bounds.right() {
            self.width = bounds.right() - self.x;
        }
        if self.bottom() > bounds.bottom() {
            self.height = bounds.bottom() - self.y;
        }
    }

    /// Shrinks every edge by `amount`.
    pub fn inset(&self, amount: i32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.width - amount * 2,
            self.height - amount * 2,
        )
    }

    pub fn west(&self) -> Point { Point::new(self.x, self.y + self.height / 2) }

    pub fn north(&self) -> Point { Point::new(self.x + self.width / 2, self.y) }

    pub fn east(&self) -> Point { Point::new(self.right(), self.y + self.height / 2) }

    pub fn south(&self) -> Point { Point::new(self.x + self.width / 2, self.bottom()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
    Center,
}

/// Finds which of the rectangle's side midpoints, or its center, lies closest
/// to `origin`.
pub fn nearest_side(origin: Point, rect: Rect) -> (f64, Side) {
    let left = origin.distance(rect.west());
    let right = origin.distance(rect.east());
    let mut nearest = if left < right { (left, Side::Left) } else { (right, Side::Right) };

    for (distance, side) in [
        (origin.distance(rect.north()), Side::Top),
        (origin.distance(rect.south()), Side::Bottom),
        (origin.distance(rect.center()), Side::Center),
    ] {
        if distance < nearest.0 {
            nearest = (distance, side);
        }
    }

    nearest
}

/// Distance from `origin` to the closest side midpoint of `rect`.
pub fn shortest_side(origin: Point, rect: Rect) -> f64 {
    [rect.west(), rect.north(), rect.east(), rect.south()]
        .into_iter()
        .map(|p| origin.distance(p))
        .fold(f64::INFINITY, f64::min)
}
