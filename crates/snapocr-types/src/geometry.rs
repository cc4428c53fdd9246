//! Screen-space geometry for region selection

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest width/height (exclusive) a rectangle needs to count as a selection
pub const MIN_SELECTION_SIZE: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Normalized rectangle, `left <= right` and `top <= bottom` always hold
///
/// Fields are private so a rectangle can only be replaced, never patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Rectangle {
    /// Build from two arbitrary corners by taking min/max per axis
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Build from edges, normalizing swapped edges
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::from_corners(Point::new(left, top), Point::new(right, bottom))
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Spans the whole `i32` range without overflowing
    pub fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Both sides strictly larger than `min_size`
    pub fn is_valid_selection(&self, min_size: i32) -> bool {
        let min_size = i64::from(min_size);
        i64::from(self.width()) > min_size && i64::from(self.height()) > min_size
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rectangle) -> Option<Rectangle> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(Rectangle {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{}) {}x{}",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}
