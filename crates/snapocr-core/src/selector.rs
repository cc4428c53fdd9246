//! Drag-to-select rectangle tracking over the capture overlay

use snapocr_types::{MIN_SELECTION_SIZE, Point, Rectangle};

/// Finalized drag, tagged against the minimum-size rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Valid(Rectangle),
    TooSmall(Rectangle),
}

impl Selection {
    pub fn rect(&self) -> Rectangle {
        match self {
            Selection::Valid(rect) | Selection::TooSmall(rect) => *rect,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Selection::Valid(_))
    }
}

#[derive(Debug, Clone)]
pub struct RegionSelector {
    anchor: Option<Point>,
    current: Option<Rectangle>,
    min_size: i32,
}

impl RegionSelector {
    pub fn new(min_size: i32) -> Self {
        Self {
            anchor: None,
            current: None,
            min_size,
        }
    }

    /// Pointer down: new anchor, previous rectangle dropped
    pub fn begin(&mut self, point: Point) {
        self.anchor = Some(point);
        self.current = None;
    }

    /// Pointer drag: rectangle for live redraw, `None` without an anchor
    pub fn update(&mut self, point: Point) -> Option<Rectangle> {
        let anchor = self.anchor?;
        let rect = Rectangle::from_corners(anchor, point);
        self.current = Some(rect);
        Some(rect)
    }

    /// Pointer up: finalize the drag
    pub fn end(&mut self, point: Point) -> Option<Selection> {
        let rect = self.update(point)?;
        self.anchor = None;

        if rect.is_valid_selection(self.min_size) {
            Some(Selection::Valid(rect))
        } else {
            Some(Selection::TooSmall(rect))
        }
    }

    /// Last rectangle shown, valid or not
    pub fn current(&self) -> Option<Rectangle> {
        self.current
    }

    pub fn min_size(&self) -> i32 {
        self.min_size
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new(MIN_SELECTION_SIZE)
    }
}
