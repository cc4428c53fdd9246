use image::RgbaImage;
use image::imageops;

use crate::geometry::{Point, Rectangle};

/// Full-screen snapshot taken at session activation
///
/// `origin` is the top-left of the captured monitor in screen coordinates,
/// so rectangles from the overlay can be mapped back onto pixels.
#[derive(Debug, Clone)]
pub struct ScreenImage {
    origin: Point,
    pixels: RgbaImage,
}

impl ScreenImage {
    pub fn new(origin: Point, pixels: RgbaImage) -> Self {
        Self { origin, pixels }
    }

    /// Wrap raw RGBA bytes, `None` when the buffer does not match the size
    pub fn from_raw(origin: Point, width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(|pixels| Self { origin, pixels })
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Area covered by the snapshot in screen coordinates
    pub fn bounds(&self) -> Rectangle {
        let width = i32::try_from(self.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height()).unwrap_or(i32::MAX);
        Rectangle::new(
            self.origin.x,
            self.origin.y,
            self.origin.x.saturating_add(width),
            self.origin.y.saturating_add(height),
        )
    }

    /// Copy out the part of the snapshot under `rect`
    ///
    /// The rectangle is clamped to the snapshot; `None` if nothing is left.
    pub fn crop(&self, rect: Rectangle) -> Option<RgbaImage> {
        let visible = self.bounds().intersect(rect)?;
        // visible starts at or after the origin, so these are the local offsets
        let x = visible.left().abs_diff(self.origin.x);
        let y = visible.top().abs_diff(self.origin.y);

        Some(imageops::crop_imm(&self.pixels, x, y, visible.width(), visible.height()).to_image())
    }
}
