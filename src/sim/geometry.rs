//! Rectangle geometry for cat collision proxies
//!
//! Pure functions only; nothing here asks the physics engine anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.size.x / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.size.x / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.size.y / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.size.y / 2.0
    }

    /// Width of the shared horizontal extent (negative when apart)
    #[inline]
    pub fn horizontal_overlap(&self, other: &Rect) -> f32 {
        self.right().min(other.right()) - self.left().max(other.left())
    }

    /// True if the two rectangles share any area (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.horizontal_overlap(other) > 0.0
            && self.bottom().min(other.bottom()) - self.top().max(other.top()) > 0.0
    }

    /// Mirror around a vertical line
    pub fn reflect_x(&self, axis_x: f32) -> Rect {
        Rect::new(Vec2::new(2.0 * axis_x - self.center.x, self.center.y), self.size)
    }
}

/// Fraction of `cat`'s width resting on `surface`
///
/// `None` is the ground, which always supports the whole cat. Result is in [0, 1].
pub fn calculate_overlap(cat: &Rect, surface: Option<&Rect>) -> f32 {
    let Some(surface) = surface else {
        return 1.0;
    };
    if cat.size.x <= 0.0 {
        return 0.0;
    }
    (cat.horizontal_overlap(surface).max(0.0) / cat.size.x).min(1.0)
}
