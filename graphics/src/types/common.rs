//! Common types shared across the graphics system.

use serde::{Deserialize, Serialize};

// ============================================================================
// Color4
// ============================================================================

/// Linear RGBA color with `f32` channels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    /// Fully transparent black. Initial value of every frame-buffer pixel.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Create a color from its channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from an `[r, g, b, a]` array.
    pub const fn from_array(rgba: [f32; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Returns the channels as `[r, g, b, a]`.
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Quantize to 8-bit RGBA, clamping each channel to `[0, 1]`.
    pub fn to_rgba8(self) -> [u8; 4] {
        self.to_array()
            .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl From<[f32; 4]> for Color4 {
    fn from(rgba: [f32; 4]) -> Self {
        Self::from_array(rgba)
    }
}

impl From<Color4> for [f32; 4] {
    fn from(color: Color4) -> Self {
        color.to_array()
    }
}

// ============================================================================
// Extent2d
// ============================================================================

/// Size of a 2D pixel target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extent2d {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent2d {
    /// Create a new extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels.
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either dimension is zero.
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ============================================================================
// PixelRect
// ============================================================================

/// Rectangle of pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    /// X coordinate of the top-left corner.
    pub x: u32,
    /// Y coordinate of the top-left corner.
    pub y: u32,
    /// Width of the rectangle.
    pub width: u32,
    /// Height of the rectangle.
    pub height: u32,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole target of the given extent.
    pub const fn from_extent(extent: Extent2d) -> Self {
        Self::new(0, 0, extent.width, extent.height)
    }

    /// Size of the rectangle.
    pub const fn extent(self) -> Extent2d {
        Extent2d::new(self.width, self.height)
    }

    /// Number of pixels covered.
    pub const fn area(self) -> u64 {
        self.extent().area()
    }

    /// Returns `true` if the rectangle covers no pixels.
    pub const fn is_empty(self) -> bool {
        self.extent().is_empty()
    }

    /// Returns `true` if the pixel lies inside the rectangle.
    pub fn contains(self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && (x - self.x) < self.width
            && (y - self.y) < self.height
    }

    /// Returns `true` if the rectangle lies entirely inside `extent`.
    pub fn fits_within(self, extent: Extent2d) -> bool {
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        right <= extent.width as u64 && bottom <= extent.height as u64
    }
}

// ============================================================================
// ScreenRect
// ============================================================================

/// Screen-space viewport rectangle reported by the host view.
///
/// Edges are inclusive-exclusive (`left..right`, `top..bottom`) and may be
/// negative when the host reports an offset viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    /// Create a screen rectangle from its edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width in pixels (zero for inverted rectangles).
    pub fn width(self) -> u32 {
        span(self.left, self.right)
    }

    /// Height in pixels (zero for inverted rectangles).
    pub fn height(self) -> u32 {
        span(self.top, self.bottom)
    }
}

/// Distance from `start` to `end`; any two `i32` edges fit in a `u32`.
fn span(start: i32, end: i32) -> u32 {
    (i64::from(end) - i64::from(start)).clamp(0, i64::from(u32::MAX)) as u32
}

impl std::fmt::Display for ScreenRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}]-[{}, {}] ({}x{})",
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.width(),
            self.height()
        )
    }
}
