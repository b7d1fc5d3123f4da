//! Progressive frame buffer shared between the render worker and the host.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::RenderError;
use crate::types::{Color4, Extent2d, PixelRect};

/// Shared handle to a frame buffer.
pub type FrameBufferHandle = Arc<FrameBuffer>;

/// Auxiliary channel drawn on top of the colour channel.
///
/// Attached for interactive renders only. Covers exactly the render
/// rectangle; pixels are addressed in the coordinates of the full target.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayChannel {
    rect: PixelRect,
    pixels: Vec<Color4>,
}

impl OverlayChannel {
    /// Rectangle of the target covered by the overlay.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Read an overlay pixel, addressed in target coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color4> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let row = (y - self.rect.y) as usize;
        let index = row * self.rect.width as usize + (x - self.rect.x) as usize;
        self.pixels.get(index).copied()
    }
}

/// 2D RGBA colour target painted by the render worker.
///
/// The buffer covers a full target (`extent`) and carries an active
/// `region` the worker iterates. Outside the region the buffer keeps its
/// initial contents: transparent, or a copy of the display it was
/// composited over.
///
/// # Concurrency
///
/// Only the render worker writes the colour channel. Readers such as a
/// live preview may read at any time through [`read()`](Self::read) or
/// [`pixel()`](Self::pixel); every pixel write is a single locked store, so
/// a reader sees each pixel either before or after its write.
#[derive(Debug)]
pub struct FrameBuffer {
    extent: Extent2d,
    region: PixelRect,
    color: RwLock<Vec<Color4>>,
    overlay: RwLock<Option<OverlayChannel>>,
}

impl FrameBuffer {
    /// Allocate a transparent buffer of `extent` rendering the whole target.
    pub fn allocate(extent: Extent2d, max_pixels: u64) -> Result<Self, RenderError> {
        Self::allocate_region(extent, PixelRect::from_extent(extent), max_pixels)
    }

    /// Allocate a transparent buffer of `extent` rendering only `region`.
    ///
    /// Fails with [`RenderError::ResourceUnavailable`] for an empty target,
    /// a target larger than `max_pixels`, or when memory cannot be reserved;
    /// and with [`RenderError::InvalidRegion`] if `region` is empty or
    /// leaves the target.
    pub fn allocate_region(
        extent: Extent2d,
        region: PixelRect,
        max_pixels: u64,
    ) -> Result<Self, RenderError> {
        let mut color = Self::reserve(extent, region, max_pixels)?;
        color.resize(extent.area() as usize, Color4::TRANSPARENT);
        Ok(Self::from_parts(extent, region, color))
    }

    /// Allocate a buffer for `region` that starts as a copy of `base`.
    ///
    /// Used to composite a region render into an existing display.
    pub fn composite_over(
        base: &FrameBuffer,
        region: PixelRect,
        max_pixels: u64,
    ) -> Result<Self, RenderError> {
        let mut color = Self::reserve(base.extent, region, max_pixels)?;
        color.extend_from_slice(&base.color.read());
        Ok(Self::from_parts(base.extent, region, color))
    }

    fn reserve(
        extent: Extent2d,
        region: PixelRect,
        max_pixels: u64,
    ) -> Result<Vec<Color4>, RenderError> {
        let unavailable = |reason: String| RenderError::ResourceUnavailable {
            width: extent.width,
            height: extent.height,
            reason,
        };

        if extent.is_empty() {
            return Err(unavailable("empty target".to_string()));
        }
        if extent.area() > max_pixels {
            return Err(unavailable(format!(
                "{} pixels exceeds the limit of {max_pixels}",
                extent.area()
            )));
        }
        if region.is_empty() || !region.fits_within(extent) {
            return Err(RenderError::InvalidRegion {
                region,
                width: extent.width,
                height: extent.height,
            });
        }

        let len = usize::try_from(extent.area())
            .map_err(|_| unavailable("target does not fit in memory".to_string()))?;
        let mut color = Vec::new();
        color
            .try_reserve_exact(len)
            .map_err(|err| unavailable(err.to_string()))?;
        Ok(color)
    }

    fn from_parts(extent: Extent2d, region: PixelRect, color: Vec<Color4>) -> Self {
        log::debug!(
            "Allocated {}x{} frame buffer, region {}x{} at ({}, {})",
            extent.width,
            extent.height,
            region.width,
            region.height,
            region.x,
            region.y
        );
        Self {
            extent,
            region,
            color: RwLock::new(color),
            overlay: RwLock::new(None),
        }
    }

    /// Size of the full target.
    pub fn extent(&self) -> Extent2d {
        self.extent
    }

    /// Region the worker renders.
    pub fn region(&self) -> PixelRect {
        self.region
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.extent.width && y < self.extent.height)
            .then(|| y as usize * self.extent.width as usize + x as usize)
    }

    /// Write one pixel of the colour channel.
    ///
    /// Returns `false` if the coordinate lies outside the target.
    pub fn set_pixel(&self, x: u32, y: u32, color: Color4) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.color.write()[index] = color;
                true
            }
            None => false,
        }
    }

    /// Read one pixel of the colour channel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color4> {
        let index = self.index(x, y)?;
        self.color.read().get(index).copied()
    }

    /// Lock the colour channel for reading, row-major.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Color4>> {
        self.color.read()
    }

    /// Copy the colour channel, row-major.
    pub fn to_pixels(&self) -> Vec<Color4> {
        self.color.read().clone()
    }

    /// Attach an overlay channel covering the render region.
    ///
    /// Replaces any overlay attached before.
    pub fn attach_overlay(&self) {
        let rect = self.region;
        let pixels = vec![Color4::TRANSPARENT; rect.area() as usize];
        *self.overlay.write() = Some(OverlayChannel { rect, pixels });
        log::debug!(
            "Attached overlay channel {}x{} at ({}, {})",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
    }

    /// Rectangle of the attached overlay, if any.
    pub fn overlay_rect(&self) -> Option<PixelRect> {
        self.overlay.read().as_ref().map(OverlayChannel::rect)
    }

    /// Copy of the attached overlay, if any.
    pub fn overlay(&self) -> Option<OverlayChannel> {
        self.overlay.read().clone()
    }
}
