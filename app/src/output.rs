//! PNG output of rendered frames.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use lumen_graphics::FrameBuffer;

use crate::error::AppError;

/// Convert the color plane of `buffer` to an 8-bit RGBA image.
pub fn to_image(buffer: &FrameBuffer) -> RgbaImage {
    let extent = buffer.extent();
    let pixels = buffer.read();
    RgbaImage::from_fn(extent.width, extent.height, |x, y| {
        let index = y as usize * extent.width as usize + x as usize;
        Rgba(pixels[index].to_rgba8())
    })
}

/// Write the color plane of `buffer` to `path` as PNG.
pub fn save_png(buffer: &FrameBuffer, path: &Path) -> Result<(), AppError> {
    to_image(buffer).save_with_format(path, ImageFormat::Png)?;
    log::info!(
        "Wrote {}x{} image to {}",
        buffer.extent().width,
        buffer.extent().height,
        path.display()
    );
    Ok(())
}
