//! Common value types shared by the scene and render modules.

mod common;

pub use common::{Color4, Extent2d, PixelRect, ScreenRect};
