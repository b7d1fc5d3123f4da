//! Render session configuration.

use std::time::Duration;

use lumen_core::compute::YieldPacer;
use serde::{Deserialize, Serialize};

use crate::types::Color4;

/// How often the worker yields between pixel writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelPacing {
    /// Pixels written between yields. Zero never yields.
    pub interval: u32,
    /// Sleep this many microseconds at each yield instead of a bare yield.
    pub sleep_us: u64,
}

impl PixelPacing {
    /// Never yield. Used by tests and batch renders.
    pub const NONE: Self = Self {
        interval: 0,
        sleep_us: 0,
    };

    /// Build the pacer the worker ticks after each pixel.
    pub fn pacer(self) -> YieldPacer {
        YieldPacer::new(self.interval).with_sleep(Duration::from_micros(self.sleep_us))
    }
}

impl Default for PixelPacing {
    fn default() -> Self {
        Self {
            interval: 1,
            sleep_us: 0,
        }
    }
}

/// Settings of a render session.
///
/// Deserialized from the `[render]` table of a TOML config file; any
/// field left out keeps its default.
///
/// # Example
///
/// ```ignore
/// let settings = RenderSettings::default()
///     .with_placeholder_color(Color4::WHITE)
///     .with_pixel_pacing(PixelPacing::NONE);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Colour painted where the scene supplies none.
    pub placeholder_color: Color4,
    /// Yield schedule of the worker.
    pub pixel_pacing: PixelPacing,
    /// Label of running progress reports.
    pub progress_label: String,
    /// Label of the final progress report.
    pub done_label: String,
    /// Sleep between modal polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Largest frame buffer that may be allocated, in pixels.
    pub max_pixels: u64,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            placeholder_color: Color4::new(1.0, 0.5, 0.75, 1.0),
            pixel_pacing: PixelPacing::default(),
            progress_label: "rendering...".to_string(),
            done_label: "render done".to_string(),
            poll_interval_ms: 5,
            max_pixels: 16384 * 16384,
            thread_name: "lumen-render".to_string(),
        }
    }
}

impl RenderSettings {
    /// Set the placeholder colour.
    #[must_use]
    pub fn with_placeholder_color(mut self, color: Color4) -> Self {
        self.placeholder_color = color;
        self
    }

    /// Set the worker's yield schedule.
    #[must_use]
    pub fn with_pixel_pacing(mut self, pacing: PixelPacing) -> Self {
        self.pixel_pacing = pacing;
        self
    }

    /// Set the running and final progress labels.
    #[must_use]
    pub fn with_labels(mut self, progress: impl Into<String>, done: impl Into<String>) -> Self {
        self.progress_label = progress.into();
        self.done_label = done.into();
        self
    }

    /// Set the modal poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Set the frame-buffer size limit.
    #[must_use]
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Set the worker thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Modal poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
