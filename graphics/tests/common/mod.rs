//! Shared helpers for the graphics integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use lumen_graphics::render::{RenderContext, RenderTask};
use lumen_graphics::scene::{
    EnvironmentId, EnvironmentRecord, MaterialId, MaterialRecord, SceneSource,
};
use lumen_graphics::{
    AsyncRenderEngine, Color4, PixelPacing, ProgressListener, RenderEngine, RenderError,
    RenderSettings,
};

/// Generous upper bound for waits in tests.
pub const WAIT: Duration = Duration::from_secs(10);

/// Settings with no pacing and a fast poll.
pub fn fast_settings() -> RenderSettings {
    RenderSettings::default()
        .with_pixel_pacing(PixelPacing::NONE)
        .with_poll_interval(Duration::from_millis(1))
        .with_thread_name("lumen-test-render")
}

/// Settings that keep the worker busy long enough to be cancelled.
pub fn slow_settings() -> RenderSettings {
    fast_settings().with_pixel_pacing(PixelPacing {
        interval: 1,
        sleep_us: 200,
    })
}

/// Records every progress report.
#[derive(Clone, Default)]
pub struct ProgressRecorder {
    reports: Arc<Mutex<Vec<(String, f32)>>>,
}

impl ProgressRecorder {
    pub fn listener(&self) -> ProgressListener {
        let reports = Arc::clone(&self.reports);
        Arc::new(move |label, value| reports.lock().push((label.to_string(), value)))
    }

    pub fn values(&self) -> Vec<f32> {
        self.reports.lock().iter().map(|(_, value)| *value).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.reports.lock().iter().map(|(label, _)| label.clone()).collect()
    }
}

/// Engine that counts lifecycle calls and delegates to the threaded engine.
#[derive(Debug, Default, Clone)]
pub struct CountingEngine {
    pub begins: Arc<AtomicUsize>,
    pub ends: Arc<AtomicUsize>,
}

impl CountingEngine {
    pub fn ends(&self) -> usize {
        self.ends.load(Ordering::SeqCst)
    }

    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }
}

impl RenderEngine for CountingEngine {
    fn on_render_begin(
        &mut self,
        context: &Arc<RenderContext>,
    ) -> Result<RenderTask, RenderError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        AsyncRenderEngine.on_render_begin(context)
    }

    fn on_render_window_begin(
        &mut self,
        context: &Arc<RenderContext>,
    ) -> Result<RenderTask, RenderError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        AsyncRenderEngine.on_render_window_begin(context)
    }

    fn on_render_end(&mut self, context: &RenderContext) {
        self.ends.fetch_add(1, Ordering::SeqCst);
        AsyncRenderEngine.on_render_end(context);
    }
}

/// In-memory host document.
#[derive(Default)]
pub struct TestDocument {
    pub environments: HashMap<EnvironmentId, EnvironmentRecord>,
    pub materials: HashMap<MaterialId, MaterialRecord>,
}

impl TestDocument {
    pub fn with_environment(mut self, id: u64, name: &str, color: Color4) -> Self {
        let id = EnvironmentId(id);
        self.environments.insert(
            id,
            EnvironmentRecord {
                id,
                name: name.to_string(),
                color,
            },
        );
        self
    }

    pub fn with_material(mut self, id: u64, name: &str) -> Self {
        let id = MaterialId(id);
        self.materials.insert(
            id,
            MaterialRecord {
                id,
                name: name.to_string(),
                base_color: Color4::WHITE,
            },
        );
        self
    }
}

impl SceneSource for TestDocument {
    fn environment(&self, id: EnvironmentId) -> Option<EnvironmentRecord> {
        self.environments.get(&id).cloned()
    }

    fn material(&self, id: MaterialId) -> Option<MaterialRecord> {
        self.materials.get(&id).cloned()
    }
}
