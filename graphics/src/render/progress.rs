//! Progress reporting from the render worker.

use std::sync::Arc;

use parking_lot::Mutex;

/// Callback receiving every progress report: `(label, value)`.
pub type ProgressListener = Arc<dyn Fn(&str, f32) + Send + Sync>;

/// Largest `f32` strictly below 1.0.
///
/// Running reports are clamped to this so that exactly 1.0 is only ever
/// reported on completion, however many pixels the region has.
pub const BELOW_ONE: f32 = f32::from_bits(1.0f32.to_bits() - 1);

#[derive(Debug, Clone, Default)]
struct ProgressState {
    label: String,
    value: f32,
    reports: u64,
}

/// Latest progress of a render session, shared with the host.
///
/// Values never go backwards: a report lower than the current value is
/// clamped up to it. An optional listener observes every report in order.
pub struct RenderProgress {
    state: Mutex<ProgressState>,
    listener: Option<ProgressListener>,
}

impl RenderProgress {
    /// Create progress at 0.0 with an empty label.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProgressState::default()),
            listener: None,
        }
    }

    /// Call `listener` on every report.
    #[must_use]
    pub fn with_listener(mut self, listener: ProgressListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Record a report. `value` is clamped into `[current, 1.0]`.
    pub fn report(&self, label: &str, value: f32) {
        let value = {
            let mut state = self.state.lock();
            let value = value.clamp(state.value, 1.0);
            state.value = value;
            state.reports += 1;
            if state.label != label {
                state.label.clear();
                state.label.push_str(label);
            }
            value
        };
        log::trace!("{label} {value:.3}");
        if let Some(listener) = &self.listener {
            listener(label, value);
        }
    }

    /// Current progress value in `[0, 1]`.
    pub fn value(&self) -> f32 {
        self.state.lock().value
    }

    /// Label of the latest report.
    pub fn label(&self) -> String {
        self.state.lock().label.clone()
    }

    /// Number of reports received.
    pub fn reports(&self) -> u64 {
        self.state.lock().reports
    }

    /// Returns `true` once 1.0 has been reported.
    pub fn is_finished(&self) -> bool {
        self.value() >= 1.0
    }
}

impl Default for RenderProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RenderProgress")
            .field("label", &state.label)
            .field("value", &state.value)
            .field("reports", &state.reports)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
