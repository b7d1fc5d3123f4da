//! # Lumen Core
//!
//! Core crate for the Lumen progressive renderer: cooperative compute
//! primitives shared by the render worker and its controller.

pub mod compute;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the core subsystem.
pub fn init() {
    log::info!("Lumen Core v{} initialized", VERSION);
}
