//! Render session integration tests.
//!
//! These tests drive [`RenderPipeline`] end to end: frame buffer allocation,
//! the worker thread, progress reports, cancellation and teardown.
//!
//! # Test Categories
//!
//! - **Fill Tests**: Completed renders paint every pixel of the region
//! - **Progress Tests**: Reports are monotonic and reach 1.0 exactly once
//! - **Cancellation Tests**: Stop requests end the session exactly once
//! - **Variant Tests**: Region, composite, windowed and scene-aware renders

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rstest::rstest;

use common::{CountingEngine, ProgressRecorder, TestDocument, WAIT, fast_settings, slow_settings};
use lumen_graphics::scene::{EnvironmentId, EnvironmentUsage};
use lumen_graphics::{
    Color4, Extent2d, FrameBuffer, PixelRect, RenderMode, RenderOutcome, RenderPipeline,
    RenderState, SceneChangeQueue, SolidShader,
};

// ============================================================================
// Fill Tests
// ============================================================================

/// A 4x4 target with no scene renders to a uniform placeholder fill.
#[rstest]
#[case::interactive(RenderMode::Interactive)]
#[case::quiet(RenderMode::Quiet)]
fn test_uniform_fill_without_scene(#[case] mode: RenderMode) {
    let recorder = ProgressRecorder::default();
    let mut pipeline =
        RenderPipeline::new(fast_settings()).with_progress_listener(recorder.listener());

    let buffer = pipeline.begin_render(Extent2d::new(4, 4), mode).unwrap();
    pipeline.render().unwrap();
    let outcome = pipeline.run_modal().unwrap();

    assert_eq!(outcome, RenderOutcome::Completed);
    let placeholder = Color4::new(1.0, 0.5, 0.75, 1.0);
    let pixels = buffer.to_pixels();
    assert_eq!(pixels.len(), 16);
    assert!(pixels.iter().all(|&pixel| pixel == placeholder));
    assert_eq!(recorder.values().last().copied(), Some(1.0));
}

/// Rendering twice with the same pipeline produces two independent sessions.
#[test]
fn test_sessions_are_independent() {
    let engine = CountingEngine::default();
    let mut pipeline = RenderPipeline::with_engine(engine.clone(), fast_settings());

    for _ in 0..2 {
        pipeline
            .begin_render(Extent2d::new(2, 3), RenderMode::Quiet)
            .unwrap();
        pipeline.render().unwrap();
        assert_eq!(pipeline.run_modal(), Ok(RenderOutcome::Completed));
    }
    assert_eq!(engine.begins(), 2);
    assert_eq!(engine.ends(), 2);
}

// ============================================================================
// Progress Tests
// ============================================================================

#[rstest]
#[case::single_pixel(1, 1)]
#[case::wide(7, 2)]
#[case::square(16, 16)]
fn test_progress_monotonic_and_final(#[case] width: u32, #[case] height: u32) {
    let recorder = ProgressRecorder::default();
    let mut pipeline =
        RenderPipeline::new(fast_settings()).with_progress_listener(recorder.listener());

    pipeline
        .begin_render(Extent2d::new(width, height), RenderMode::Quiet)
        .unwrap();
    pipeline.render().unwrap();
    pipeline.run_modal().unwrap();

    let values = recorder.values();
    assert_eq!(values.len() as u32, width * height);
    assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(values.iter().filter(|&&value| value == 1.0).count(), 1);
    assert_eq!(values.last().copied(), Some(1.0));

    let labels = recorder.labels();
    assert_eq!(labels.last().map(String::as_str), Some("render done"));
    assert!(labels[..labels.len() - 1].iter().all(|label| label == "rendering..."));
}

// ============================================================================
// Cancellation Tests
// ============================================================================

/// Stopping before the worker starts writes nothing.
#[test]
fn test_stop_before_start() {
    let engine = CountingEngine::default();
    let mut pipeline = RenderPipeline::with_engine(engine.clone(), fast_settings());

    let buffer = pipeline
        .begin_render(Extent2d::new(4, 4), RenderMode::Quiet)
        .unwrap();
    let context = Arc::clone(pipeline.context().unwrap());
    pipeline.stop_rendering();
    pipeline.render().unwrap();

    assert_eq!(pipeline.run_modal(), Ok(RenderOutcome::Cancelled));
    assert_eq!(context.pixels_written(), 0);
    assert_eq!(context.state(), RenderState::Cancelled);
    assert_eq!(context.completion().accepted_count(), 1);
    assert_eq!(context.progress().reports(), 0);
    assert!(buffer.to_pixels().iter().all(|&pixel| pixel == Color4::TRANSPARENT));
    assert_eq!(engine.ends(), 1);
}

/// Cancelling mid-render ends modal polling and ends the session once.
#[rstest]
#[case::early(Duration::ZERO)]
#[case::later(Duration::from_millis(20))]
fn test_cancel_mid_render(#[case] delay: Duration) {
    let engine = CountingEngine::default();
    let recorder = ProgressRecorder::default();
    let mut pipeline = RenderPipeline::with_engine(engine.clone(), slow_settings())
        .with_progress_listener(recorder.listener());

    pipeline
        .begin_render(Extent2d::new(64, 64), RenderMode::Interactive)
        .unwrap();
    let context = Arc::clone(pipeline.context().unwrap());
    pipeline.render().unwrap();
    thread::sleep(delay);
    pipeline.stop_rendering();

    assert_eq!(
        context.completion().wait_timeout(WAIT),
        Some(RenderOutcome::Cancelled)
    );
    assert!(!pipeline.continue_modal());

    assert_eq!(pipeline.end_render(), Some(RenderOutcome::Cancelled));
    assert_eq!(pipeline.end_render(), None);
    assert_eq!(engine.ends(), 1);

    assert!(context.pixels_written() < 64 * 64);
    assert!(context.progress().value() < 1.0);
    assert!(recorder.values().iter().all(|&value| value < 1.0));
    assert_eq!(context.completion().accepted_count(), 1);
}

/// A stop after completion changes nothing.
#[test]
fn test_stop_after_completion_is_noop() {
    let mut pipeline = RenderPipeline::new(fast_settings());
    pipeline
        .begin_render(Extent2d::new(3, 3), RenderMode::Quiet)
        .unwrap();
    let context = Arc::clone(pipeline.context().unwrap());
    pipeline.render().unwrap();

    assert_eq!(
        context.completion().wait_timeout(WAIT),
        Some(RenderOutcome::Completed)
    );
    pipeline.stop_rendering();
    assert_eq!(pipeline.end_render(), Some(RenderOutcome::Completed));
    assert_eq!(context.state(), RenderState::Completed);
    assert_eq!(context.completion().accepted_count(), 1);
}

/// Dropping the pipeline mid-render cancels and joins the worker.
#[test]
fn test_drop_joins_worker() {
    let engine = CountingEngine::default();
    let context = {
        let mut pipeline = RenderPipeline::with_engine(engine.clone(), slow_settings());
        pipeline
            .begin_render(Extent2d::new(64, 64), RenderMode::Quiet)
            .unwrap();
        pipeline.render().unwrap();
        Arc::clone(pipeline.context().unwrap())
    };

    assert!(context.is_done());
    assert_eq!(context.outcome(), Some(RenderOutcome::Cancelled));
    assert_eq!(engine.ends(), 1);
}

// ============================================================================
// Variant Tests
// ============================================================================

#[rstest]
#[case::corner(PixelRect::new(0, 0, 2, 2))]
#[case::middle(PixelRect::new(1, 1, 3, 2))]
#[case::last_row(PixelRect::new(0, 4, 5, 1))]
fn test_region_render(#[case] region: PixelRect) {
    let mut pipeline = RenderPipeline::new(fast_settings());
    let buffer = pipeline
        .begin_render_region(Extent2d::new(5, 5), region, RenderMode::Interactive)
        .unwrap();
    assert_eq!(buffer.overlay_rect(), Some(region));

    pipeline.render().unwrap();
    assert_eq!(pipeline.run_modal(), Ok(RenderOutcome::Completed));

    let placeholder = fast_settings().placeholder_color;
    for y in 0..5 {
        for x in 0..5 {
            let expected = if region.contains(x, y) {
                placeholder
            } else {
                Color4::TRANSPARENT
            };
            assert_eq!(buffer.pixel(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn test_composite_region_over_display() {
    let display = FrameBuffer::allocate(Extent2d::new(3, 3), 1 << 20).unwrap();
    for y in 0..3 {
        for x in 0..3 {
            display.set_pixel(x, y, Color4::BLACK);
        }
    }

    let mut pipeline = RenderPipeline::new(fast_settings());
    let buffer = pipeline
        .begin_render_composite(&display, PixelRect::new(1, 1, 1, 1), RenderMode::Quiet)
        .unwrap();
    pipeline.render().unwrap();
    pipeline.run_modal().unwrap();

    assert_eq!(buffer.pixel(1, 1), Some(fast_settings().placeholder_color));
    assert_eq!(buffer.pixel(0, 0), Some(Color4::BLACK));
    assert_eq!(buffer.pixel(2, 2), Some(Color4::BLACK));
}

#[test]
fn test_windowed_render_uses_completion_signal() {
    let engine = CountingEngine::default();
    let mut pipeline = RenderPipeline::with_engine(engine.clone(), fast_settings());
    let buffer = pipeline
        .begin_render_region(
            Extent2d::new(8, 8),
            PixelRect::new(2, 2, 4, 4),
            RenderMode::Interactive,
        )
        .unwrap();

    pipeline.render_in_window().unwrap();
    assert_eq!(
        pipeline.wait_for_completion(WAIT),
        Some(RenderOutcome::Completed)
    );
    assert!(pipeline.is_done());
    pipeline.end_render();

    assert_eq!(engine.ends(), 1);
    assert_eq!(buffer.pixel(5, 5), Some(fast_settings().placeholder_color));
    assert_eq!(buffer.pixel(6, 6), Some(Color4::TRANSPARENT));
}

#[test]
fn test_scene_aware_render_paints_background() {
    let sky = Color4::new(0.25, 0.5, 1.0, 1.0);
    let document = TestDocument::default().with_environment(1, "Sky", sky);
    let queue = Arc::new(SceneChangeQueue::new(Arc::new(document)));
    queue.apply_environment_delta(EnvironmentUsage::Background, Some(EnvironmentId(1)));

    let mut pipeline = RenderPipeline::new(fast_settings()).with_scene(Arc::clone(&queue));
    let buffer = pipeline
        .begin_render(Extent2d::new(3, 2), RenderMode::Quiet)
        .unwrap();
    pipeline.render().unwrap();
    pipeline.run_modal().unwrap();

    assert!(buffer.to_pixels().iter().all(|&pixel| pixel == sky));
}

#[test]
fn test_custom_shader_replaces_scene_colors() {
    let sky = Color4::new(0.25, 0.5, 1.0, 1.0);
    let document = TestDocument::default().with_environment(1, "Sky", sky);
    let queue = Arc::new(SceneChangeQueue::new(Arc::new(document)));
    queue.apply_environment_delta(EnvironmentUsage::Background, Some(EnvironmentId(1)));

    let mut pipeline = RenderPipeline::new(fast_settings())
        .with_scene(queue)
        .with_shader(Arc::new(SolidShader::new(Color4::BLACK)));
    let buffer = pipeline
        .begin_render(Extent2d::new(3, 3), RenderMode::Interactive)
        .unwrap();
    pipeline.render().unwrap();

    assert_eq!(pipeline.run_modal(), Ok(RenderOutcome::Completed));
    assert!(buffer.to_pixels().iter().all(|&pixel| pixel == Color4::BLACK));
}
