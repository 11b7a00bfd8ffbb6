use new_marquee::marquee::controller::RESIZE_DEBOUNCE_MS;
use new_marquee::marquee::persistence::PERSIST_TICK_MS;
use new_marquee::{
    Axis, Direction, DocumentDirection, EventSource, MarqueeController, MeasuredGeometry, MemoryPlatform,
    Phase, PlaybackState,
};

/// Attach and run frames until the stability gate has opened
fn run(platform: MemoryPlatform) -> MarqueeController<MemoryPlatform> {
    let mut controller = MarqueeController::new(platform);
    controller.attach();
    controller.run_until_settled(200);
    controller
}

fn wide_strip() -> MemoryPlatform {
    MemoryPlatform::new().with_geometry(MeasuredGeometry::new(2000.0, 40.0, 500.0, 40.0))
}

#[test]
fn test_left_scroll_at_100_px_per_second() {
    let controller = run(wide_strip()
        .with_attribute("speed", "100")
        .with_attribute("direction", "left"));

    assert_eq!(controller.phase(), Phase::Running);
    let plan = controller.driver().plan().expect("running loop has a plan");
    assert_eq!(plan.direction, Direction::Left);
    assert_eq!(plan.duration_ms, 20_000.0);
    assert_eq!(plan.start().axis, Axis::Horizontal);
    assert_eq!(plan.start().offset_px, 500.0);
    assert_eq!(plan.end().offset_px, -2000.0);
}

#[test]
fn test_arabic_document_scrolls_right() {
    let controller = run(wide_strip().with_document(DocumentDirection::from_lang("ar")));

    assert_eq!(controller.direction(), Direction::Right);
    let plan = controller.driver().plan().unwrap();
    assert_eq!(plan.start().offset_px, -2000.0);
    assert_eq!(plan.end().offset_px, 500.0);
}

#[test]
fn test_persistent_marquee_resumes_with_elapsed_time() {
    let saved_at = 1_700_000_000_000.0;
    let mut platform = wide_strip()
        .with_attribute("speed", "100")
        .with_attribute("persistent", "true")
        .with_attribute("id", "ticker")
        .with_now(saved_at + 3000.0);
    platform.set_stored("ticker-state", r#"{"time":5000,"timestamp":1700000000000}"#);

    let mut controller = run(platform);
    assert_eq!(controller.driver().position(controller.platform()), Some(8000.0));

    // First interval tick writes straight away
    controller.advance(f64::from(PERSIST_TICK_MS));
    let raw = controller.platform().stored("ticker-state").unwrap();
    let state: PlaybackState = serde_json::from_str(raw).unwrap();
    assert_eq!(state.position, 8500.0);
    assert_eq!(state.saved_at_epoch_ms, saved_at + 3500.0);
}

#[test]
fn test_persisted_position_wraps_around_the_loop() {
    let mut platform = wide_strip()
        .with_attribute("speed", "100")
        .with_attribute("persistent", "true")
        .with_now(60_000.0);
    platform.set_stored("new-marquee-state", r#"{"time":15000,"timestamp":50000}"#);

    let controller = run(platform);
    assert_eq!(controller.driver().position(controller.platform()), Some(5000.0));
}

#[test]
fn test_unreadable_saved_state_starts_from_zero() {
    let mut platform = wide_strip().with_attribute("persistent", "true");
    platform.set_stored("new-marquee-state", "garbage");

    let controller = run(platform);
    assert_eq!(controller.phase(), Phase::Running);
    assert_eq!(controller.driver().position(controller.platform()), Some(0.0));
}

#[test]
fn test_storage_failures_never_stop_the_loop() {
    let mut platform = wide_strip().with_attribute("persistent", "true");
    platform.set_storage_failing(true);

    let mut controller = run(platform);
    controller.advance(5000.0);
    assert_eq!(controller.phase(), Phase::Running);
    assert_eq!(controller.platform().store_count(), 0);
}

#[test]
fn test_writes_are_throttled_by_loop_length() {
    // 20s loop: at most one write per second
    let platform = wide_strip()
        .with_attribute("speed", "100")
        .with_attribute("persistent", "true");
    let mut controller = run(platform);

    controller.advance(4000.0);
    assert_eq!(controller.platform().store_count(), 4);
}

#[test]
fn test_vertical_scroll_uses_heights() {
    let platform = MemoryPlatform::new()
        .with_geometry(MeasuredGeometry::new(300.0, 600.0, 300.0, 200.0))
        .with_attribute("direction", "down")
        .with_attribute("speed", "60");
    let controller = run(platform);

    let plan = controller.driver().plan().unwrap();
    assert_eq!(plan.start().axis, Axis::Vertical);
    assert_eq!(plan.duration_ms, 10_000.0);
    assert_eq!(plan.start().transform(), "translateY(-600px)");
    assert_eq!(plan.end().transform(), "translateY(200px)");
}

#[test]
fn test_invalid_attributes_fall_back_to_defaults() {
    let controller = run(wide_strip()
        .with_attribute("speed", "fast")
        .with_attribute("direction", "diagonal"));

    let plan = controller.driver().plan().unwrap();
    assert_eq!(plan.direction, Direction::Left);
    assert_eq!(plan.duration_ms, 40_000.0);
}

#[test]
fn test_resize_restarts_only_on_real_change() {
    let mut controller = run(wide_strip());
    assert_eq!(controller.platform().animations_created(), 1);

    controller.emit(EventSource::WindowResize);
    controller.advance(f64::from(RESIZE_DEBOUNCE_MS));
    controller.run_until_settled(200);
    assert_eq!(controller.platform().animations_created(), 1);

    controller
        .platform_mut()
        .set_geometry(MeasuredGeometry::new(2000.0, 40.0, 800.0, 40.0));
    for _ in 0..5 {
        controller.emit(EventSource::WindowResize);
        controller.advance(50.0);
    }
    controller.advance(f64::from(RESIZE_DEBOUNCE_MS));
    controller.run_until_settled(200);

    assert_eq!(controller.platform().animations_created(), 2);
    assert_eq!(controller.platform().live_animation_count(), 1);
    assert_eq!(controller.driver().plan().unwrap().start().offset_px, 800.0);
}

#[test]
fn test_document_language_change_flips_direction() {
    let mut controller = run(wide_strip().with_document(DocumentDirection::from_lang("en")));
    assert_eq!(controller.direction(), Direction::Left);

    controller
        .platform_mut()
        .set_document(DocumentDirection::from_lang("he-IL"));
    controller.emit(EventSource::DocumentDirection);
    controller.advance(100.0);
    controller.run_until_settled(200);

    assert_eq!(controller.direction(), Direction::Right);
    assert_eq!(controller.driver().plan().unwrap().direction, Direction::Right);
    assert_eq!(controller.platform().live_animation_count(), 1);
}

#[test]
fn test_explicit_direction_ignores_document_language() {
    let mut controller = run(wide_strip().with_attribute("direction", "left"));

    controller.platform_mut().set_document(DocumentDirection::from_lang("ar"));
    controller.emit(EventSource::DocumentDirection);
    controller.advance(100.0);
    controller.run_until_settled(200);

    assert_eq!(controller.direction(), Direction::Left);
    assert_eq!(controller.platform().animations_created(), 1);
}

#[test]
fn test_unstable_layout_eventually_starts() {
    let mut controller = MarqueeController::new(wide_strip());
    controller.attach();

    // Container keeps changing width every frame
    for width in 0..200 {
        if controller.platform().pending_frame_count() == 0 {
            break;
        }
        controller
            .platform_mut()
            .set_geometry(MeasuredGeometry::new(2000.0, 40.0, 400.0 + width as f64, 40.0));
        controller.run_frame();
    }

    assert_eq!(controller.phase(), Phase::Running);
    assert_eq!(controller.platform().pending_frame_count(), 0);
}

#[test]
fn test_container_without_id_saves_under_key_base() {
    let platform = wide_strip()
        .with_key_base("marquee")
        .with_attribute("persistent", "true");
    let mut controller = run(platform);

    controller.advance(f64::from(PERSIST_TICK_MS));
    assert!(controller.platform().stored("marquee-state").is_some());
    assert!(controller.platform().stored("new-marquee-state").is_none());
}
