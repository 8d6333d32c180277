//! Pointer gestures against a real session: ordering and zoom invariants.

use autosplit_core::segment::is_strictly_increasing;
use autosplit_core::{AudioSession, DecodedAudio};
use autosplit_ui::{DragState, InteractionController, InteractionEvent};
use proptest::prelude::*;

/// 100 s in a 1000 px view with splits at 25, 50 and 75 s.
fn session() -> AudioSession {
    let audio = DecodedAudio::new(100, vec![vec![0.0; 10_000]]);
    let mut s = AudioSession::new(None, audio);
    s.viewport.set_width(1000.0);
    s.set_split_points(vec![25.0, 50.0, 75.0]);
    s
}

fn assert_ordered(s: &AudioSession) {
    let b = s.boundaries();
    assert!(is_strictly_increasing(&b), "boundaries out of order: {b:?}");
    assert!(s.trim_start() >= 0.0);
    assert!(s.trim_end() <= s.duration());
}

#[test]
fn dragging_split_past_neighbour_stops_short() {
    let mut s = session();
    let mut c = InteractionController::new();
    c.pointer_down(&s, 250.0);
    assert_eq!(c.state(), DragState::DraggingSplit(0));
    let event = c.pointer_move(&mut s, 900.0);
    assert!(matches!(event, Some(InteractionEvent::SplitMoved { index: 0, .. })));
    c.pointer_up(&mut s, 900.0);
    assert!(s.split_points()[0] < 50.0);
    assert_ordered(&s);
}

#[test]
fn trim_drag_then_split_drag_stay_ordered() {
    let mut s = session();
    let mut c = InteractionController::new();

    c.pointer_down(&s, 0.0);
    assert_eq!(c.state(), DragState::DraggingTrimStart);
    c.pointer_move(&mut s, 400.0);
    c.pointer_up(&mut s, 400.0);
    assert!(s.trim_start() < 25.0);

    c.pointer_down(&s, 750.0);
    c.pointer_move(&mut s, 0.0);
    c.pointer_up(&mut s, 0.0);
    assert_ordered(&s);
    assert!(s.split_points()[2] > 50.0);
}

#[test]
fn click_seeks_without_moving_handles() {
    let mut s = session();
    let before = s.boundaries();
    let mut c = InteractionController::new();
    c.pointer_down(&s, 600.0);
    let Some(InteractionEvent::Seek(t)) = c.pointer_up(&mut s, 600.0) else {
        panic!("expected a seek");
    };
    assert!((t - 60.0).abs() < 1e-9);
    assert_eq!(s.playhead(), t);
    assert_eq!(s.boundaries(), before);
}

#[test]
fn wheel_zoom_keeps_time_under_pointer() {
    let mut s = session();
    let mut c = InteractionController::new();
    let t = s.viewport.x_to_time(730.0);
    for _ in 0..10 {
        c.wheel(&mut s, 730.0, 1);
        assert!((s.viewport.x_to_time(730.0) - t).abs() < 1e-6);
    }
    assert!(s.viewport.is_zoomed());
}

#[test]
fn zoomed_drag_pans_then_click_still_seeks() {
    let mut s = session();
    let mut c = InteractionController::new();
    c.wheel(&mut s, 500.0, 5);
    let start = s.viewport.view_start;

    c.pointer_down(&s, 400.0);
    assert_eq!(c.pointer_move(&mut s, 300.0), Some(InteractionEvent::Panned));
    assert_eq!(c.pointer_up(&mut s, 300.0), None);
    assert!(s.viewport.view_start > start);

    c.pointer_down(&s, 200.0);
    assert!(matches!(c.pointer_up(&mut s, 200.0), Some(InteractionEvent::Seek(_))));
}

proptest! {
    #[test]
    fn any_drag_sequence_keeps_boundaries_ordered(
        drags in prop::collection::vec((0.0f64..1000.0, -200.0f64..1200.0), 1..24)
    ) {
        let mut s = session();
        let mut c = InteractionController::new();
        for (from, to) in drags {
            c.pointer_down(&s, from);
            c.pointer_move(&mut s, (from + to) * 0.5);
            c.pointer_move(&mut s, to);
            c.pointer_up(&mut s, to);
            let b = s.boundaries();
            prop_assert!(is_strictly_increasing(&b), "out of order: {:?}", b);
            prop_assert!(s.trim_start() >= 0.0 && s.trim_end() <= s.duration());
            prop_assert_eq!(s.track_count(), 4);
        }
    }

    #[test]
    fn zoom_in_is_anchored_anywhere(x in 0.0f64..1000.0, ticks in 1i32..40) {
        let mut s = session();
        let mut c = InteractionController::new();
        let t = s.viewport.x_to_time(x);
        for _ in 0..ticks {
            c.wheel(&mut s, x, 1);
        }
        prop_assert!((s.viewport.x_to_time(x) - t).abs() < 1e-6);
        prop_assert!(s.viewport.view_start >= 0.0);
        prop_assert!(s.viewport.view_start <= s.viewport.max_view_start() + 1e-9);
    }
}

#[test]
fn long_body_drag_without_zoom_leaves_playhead() {
    let mut s = session();
    let before = s.boundaries();
    let mut c = InteractionController::new();
    c.pointer_down(&s, 120.0);
    c.pointer_move(&mut s, 400.0);
    assert_eq!(c.pointer_up(&mut s, 600.0), None);
    assert_eq!(s.playhead(), 0.0);
    assert_eq!(s.boundaries(), before);
}
