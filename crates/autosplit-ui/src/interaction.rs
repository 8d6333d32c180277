//! Pointer interaction with the waveform: trim handles, split markers,
//! panning, seeking and wheel zoom.
//!
//! The controller is a small state machine fed with pixel positions relative
//! to the waveform's left edge, so it runs the same under egui and in tests.

use autosplit_core::AudioSession;
use egui::CursorIcon;

/// Grab distance for trim handles and split markers.
pub const HIT_TOLERANCE_PX: f64 = 8.0;
/// Pointer travel after which a body press turns into a pan.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// What lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    TrimStart,
    TrimEnd,
    Split(usize),
    Body,
}

/// Controller state between pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Body pressed, not yet moved past the threshold.
    Pressed { origin_x: f64 },
    DraggingTrimStart,
    DraggingTrimEnd,
    DraggingSplit(usize),
    Panning { last_x: f64 },
}

/// What an input event changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    TrimStartMoved(f64),
    TrimEndMoved(f64),
    SplitMoved { index: usize, time: f64 },
    /// The playhead should jump here.
    Seek(f64),
    Panned,
    Zoomed,
}

impl InteractionEvent {
    /// Whether the event moved a segment boundary.
    pub fn changes_boundaries(&self) -> bool {
        matches!(
            self,
            Self::TrimStartMoved(_) | Self::TrimEndMoved(_) | Self::SplitMoved { .. }
        )
    }
}

/// Pointer state machine for one waveform view.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: DragState,
}

/// Find what is under pixel `x`.
///
/// Priority: trim start, trim end, nearest split within tolerance, body.
pub fn hit_test(session: &AudioSession, x: f64) -> Hit {
    let vp = &session.viewport;
    if !vp.is_mappable() {
        return Hit::Body;
    }
    if (vp.time_to_x(session.trim_start()) - x).abs() <= HIT_TOLERANCE_PX {
        return Hit::TrimStart;
    }
    if (vp.time_to_x(session.trim_end()) - x).abs() <= HIT_TOLERANCE_PX {
        return Hit::TrimEnd;
    }
    session
        .split_points()
        .iter()
        .enumerate()
        .map(|(i, &t)| (i, (vp.time_to_x(t) - x).abs()))
        .filter(|&(_, d)| d <= HIT_TOLERANCE_PX)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(Hit::Body, |(i, _)| Hit::Split(i))
}

/// Cursor shown while hovering `hit`.
pub fn hover_cursor(hit: Hit, zoomed: bool) -> CursorIcon {
    match hit {
        Hit::TrimStart | Hit::TrimEnd | Hit::Split(_) => CursorIcon::ResizeHorizontal,
        Hit::Body if zoomed => CursorIcon::Grab,
        Hit::Body => CursorIcon::PointingHand,
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a handle or the view is being dragged.
    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle | DragState::Pressed { .. })
    }

    /// Cursor for the current drag, or for hovering at `hover_x`.
    pub fn cursor(&self, session: &AudioSession, hover_x: Option<f64>) -> CursorIcon {
        match self.state {
            DragState::DraggingTrimStart
            | DragState::DraggingTrimEnd
            | DragState::DraggingSplit(_) => CursorIcon::ResizeHorizontal,
            DragState::Panning { .. } => CursorIcon::Grabbing,
            DragState::Idle | DragState::Pressed { .. } => hover_x.map_or(CursorIcon::Default, |x| {
                hover_cursor(hit_test(session, x), session.viewport.is_zoomed())
            }),
        }
    }

    pub fn pointer_down(&mut self, session: &AudioSession, x: f64) {
        self.state = match hit_test(session, x) {
            Hit::TrimStart => DragState::DraggingTrimStart,
            Hit::TrimEnd => DragState::DraggingTrimEnd,
            Hit::Split(i) => DragState::DraggingSplit(i),
            Hit::Body => DragState::Pressed { origin_x: x },
        };
    }

    pub fn pointer_move(&mut self, session: &mut AudioSession, x: f64) -> Option<InteractionEvent> {
        let t = session.viewport.x_to_time_clamped(x);
        match self.state {
            DragState::Idle => None,
            DragState::Pressed { origin_x } => {
                if session.viewport.is_zoomed() && (x - origin_x).abs() > DRAG_THRESHOLD_PX {
                    session.viewport.pan_by_pixels(x - origin_x);
                    self.state = DragState::Panning { last_x: x };
                    Some(InteractionEvent::Panned)
                } else {
                    None
                }
            }
            DragState::Panning { last_x } => {
                session.viewport.pan_by_pixels(x - last_x);
                self.state = DragState::Panning { last_x: x };
                Some(InteractionEvent::Panned)
            }
            DragState::DraggingTrimStart => {
                Some(InteractionEvent::TrimStartMoved(session.set_trim_start(t)))
            }
            DragState::DraggingTrimEnd => Some(InteractionEvent::TrimEndMoved(session.set_trim_end(t))),
            DragState::DraggingSplit(index) => session
                .move_split(index, t)
                .map(|time| InteractionEvent::SplitMoved { index, time }),
        }
    }

    /// Finish the gesture. A body press released within the drag threshold
    /// seeks; anything longer is a drag and leaves the playhead alone.
    pub fn pointer_up(&mut self, session: &mut AudioSession, x: f64) -> Option<InteractionEvent> {
        let event = match self.state {
            DragState::Pressed { origin_x } if (x - origin_x).abs() <= DRAG_THRESHOLD_PX => {
                let t = session.seek(session.viewport.x_to_time_clamped(x));
                Some(InteractionEvent::Seek(t))
            }
            _ => None,
        };
        self.state = DragState::Idle;
        event
    }

    /// Abort any gesture without seeking, e.g. when the pointer leaves.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Zoom around `x`. Positive ticks zoom in.
    pub fn wheel(&mut self, session: &mut AudioSession, x: f64, ticks: i32) -> Option<InteractionEvent> {
        if ticks == 0 || !session.viewport.is_mappable() {
            return None;
        }
        let before = (session.viewport.zoom, session.viewport.view_start);
        session.viewport.wheel_zoom(x, ticks);
        let after = (session.viewport.zoom, session.viewport.view_start);
        (before != after).then_some(InteractionEvent::Zoomed)
    }
}
