//! Waveform display list.
//!
//! [`build_display_list`] turns the visible peaks and the session markers into
//! an ordered list of [`DrawCmd`]s; [`paint`] hands that list to an egui
//! painter. Keeping the two apart lets the drawing be tested without a GPU.

use crate::theme::Theme;
use autosplit_audio::Peak;
use autosplit_core::segment::boundaries;
use autosplit_core::time::format_axis_label;
use autosplit_core::{TimeRange, Viewport};
use egui::epaint::{Mesh, PathShape};
use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Shape, Stroke, Vec2};

/// Height of the time-label strip along the bottom edge.
pub const LABEL_STRIP_HEIGHT: f32 = 16.0;
/// Height of the split handle badge at the top of a marker.
pub const SPLIT_HANDLE_HEIGHT: f32 = 14.0;
pub const SPLIT_HANDLE_WIDTH: f32 = 16.0;
/// Size of the triangular trim flags.
pub const TRIM_FLAG_SIZE: f32 = 10.0;
/// Fraction of the half-height a full-scale peak reaches.
const AMPLITUDE_HEADROOM: f32 = 0.92;
const DASH_LENGTH: f32 = 4.0;
const DASH_GAP: f32 = 3.0;

/// One primitive in the display list.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect {
        rect: Rect,
        color: Color32,
    },
    Line {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    DashedLine {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    /// Vertical one-pixel bar whose color runs from `from_color` at `y_from`
    /// to `to_color` at `y_to`.
    GradientBar {
        x: f32,
        y_from: f32,
        y_to: f32,
        from_color: Color32,
        to_color: Color32,
    },
    Polygon {
        points: Vec<Pos2>,
        color: Color32,
    },
    Text {
        pos: Pos2,
        anchor: Align2,
        text: String,
        size: f32,
        color: Color32,
    },
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct WaveformScene<'a> {
    /// One min/max pair per pixel column of the visible window.
    pub peaks: &'a [Peak],
    /// Scale applied to peaks so the loudest sample nearly fills the view.
    pub gain: f32,
    pub viewport: &'a Viewport,
    pub trim: TimeRange,
    pub split_points: &'a [f64],
    pub playhead: f64,
}

/// Rectangle holding the waveform itself, above the label strip.
pub fn wave_rect(rect: Rect) -> Rect {
    Rect::from_min_max(
        rect.min,
        Pos2::new(rect.right(), (rect.bottom() - LABEL_STRIP_HEIGHT).max(rect.top())),
    )
}

/// Build the display list for `scene` drawn into `rect`.
///
/// The viewport width is expected to equal `rect.width()`.
pub fn build_display_list(scene: &WaveformScene<'_>, rect: Rect) -> Vec<DrawCmd> {
    let mut cmds = Vec::with_capacity(scene.peaks.len() * 2 + 32);
    let wave = wave_rect(rect);
    let center_y = wave.center().y;
    let x_of = |t: f64| rect.left() + scene.viewport.time_to_x(t) as f32;
    let visible = |x: f32| x >= rect.left() - 1.0 && x <= rect.right() + 1.0;

    cmds.push(DrawCmd::Rect {
        rect,
        color: Theme::bg(),
    });

    if !scene.viewport.is_mappable() {
        return cmds;
    }

    // Segment bands
    let bounds = boundaries(scene.trim.start, scene.split_points, scene.trim.end);
    for (i, pair) in bounds.windows(2).enumerate() {
        let left = x_of(pair[0]).max(rect.left());
        let right = x_of(pair[1]).min(rect.right());
        if right <= left {
            continue;
        }
        cmds.push(DrawCmd::Rect {
            rect: Rect::from_min_max(Pos2::new(left, wave.top()), Pos2::new(right, wave.bottom())),
            color: if i % 2 == 0 {
                Theme::band_even()
            } else {
                Theme::band_odd()
            },
        });
    }

    cmds.push(DrawCmd::Line {
        from: Pos2::new(rect.left(), center_y),
        to: Pos2::new(rect.right(), center_y),
        width: 1.0,
        color: Theme::white_10(),
    });

    // Amplitude bars
    let half_h = wave.height() * 0.5 * AMPLITUDE_HEADROOM;
    for (px, peak) in scene.peaks.iter().enumerate() {
        let x = rect.left() + px as f32 + 0.5;
        let max = (peak.max * scene.gain).clamp(-1.0, 1.0);
        let min = (peak.min * scene.gain).clamp(-1.0, 1.0);
        if max > 0.0 {
            cmds.push(DrawCmd::GradientBar {
                x,
                y_from: center_y,
                y_to: center_y - max * half_h,
                from_color: Theme::wave_pos_inner(),
                to_color: Theme::lerp(Theme::wave_pos_inner(), Theme::wave_pos_outer(), max),
            });
        }
        if min < 0.0 {
            cmds.push(DrawCmd::GradientBar {
                x,
                y_from: center_y,
                y_to: center_y - min * half_h,
                from_color: Theme::wave_neg_inner(),
                to_color: Theme::lerp(Theme::wave_neg_inner(), Theme::wave_neg_outer(), -min),
            });
        }
    }

    // Dim outside the trim range
    let trim_start_x = x_of(scene.trim.start);
    let trim_end_x = x_of(scene.trim.end);
    if trim_start_x > rect.left() {
        cmds.push(DrawCmd::Rect {
            rect: Rect::from_min_max(
                Pos2::new(rect.left(), wave.top()),
                Pos2::new(trim_start_x.min(rect.right()), wave.bottom()),
            ),
            color: Theme::trim_dim(),
        });
    }
    if trim_end_x < rect.right() {
        cmds.push(DrawCmd::Rect {
            rect: Rect::from_min_max(
                Pos2::new(trim_end_x.max(rect.left()), wave.top()),
                Pos2::new(rect.right(), wave.bottom()),
            ),
            color: Theme::trim_dim(),
        });
    }

    // Time labels
    for t in scene.viewport.label_times() {
        let x = x_of(t);
        if !visible(x) {
            continue;
        }
        cmds.push(DrawCmd::Line {
            from: Pos2::new(x, wave.bottom()),
            to: Pos2::new(x, wave.bottom() + 4.0),
            width: 1.0,
            color: Theme::t3(),
        });
        cmds.push(DrawCmd::Text {
            pos: Pos2::new(x + 2.0, rect.bottom() - 1.0),
            anchor: Align2::LEFT_BOTTOM,
            text: format_axis_label(t),
            size: Theme::FONT_XS,
            color: Theme::t2(),
        });
    }

    // Split markers
    for (i, &t) in scene.split_points.iter().enumerate() {
        let x = x_of(t);
        if !visible(x) {
            continue;
        }
        cmds.push(DrawCmd::DashedLine {
            from: Pos2::new(x, wave.top() + SPLIT_HANDLE_HEIGHT),
            to: Pos2::new(x, wave.bottom()),
            width: 1.0,
            color: Theme::amber(),
        });
        let handle = Rect::from_center_size(
            Pos2::new(x, wave.top() + SPLIT_HANDLE_HEIGHT * 0.5),
            Vec2::new(SPLIT_HANDLE_WIDTH, SPLIT_HANDLE_HEIGHT),
        );
        cmds.push(DrawCmd::Rect {
            rect: handle,
            color: Theme::amber(),
        });
        cmds.push(DrawCmd::Text {
            pos: handle.center(),
            anchor: Align2::CENTER_CENTER,
            text: (i + 1).to_string(),
            size: Theme::FONT_XS,
            color: Theme::bg(),
        });
    }

    // Trim flags point into the kept range
    for (x, color, dir) in [
        (trim_start_x, Theme::green(), 1.0),
        (trim_end_x, Theme::red(), -1.0),
    ] {
        if !visible(x) {
            continue;
        }
        cmds.push(DrawCmd::Line {
            from: Pos2::new(x, wave.top()),
            to: Pos2::new(x, wave.bottom()),
            width: 2.0,
            color,
        });
        cmds.push(DrawCmd::Polygon {
            points: vec![
                Pos2::new(x, wave.top()),
                Pos2::new(x + dir * TRIM_FLAG_SIZE, wave.top() + TRIM_FLAG_SIZE * 0.5),
                Pos2::new(x, wave.top() + TRIM_FLAG_SIZE),
            ],
            color,
        });
    }

    let playhead_x = x_of(scene.playhead);
    if visible(playhead_x) {
        cmds.push(DrawCmd::Line {
            from: Pos2::new(playhead_x, wave.top()),
            to: Pos2::new(playhead_x, wave.bottom()),
            width: 1.5,
            color: Theme::t1(),
        });
    }

    cmds
}

/// Paint a display list.
pub fn paint(painter: &egui::Painter, cmds: &[DrawCmd]) {
    for cmd in cmds {
        match cmd {
            DrawCmd::Rect { rect, color } => {
                painter.rect_filled(*rect, Rounding::ZERO, *color);
            }
            DrawCmd::Line {
                from,
                to,
                width,
                color,
            } => {
                painter.line_segment([*from, *to], Stroke::new(*width, *color));
            }
            DrawCmd::DashedLine {
                from,
                to,
                width,
                color,
            } => {
                painter.extend(Shape::dashed_line(
                    &[*from, *to],
                    Stroke::new(*width, *color),
                    DASH_LENGTH,
                    DASH_GAP,
                ));
            }
            DrawCmd::GradientBar {
                x,
                y_from,
                y_to,
                from_color,
                to_color,
            } => {
                let mut mesh = Mesh::default();
                let (l, r) = (x - 0.5, x + 0.5);
                mesh.colored_vertex(Pos2::new(l, *y_from), *from_color);
                mesh.colored_vertex(Pos2::new(r, *y_from), *from_color);
                mesh.colored_vertex(Pos2::new(r, *y_to), *to_color);
                mesh.colored_vertex(Pos2::new(l, *y_to), *to_color);
                mesh.add_triangle(0, 1, 2);
                mesh.add_triangle(0, 2, 3);
                painter.add(Shape::mesh(mesh));
            }
            DrawCmd::Polygon { points, color } => {
                painter.add(PathShape::convex_polygon(points.clone(), *color, Stroke::NONE));
            }
            DrawCmd::Text {
                pos,
                anchor,
                text,
                size,
                color,
            } => {
                painter.text(*pos, *anchor, text, FontId::proportional(*size), *color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 116.0))
    }

    fn scene<'a>(viewport: &'a Viewport, peaks: &'a [Peak], splits: &'a [f64]) -> WaveformScene<'a> {
        WaveformScene {
            peaks,
            gain: 1.0,
            viewport,
            trim: TimeRange::new(10.0, 90.0),
            split_points: splits,
            playhead: 50.0,
        }
    }

    fn count(cmds: &[DrawCmd], pred: impl Fn(&DrawCmd) -> bool) -> usize {
        cmds.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_identical_inputs_identical_list() {
        let vp = Viewport::new(100.0, 100.0);
        let peaks = vec![Peak { min: -0.5, max: 0.5 }; 100];
        let a = build_display_list(&scene(&vp, &peaks, &[40.0]), rect());
        let b = build_display_list(&scene(&vp, &peaks, &[40.0]), rect());
        assert_eq!(a, b);
    }

    #[test]
    fn test_background_first_playhead_last() {
        let vp = Viewport::new(100.0, 100.0);
        let cmds = build_display_list(&scene(&vp, &[], &[]), rect());
        assert!(matches!(cmds.first(), Some(DrawCmd::Rect { color, .. }) if *color == Theme::bg()));
        match cmds.last() {
            Some(DrawCmd::Line { from, .. }) => assert!((from.x - 50.0).abs() < 1e-3),
            other => panic!("expected playhead line, got {other:?}"),
        }
    }

    #[test]
    fn test_bars_use_both_halves() {
        let vp = Viewport::new(100.0, 100.0);
        let mut peaks = vec![Peak::default(); 100];
        peaks[20] = Peak { min: -1.0, max: 1.0 };
        peaks[21] = Peak { min: 0.1, max: 0.6 };
        let cmds = build_display_list(&scene(&vp, &peaks, &[]), rect());
        let bars: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::GradientBar { x, y_from, y_to, .. } => Some((*x, *y_from, *y_to)),
                _ => None,
            })
            .collect();
        assert_eq!(bars.len(), 3);
        // Positive bar rises (smaller y), negative bar falls.
        assert!(bars[0].2 < bars[0].1);
        assert!(bars[1].2 > bars[1].1);
        assert!((bars[2].0 - 21.5).abs() < 1e-3);
    }

    #[test]
    fn test_segment_bands_alternate() {
        let vp = Viewport::new(100.0, 100.0);
        let cmds = build_display_list(&scene(&vp, &[], &[30.0, 60.0]), rect());
        let bands: Vec<Color32> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Rect { color, .. }
                    if *color == Theme::band_even() || *color == Theme::band_odd() =>
                {
                    Some(*color)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            bands,
            vec![Theme::band_even(), Theme::band_odd(), Theme::band_even()]
        );
    }

    #[test]
    fn test_trim_dimming_both_sides() {
        let vp = Viewport::new(100.0, 100.0);
        let cmds = build_display_list(&scene(&vp, &[], &[]), rect());
        let dims: Vec<Rect> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Rect { rect, color } if *color == Theme::trim_dim() => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(dims.len(), 2);
        assert!((dims[0].right() - 10.0).abs() < 1e-3);
        assert!((dims[1].left() - 90.0).abs() < 1e-3);
        assert!((dims[0].bottom() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_split_markers_labelled() {
        let vp = Viewport::new(100.0, 100.0);
        let cmds = build_display_list(&scene(&vp, &[], &[25.0, 75.0]), rect());
        assert_eq!(count(&cmds, |c| matches!(c, DrawCmd::DashedLine { .. })), 2);
        let labels: Vec<&str> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, anchor, .. } if *anchor == Align2::CENTER_CENTER => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["1", "2"]);
    }

    #[test]
    fn test_two_trim_flags() {
        let vp = Viewport::new(100.0, 100.0);
        let cmds = build_display_list(&scene(&vp, &[], &[]), rect());
        assert_eq!(count(&cmds, |c| matches!(c, DrawCmd::Polygon { .. })), 2);
    }

    #[test]
    fn test_offscreen_markers_skipped() {
        let mut vp = Viewport::new(100.0, 100.0);
        vp.zoom = 10.0;
        vp.view_start = 40.0; // visible 40..50
        let cmds = build_display_list(&scene(&vp, &[], &[20.0, 45.0]), rect());
        assert_eq!(count(&cmds, |c| matches!(c, DrawCmd::DashedLine { .. })), 1);
        // Trim bounds at 10 and 90 are both off screen.
        assert_eq!(count(&cmds, |c| matches!(c, DrawCmd::Polygon { .. })), 0);
    }

    #[test]
    fn test_time_labels_follow_ladder() {
        let vp = Viewport::new(100.0, 100.0);
        let cmds = build_display_list(&scene(&vp, &[], &[]), rect());
        let labels: Vec<&str> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, anchor, .. } if *anchor == Align2::LEFT_BOTTOM => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        // 100 s visible uses 10 s spacing.
        assert_eq!(labels.first(), Some(&"0:00"));
        assert_eq!(labels.len(), 11);
        assert_eq!(labels[3], "0:30");
    }

    #[test]
    fn test_unmappable_viewport_only_background() {
        let vp = Viewport::new(0.0, 100.0);
        let cmds = build_display_list(&scene(&vp, &[], &[]), rect());
        assert_eq!(cmds.len(), 1);
    }
}
