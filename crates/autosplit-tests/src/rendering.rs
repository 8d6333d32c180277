//! Decoded audio through peaks into a display list.

use autosplit_audio::Waveform;
use autosplit_core::{AudioSession, DecodedAudio};
use autosplit_ui::{build_display_list, DrawCmd, WaveformScene};
use egui::{Align2, Pos2, Rect};

const WIDTH: f32 = 800.0;

/// 8 s of a 1 Hz sine at 8 kHz.
fn sine_session() -> AudioSession {
    let rate = 8_000u32;
    let samples: Vec<f32> = (0..rate as usize * 8)
        .map(|i| (i as f32 / rate as f32 * std::f32::consts::TAU).sin() * 0.5)
        .collect();
    let mut s = AudioSession::new(None, DecodedAudio::new(rate, vec![samples]));
    s.viewport.set_width(WIDTH as f64);
    s
}

fn display_list(s: &AudioSession, waveform: &Waveform) -> Vec<DrawCmd> {
    let peaks = waveform.peaks(
        s.viewport.view_start,
        s.viewport.visible_duration(),
        WIDTH as usize,
    );
    let scene = WaveformScene {
        peaks: &peaks,
        gain: 1.0 / waveform.max_magnitude(),
        viewport: &s.viewport,
        trim: s.trim_range(),
        split_points: s.split_points(),
        playhead: s.playhead(),
    };
    build_display_list(
        &scene,
        Rect::from_min_size(Pos2::new(0.0, 0.0), egui::vec2(WIDTH, 200.0)),
    )
}

fn split_labels(cmds: &[DrawCmd]) -> Vec<String> {
    cmds.iter()
        .filter_map(|c| match c {
            DrawCmd::Text {
                anchor: Align2::CENTER_CENTER,
                text,
                ..
            } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn whole_file_view_draws_every_split_and_column() {
    let mut s = sine_session();
    s.set_split_points(vec![2.0, 4.0, 6.0]);
    let waveform = Waveform::from_audio(s.audio());
    let cmds = display_list(&s, &waveform);

    assert_eq!(split_labels(&cmds), vec!["1", "2", "3"]);
    let dashed = cmds
        .iter()
        .filter(|c| matches!(c, DrawCmd::DashedLine { .. }))
        .count();
    assert_eq!(dashed, 3);

    // Every column holds signal, so each gets at least one bar.
    let bars = cmds
        .iter()
        .filter(|c| matches!(c, DrawCmd::GradientBar { .. }))
        .count();
    assert!(bars >= WIDTH as usize, "only {bars} bars");
}

#[test]
fn zoomed_view_skips_offscreen_splits() {
    let mut s = sine_session();
    s.set_split_points(vec![1.0, 7.0]);
    // 8x around the middle shows 3.5 s .. 4.5 s.
    s.viewport.set_zoom_at(WIDTH as f64 / 2.0, 8.0);
    let waveform = Waveform::from_audio(s.audio());
    let cmds = display_list(&s, &waveform);

    assert!(split_labels(&cmds).is_empty());
    let trim_flags = cmds
        .iter()
        .filter(|c| matches!(c, DrawCmd::Polygon { .. }))
        .count();
    assert_eq!(trim_flags, 0);
}

#[test]
fn trimmed_range_is_dimmed_on_both_sides() {
    let mut s = sine_session();
    s.set_trim_start(1.0);
    s.set_trim_end(7.0);
    let waveform = Waveform::from_audio(s.audio());
    let cmds = display_list(&s, &waveform);

    let flags = cmds
        .iter()
        .filter(|c| matches!(c, DrawCmd::Polygon { .. }))
        .count();
    assert_eq!(flags, 2);
    let dim_rects: Vec<&Rect> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCmd::Rect { rect, color } if *color == autosplit_ui::Theme::trim_dim() => {
                Some(rect)
            }
            _ => None,
        })
        .collect();
    assert_eq!(dim_rects.len(), 2);
    assert!((dim_rects[0].right() - 100.0).abs() < 0.01);
    assert!((dim_rects[1].left() - 700.0).abs() < 0.01);
}
