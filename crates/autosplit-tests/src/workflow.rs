//! Detect, split, export and write, end to end with scripted engines.

use autosplit_core::{
    detect_progressively, select_split_points, select_split_points_in_range, AudioSession,
    CancelToken, DecodedAudio, DetectionOutcome, DetectionPass, Result, SilenceInterval,
    SplitterError, TimeRange,
};
use autosplit_media::{
    write_segments, AudioCodec, EncodeParams, ExportOutcome, SegmentEncoder, SegmentExporter,
    SilenceDetector,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

// ── Helpers ────────────────────────────────────────────────────

/// Reports `silences` once the noise floor is at least `needs_db`.
struct ScriptedDetector {
    needs_db: f64,
    silences: Vec<SilenceInterval>,
}

impl SilenceDetector for ScriptedDetector {
    fn detect(
        &self,
        _source: &Path,
        pass: DetectionPass,
        _cancel: &CancelToken,
    ) -> Result<Vec<SilenceInterval>> {
        Ok(if pass.noise_threshold_db >= self.needs_db {
            self.silences.clone()
        } else {
            Vec::new()
        })
    }
}

/// Emits the segment start second as the blob.
#[derive(Default)]
struct StubEncoder {
    calls: AtomicUsize,
    fail_at: Option<usize>,
    cancel_after_first: bool,
}

impl SegmentEncoder for StubEncoder {
    fn encode(
        &self,
        _source: &Path,
        range: TimeRange,
        _params: EncodeParams,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<u8>>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(n) {
            return Err(SplitterError::Encoder("lame: broken pipe".into()));
        }
        if self.cancel_after_first {
            cancel.cancel();
        }
        Ok(Some(format!("{:.0}", range.start).into_bytes()))
    }
}

fn silence(start: f64, end: f64) -> SilenceInterval {
    SilenceInterval::new(start, end).unwrap()
}

/// Silent mono audio at 100 Hz, `seconds` long.
fn session(seconds: usize) -> AudioSession {
    let audio = DecodedAudio::new(100, vec![vec![0.0; seconds * 100]]);
    AudioSession::new(Some(PathBuf::from("/music/live set.wav")), audio)
}

fn export(session: &AudioSession, encoder: &StubEncoder) -> Result<ExportOutcome> {
    let exporter = SegmentExporter::new(encoder, EncodeParams::mp3(320));
    exporter.export(
        Path::new("/music/live set.wav"),
        &session.boundaries(),
        &CancelToken::new(),
        |_| {},
    )
}

// ── Tests ──────────────────────────────────────────────────────

#[test]
fn detect_then_export_writes_numbered_tracks() {
    let mut session = session(300);
    let detector = ScriptedDetector {
        needs_db: -45.0,
        silences: vec![silence(95.0, 101.0), silence(199.0, 201.0)],
    };
    let cancel = CancelToken::new();

    let outcome = detect_progressively(2, &cancel, |pass| {
        detector.detect(Path::new("/music/live set.wav"), pass, &cancel)
    })
    .unwrap();
    let DetectionOutcome::Found {
        pass,
        intervals,
        satisfied,
    } = outcome
    else {
        panic!("expected detection to finish");
    };
    assert!(satisfied);
    assert_eq!(pass.noise_threshold_db, -45.0);

    let trim = session.trim_range();
    let points = select_split_points_in_range(3, trim.start, trim.end, &intervals);
    assert_eq!(points, vec![98.0, 200.0]);
    assert_eq!(session.set_split_points(points), 0);
    assert_eq!(session.boundaries(), vec![0.0, 98.0, 200.0, 300.0]);

    let encoder = StubEncoder::default();
    let revision = session.revision();
    let ExportOutcome::Completed(segments) = export(&session, &encoder).unwrap() else {
        panic!("expected export to complete");
    };
    assert_eq!(segments.len(), 3);
    assert!(session.store_export(revision, segments));

    let dir = tempfile::tempdir().unwrap();
    let files = write_segments(
        dir.path(),
        session.base_name(),
        AudioCodec::Mp3,
        session.exported().unwrap(),
    )
    .unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "live set_track1.mp3",
            "live set_track2.mp3",
            "live set_track3.mp3"
        ]
    );
    assert_eq!(std::fs::read(&files[1].path).unwrap(), b"98".to_vec());
}

#[test]
fn selector_without_silence_divides_evenly() {
    assert_eq!(select_split_points(3, 300.0, &[]), vec![100.0, 200.0]);
}

#[test]
fn selector_snaps_to_nearby_silence() {
    let points = select_split_points(3, 300.0, &[silence(96.0, 100.0)]);
    assert_eq!(points, vec![98.0, 200.0]);
}

#[test]
fn selector_respects_trim_range() {
    // Local to the 300 s trimmed window, the silence midpoint sits at 99.
    let points = select_split_points_in_range(3, 50.0, 350.0, &[silence(148.0, 150.0)]);
    assert_eq!(points, vec![149.0, 250.0]);
}

#[test]
fn split_edit_invalidates_stored_export() {
    let mut session = session(120);
    session.set_split_points(vec![40.0, 80.0]);
    let revision = session.revision();

    let ExportOutcome::Completed(segments) = export(&session, &StubEncoder::default()).unwrap()
    else {
        panic!("expected export to complete");
    };
    assert!(session.store_export(revision, segments.clone()));
    assert!(session.exported().is_some());

    session.move_split(0, 42.0);
    assert!(session.exported().is_none());
    // A late result for the old boundaries is dropped.
    assert!(!session.store_export(revision, segments));
    assert!(session.exported().is_none());
}

#[test]
fn trim_change_invalidates_stored_export() {
    let mut session = session(60);
    let revision = session.revision();
    assert!(session.store_export(revision, Vec::new()));
    session.set_trim_start(5.0);
    assert!(session.exported().is_none());
    assert!(session.revision() > revision);
}

#[test]
fn cancel_skips_remaining_segments() {
    let mut session = session(90);
    session.set_split_points(vec![30.0, 60.0]);
    let encoder = StubEncoder {
        cancel_after_first: true,
        ..StubEncoder::default()
    };
    let outcome = export(&session, &encoder).unwrap();
    assert_eq!(outcome, ExportOutcome::Cancelled);
    assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);
    assert!(session.exported().is_none());
}

#[test]
fn encoder_failure_names_the_segment() {
    let mut session = session(90);
    session.set_split_points(vec![30.0, 60.0]);
    let encoder = StubEncoder {
        fail_at: Some(2),
        ..StubEncoder::default()
    };
    match export(&session, &encoder) {
        Err(SplitterError::Export { index, message }) => {
            assert_eq!(index, 2);
            assert!(message.contains("broken pipe"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unsatisfied_detection_keeps_richest_pass() {
    let detector = ScriptedDetector {
        needs_db: -30.0,
        silences: vec![silence(10.0, 12.0)],
    };
    let cancel = CancelToken::new();
    let outcome = detect_progressively(4, &cancel, |pass| {
        detector.detect(Path::new("a.wav"), pass, &cancel)
    })
    .unwrap();
    match outcome {
        DetectionOutcome::Found {
            pass,
            intervals,
            satisfied,
        } => {
            assert!(!satisfied);
            assert_eq!(intervals.len(), 1);
            assert_eq!(pass.noise_threshold_db, -30.0);
        }
        DetectionOutcome::Cancelled => panic!("not cancelled"),
    }
}

#[test]
fn detection_cancelled_mid_pass_reports_nothing() {
    let detector = ScriptedDetector {
        needs_db: -60.0,
        silences: vec![silence(10.0, 12.0), silence(40.0, 41.0)],
    };
    let cancel = CancelToken::new();
    let outcome = detect_progressively(2, &cancel, |pass| {
        let found = detector.detect(Path::new("a.wav"), pass, &cancel);
        cancel.cancel();
        found
    })
    .unwrap();
    assert_eq!(outcome, DetectionOutcome::Cancelled);
}
