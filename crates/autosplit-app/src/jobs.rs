//! Background jobs: silence detection and export.
//!
//! Each job runs on its own worker thread and reports back over a
//! crossbeam channel that the UI drains once per frame. The session itself
//! never leaves the UI thread; jobs get copies of what they need.

use autosplit_core::{
    detect_progressively, select_split_points_in_range, CancelToken, DetectionOutcome,
    DetectionPass, Result, SplitterError, TimeRange,
};
use autosplit_media::{
    EncodeParams, ExportOutcome, ExportProgress, SegmentEncoder, SegmentExporter, SilenceDetector,
};
use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Detect,
    Export,
}

impl JobKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Detect => "Detecting silence",
            Self::Export => "Exporting",
        }
    }
}

/// Split points chosen from one detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    pub split_points: Vec<f64>,
    pub pass: DetectionPass,
    pub silences_found: usize,
    /// False when even the loosest pass found fewer silences than splits.
    pub satisfied: bool,
}

#[derive(Debug)]
pub enum JobMessage {
    Detected(Option<DetectionReport>),
    ExportProgress(ExportProgress),
    Exported {
        revision: u64,
        outcome: ExportOutcome,
    },
    Failed {
        kind: JobKind,
        error: SplitterError,
    },
}

/// A running job. Dropping it detaches the worker.
pub struct JobHandle {
    kind: JobKind,
    cancel: CancelToken,
    rx: Receiver<JobMessage>,
    thread: Option<JoinHandle<()>>,
    progress: Option<ExportProgress>,
}

impl JobHandle {
    fn spawn<F>(kind: JobKind, work: F) -> Result<Self>
    where
        F: FnOnce(&CancelToken, &Sender<JobMessage>) + Send + 'static,
    {
        let cancel = CancelToken::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let token = cancel.clone();
        let thread = std::thread::Builder::new()
            .name(format!("autosplit-{kind:?}").to_lowercase())
            .spawn(move || work(&token, &tx))?;
        Ok(Self {
            kind,
            cancel,
            rx,
            thread: Some(thread),
            progress: None,
        })
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn cancel(&self) {
        info!(job = ?self.kind, "Cancel requested");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Latest export progress seen by [`JobHandle::poll`].
    pub fn progress(&self) -> Option<ExportProgress> {
        self.progress
    }

    /// Drain pending messages. The second value is true once the worker
    /// has exited.
    pub fn poll(&mut self) -> (Vec<JobMessage>, bool) {
        let messages: Vec<JobMessage> = self.rx.try_iter().collect();
        for message in &messages {
            if let JobMessage::ExportProgress(p) = message {
                self.progress = Some(*p);
            }
        }

        let finished = self.thread.as_ref().map_or(true, JoinHandle::is_finished);
        if finished {
            if let Some(thread) = self.thread.take() {
                if thread.join().is_err() {
                    error!(job = ?self.kind, "Worker thread panicked");
                }
            }
            // Anything sent between the drain and the exit.
            let mut messages = messages;
            messages.extend(self.rx.try_iter());
            return (messages, true);
        }
        (messages, false)
    }
}

/// Start detection for `track_count` tracks inside `trim`.
pub fn spawn_detection<D>(
    detector: D,
    source: PathBuf,
    track_count: usize,
    trim: TimeRange,
) -> Result<JobHandle>
where
    D: SilenceDetector + Send + 'static,
{
    JobHandle::spawn(JobKind::Detect, move |cancel, tx| {
        let message = match run_detection(&detector, &source, track_count, trim, cancel) {
            Ok(report) => JobMessage::Detected(report),
            Err(error) => JobMessage::Failed {
                kind: JobKind::Detect,
                error,
            },
        };
        // The receiver is gone when the app closed mid-job.
        let _ = tx.send(message);
    })
}

/// Run the detection ladder and pick split points. `Ok(None)` when
/// cancelled.
pub fn run_detection<D: SilenceDetector + ?Sized>(
    detector: &D,
    source: &Path,
    track_count: usize,
    trim: TimeRange,
    cancel: &CancelToken,
) -> Result<Option<DetectionReport>> {
    // One track has no split points; detection would only wipe manual ones.
    if track_count < 2 {
        return Err(SplitterError::InvalidParameter(
            "Track count must be at least 2".into(),
        ));
    }
    let num_splits = track_count - 1;
    info!(source = %source.display(), track_count, "Starting silence detection");

    let outcome = detect_progressively(num_splits, cancel, |pass| {
        detector.detect(source, pass, cancel)
    })?;

    match outcome {
        DetectionOutcome::Cancelled => Ok(None),
        DetectionOutcome::Found {
            pass,
            intervals,
            satisfied,
        } => {
            let split_points =
                select_split_points_in_range(track_count, trim.start, trim.end, &intervals);
            info!(
                splits = split_points.len(),
                silences = intervals.len(),
                threshold_db = pass.noise_threshold_db,
                min_duration = pass.min_duration,
                "Detection finished"
            );
            Ok(Some(DetectionReport {
                split_points,
                pass,
                silences_found: intervals.len(),
                satisfied,
            }))
        }
    }
}

/// Start an export of `boundaries` captured at session `revision`.
pub fn spawn_export<E>(
    encoder: E,
    source: PathBuf,
    boundaries: Vec<f64>,
    params: EncodeParams,
    revision: u64,
) -> Result<JobHandle>
where
    E: SegmentEncoder + Send + 'static,
{
    JobHandle::spawn(JobKind::Export, move |cancel, tx| {
        let exporter = SegmentExporter::new(&encoder, params);
        let result = exporter.export(&source, &boundaries, cancel, |progress| {
            let _ = tx.send(JobMessage::ExportProgress(progress));
        });
        let message = match result {
            Ok(outcome) => JobMessage::Exported { revision, outcome },
            Err(error) => JobMessage::Failed {
                kind: JobKind::Export,
                error,
            },
        };
        let _ = tx.send(message);
    })
}
