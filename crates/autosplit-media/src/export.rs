//! Export pipeline: encode every segment of a session, then write track files.
//!
//! Segments are encoded strictly one after another. Progress is reported per
//! segment, and the cancel token is checked before each one.

use crate::encode::{AudioCodec, EncodeParams, SegmentEncoder};
use autosplit_core::segment::is_strictly_increasing;
use autosplit_core::{CancelToken, ExportedSegment, Result, SplitterError, TimeRange};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Export progress information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    /// Segments finished so far.
    pub completed: usize,
    /// Segments in the batch.
    pub total: usize,
}

impl ExportProgress {
    /// Completion fraction (0.0 to 1.0).
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f32 / self.total as f32
    }
}

/// How an export batch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Completed(Vec<ExportedSegment>),
    /// Remaining segments were skipped and produced blobs discarded.
    Cancelled,
}

/// Encodes consecutive boundary pairs with one encoder.
pub struct SegmentExporter<'a, E: SegmentEncoder + ?Sized> {
    encoder: &'a E,
    params: EncodeParams,
}

impl<'a, E: SegmentEncoder + ?Sized> SegmentExporter<'a, E> {
    pub fn new(encoder: &'a E, params: EncodeParams) -> Self {
        Self { encoder, params }
    }

    pub fn params(&self) -> EncodeParams {
        self.params
    }

    /// Encode `[boundaries[i], boundaries[i + 1])` for every `i`.
    ///
    /// The first failing segment aborts the batch with
    /// [`SplitterError::Export`].
    pub fn export(
        &self,
        source: &Path,
        boundaries: &[f64],
        cancel: &CancelToken,
        mut on_progress: impl FnMut(ExportProgress),
    ) -> Result<ExportOutcome> {
        if boundaries.len() < 2 || !is_strictly_increasing(boundaries) {
            return Err(SplitterError::InvalidParameter(format!(
                "Export boundaries must be strictly increasing, got {boundaries:?}"
            )));
        }

        let total = boundaries.len() - 1;
        info!(
            source = %source.display(),
            segments = total,
            codec = self.params.codec.label(),
            "Starting export"
        );
        on_progress(ExportProgress {
            completed: 0,
            total,
        });

        let mut segments = Vec::with_capacity(total);
        for (index, pair) in boundaries.windows(2).enumerate() {
            if cancel.is_cancelled() {
                info!(completed = index, total, "Export cancelled");
                return Ok(ExportOutcome::Cancelled);
            }

            let range = TimeRange::new(pair[0], pair[1]);
            let blob = match self.encoder.encode(source, range, self.params, cancel) {
                Ok(Some(blob)) => blob,
                Ok(None) => {
                    info!(completed = index, total, "Export cancelled");
                    return Ok(ExportOutcome::Cancelled);
                }
                Err(e) => {
                    return Err(SplitterError::Export {
                        index,
                        message: e.to_string(),
                    })
                }
            };
            debug!(index, start = range.start, end = range.end, bytes = blob.len(), "Segment encoded");

            segments.push(ExportedSegment {
                index,
                start_time: range.start,
                end_time: range.end,
                blob,
            });
            on_progress(ExportProgress {
                completed: index + 1,
                total,
            });
        }

        info!(segments = segments.len(), "Export finished");
        Ok(ExportOutcome::Completed(segments))
    }
}

// ── Track files ─────────────────────────────────────────────────

/// A track written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFile {
    /// Zero-based track index.
    pub index: usize,
    pub path: PathBuf,
    pub bytes: usize,
}

/// `<base>_track<N>.<ext>` with a one-based `N`.
pub fn track_file_name(base_name: &str, index: usize, codec: AudioCodec) -> String {
    format!("{base_name}_track{}.{}", index + 1, codec.extension())
}

/// Write every segment into `dir`, creating it if needed.
pub fn write_segments(
    dir: &Path,
    base_name: &str,
    codec: AudioCodec,
    segments: &[ExportedSegment],
) -> Result<Vec<TrackFile>> {
    std::fs::create_dir_all(dir)?;

    let files = segments
        .iter()
        .map(|segment| {
            let path = dir.join(track_file_name(base_name, segment.index, codec));
            std::fs::write(&path, &segment.blob)?;
            Ok(TrackFile {
                index: segment.index,
                path,
                bytes: segment.blob.len(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(dir = %dir.display(), files = files.len(), "Wrote track files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Encodes each range as its start/end text; fails on `fail_at`.
    struct FakeEncoder {
        fail_at: Option<usize>,
        cancel_after: Option<usize>,
        calls: RefCell<Vec<TimeRange>>,
    }

    impl FakeEncoder {
        fn new() -> Self {
            Self {
                fail_at: None,
                cancel_after: None,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SegmentEncoder for FakeEncoder {
        fn encode(
            &self,
            _source: &Path,
            range: TimeRange,
            _params: EncodeParams,
            cancel: &CancelToken,
        ) -> Result<Option<Vec<u8>>> {
            let n = {
                let mut calls = self.calls.borrow_mut();
                calls.push(range);
                calls.len() - 1
            };
            if self.fail_at == Some(n) {
                return Err(SplitterError::Encoder("disk full".into()));
            }
            if self.cancel_after == Some(n) {
                cancel.cancel();
            }
            Ok(Some(format!("{}-{}", range.start, range.end).into_bytes()))
        }
    }

    #[test]
    fn test_export_all_segments() {
        let encoder = FakeEncoder::new();
        let exporter = SegmentExporter::new(&encoder, EncodeParams::default());
        let mut progress = Vec::new();
        let outcome = exporter
            .export(
                Path::new("in.wav"),
                &[0.0, 10.0, 25.0, 40.0],
                &CancelToken::new(),
                |p| progress.push(p.completed),
            )
            .unwrap();

        let ExportOutcome::Completed(segments) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].start_time, 10.0);
        assert_eq!(segments[1].end_time, 25.0);
        assert_eq!(segments[2].blob, b"25-40".to_vec());
        assert_eq!(progress, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cancel_before_next_segment() {
        let mut encoder = FakeEncoder::new();
        encoder.cancel_after = Some(0);
        let exporter = SegmentExporter::new(&encoder, EncodeParams::flac());
        let outcome = exporter
            .export(Path::new("in.wav"), &[0.0, 1.0, 2.0, 3.0], &CancelToken::new(), |_| {})
            .unwrap();
        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert_eq!(encoder.calls.borrow().len(), 1);
    }

    #[test]
    fn test_failure_aborts_batch() {
        let mut encoder = FakeEncoder::new();
        encoder.fail_at = Some(1);
        let exporter = SegmentExporter::new(&encoder, EncodeParams::default());
        let err = exporter
            .export(Path::new("in.wav"), &[0.0, 1.0, 2.0, 3.0], &CancelToken::new(), |_| {})
            .unwrap_err();
        match err {
            SplitterError::Export { index, message } => {
                assert_eq!(index, 1);
                assert!(message.contains("disk full"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(encoder.calls.borrow().len(), 2);
    }

    #[test]
    fn test_rejects_bad_boundaries() {
        let encoder = FakeEncoder::new();
        let exporter = SegmentExporter::new(&encoder, EncodeParams::default());
        for bad in [&[5.0][..], &[0.0, 3.0, 3.0][..], &[0.0, 4.0, 2.0][..]] {
            let result = exporter.export(Path::new("in.wav"), bad, &CancelToken::new(), |_| {});
            assert!(matches!(result, Err(SplitterError::InvalidParameter(_))));
        }
        assert!(encoder.calls.borrow().is_empty());
    }

    #[test]
    fn test_track_file_name() {
        assert_eq!(track_file_name("live set", 0, AudioCodec::Mp3), "live set_track1.mp3");
        assert_eq!(track_file_name("a", 9, AudioCodec::Flac), "a_track10.flac");
    }

    #[test]
    fn test_write_segments() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tracks");
        let segments = vec![
            ExportedSegment {
                index: 0,
                start_time: 0.0,
                end_time: 1.0,
                blob: vec![1, 2, 3],
            },
            ExportedSegment {
                index: 1,
                start_time: 1.0,
                end_time: 2.0,
                blob: vec![4],
            },
        ];
        let files = write_segments(&out, "show", AudioCodec::Flac, &segments).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].path, out.join("show_track2.flac"));
        assert_eq!(std::fs::read(&files[0].path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_progress_fraction() {
        let progress = ExportProgress {
            completed: 1,
            total: 4,
        };
        assert!((progress.fraction() - 0.25).abs() < 0.001);
    }
}
