//! Whole-file audio decoding with symphonia.
//!
//! The splitter needs every sample up front for the waveform, so files are
//! decoded completely into planar f32 channels.

use autosplit_core::{DecodedAudio, Result, SplitterError};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

/// Decode an audio file from disk.
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SplitterError::NotFound(format!("File not found: {}", path.display()))
        } else {
            SplitterError::Io(e)
        }
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    info!(path = %path.display(), "Decoding audio file");
    decode_stream(mss, &hint)
}

/// Decode an in-memory audio buffer. `extension` helps format probing.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio> {
    if bytes.is_empty() {
        return Err(SplitterError::Decode("Empty audio buffer".into()));
    }
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }
    decode_stream(mss, &hint)
}

fn decode_stream(mss: MediaSourceStream, hint: &Hint) -> Result<DecodedAudio> {
    let probed = symphonia::default::get_probe()
        .format(
            hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SplitterError::Decode(format!("Unsupported or unreadable audio: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SplitterError::Decode("No audio track found".into()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| SplitterError::Decode("Unknown sample rate".into()))?;
    let mut channel_count = codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| SplitterError::Decode(format!("Unsupported codec: {e}")))?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(SplitterError::Decode(format!("Failed to read packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    channel_count = spec.channels.count();
                    sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = &mut sample_buf {
                    buf.copy_interleaved_ref(decoded);
                    interleaved.extend_from_slice(buf.samples());
                }
            }
            // Corrupt packets are skipped; the rest of the stream is usable.
            Err(SymphoniaError::DecodeError(_)) => skipped_packets += 1,
            Err(e) => return Err(SplitterError::Decode(format!("Decoder failed: {e}"))),
        }
    }

    if channel_count == 0 || interleaved.is_empty() {
        return Err(SplitterError::Decode("File contains no audio samples".into()));
    }
    if skipped_packets > 0 {
        debug!(skipped_packets, "Skipped undecodable packets");
    }

    let audio = DecodedAudio::from_interleaved(sample_rate, channel_count, &interleaved);
    info!(
        sample_rate,
        channels = channel_count,
        duration = audio.duration(),
        "Audio decoded"
    );
    Ok(audio)
}
