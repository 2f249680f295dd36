//! Symphonia decoder adapter
//!
//! Probes the assembled recording, decodes the first audio track into
//! interleaved `f32` samples and splits them into a `SampleMatrix`.

use std::io::Cursor;

use async_trait::async_trait;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL, CODEC_TYPE_OPUS};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioDecoder, DecodeError};
use crate::domain::audio::{AudioMimeType, SampleMatrix};

use super::opus;

/// Compressed-audio decoder backed by symphonia, with Opus tracks handed to
/// libopus
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }

    fn probe_hint(mime_type: AudioMimeType) -> Hint {
        let mut hint = Hint::new();
        hint.mime_type(mime_type.as_str());
        hint.with_extension(mime_type.extension());
        hint
    }

    /// Blocking decode of a complete container
    fn decode_blocking(data: Vec<u8>, hint: Hint) -> Result<SampleMatrix, DecodeError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::InvalidContainer(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::InvalidContainer("no audio track found".to_string()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        if params.codec == CODEC_TYPE_OPUS {
            return opus::decode_track(format.as_mut(), track_id, &params);
        }

        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| match e {
                SymphoniaError::Unsupported(what) => DecodeError::UnsupportedCodec(what.to_string()),
                other => DecodeError::CorruptData(other.to_string()),
            })?;

        let mut spec: Option<SignalSpec> = None;
        let mut samples: Vec<f32> = Vec::new();
        let mut skipped = 0usize;

        while let Some(packet) = next_track_packet(format.as_mut(), track_id)? {
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(reason)) => {
                    tracing::debug!(reason, "skipping undecodable packet");
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(DecodeError::CorruptData(e.to_string())),
            };

            let packet_spec = *decoded.spec();
            match spec {
                None => spec = Some(packet_spec),
                Some(first) if first != packet_spec => {
                    return Err(DecodeError::InvalidLayout(format!(
                        "stream changed from {} Hz x {} channels to {} Hz x {} channels",
                        first.rate,
                        first.channels.count(),
                        packet_spec.rate,
                        packet_spec.channels.count()
                    )));
                }
                Some(_) => {}
            }

            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, packet_spec);
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }

        if skipped > 0 {
            tracing::warn!(skipped, "some packets could not be decoded");
        }

        let (sample_rate, channel_count) = match spec {
            Some(spec) => (spec.rate, spec.channels.count()),
            None => {
                let rate = params.sample_rate;
                let channels = params.channels.map(|c| c.count());
                match (rate, channels) {
                    (Some(rate), Some(channels)) if skipped == 0 => (rate, channels),
                    _ => {
                        return Err(DecodeError::CorruptData(
                            "no audio frames could be decoded".to_string(),
                        ))
                    }
                }
            }
        };

        SampleMatrix::from_interleaved(sample_rate, channel_count, &samples)
            .map_err(|e| DecodeError::InvalidLayout(e.to_string()))
    }
}

/// Next packet belonging to `track_id`, or `None` at the end of the data.
pub(super) fn next_track_packet(
    format: &mut dyn FormatReader,
    track_id: u32,
) -> Result<Option<Packet>, DecodeError> {
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => return Ok(Some(packet)),
            Ok(_) => continue,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None)
            }
            Err(SymphoniaError::ResetRequired) => return Ok(None),
            Err(e) => return Err(DecodeError::CorruptData(e.to_string())),
        }
    }
}

#[async_trait]
impl AudioDecoder for SymphoniaDecoder {
    async fn decode(
        &self,
        data: &[u8],
        mime_type: AudioMimeType,
    ) -> Result<SampleMatrix, DecodeError> {
        if data.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let owned = data.to_vec();
        let hint = Self::probe_hint(mime_type);
        let matrix = tokio::task::spawn_blocking(move || Self::decode_blocking(owned, hint))
            .await
            .map_err(|e| DecodeError::CorruptData(format!("decoder task failed: {e}")))??;

        tracing::debug!(
            %mime_type,
            sample_rate = matrix.sample_rate(),
            channels = matrix.channel_count(),
            frames = matrix.frame_count(),
            "decoded recording"
        );
        Ok(matrix)
    }
}
