//! Opus track decoding
//!
//! symphonia demuxes Opus out of WebM and Ogg but ships no Opus codec, so
//! the track's packets are handed to libopus instead.

use audiopus::coder::Decoder;
use audiopus::packet::Packet;
use audiopus::{Channels, MutSignals, SampleRate};
use symphonia::core::codecs::CodecParameters;
use symphonia::core::formats::FormatReader;

use crate::application::ports::DecodeError;
use crate::domain::audio::SampleMatrix;

use super::symphonia::next_track_packet;

/// Opus always decodes at 48 kHz
pub const OPUS_SAMPLE_RATE: u32 = 48_000;

/// Longest Opus packet: 120 ms at 48 kHz
const MAX_FRAME_SIZE: usize = 5760;

/// The `OpusHead` identification header, as carried in the track's codec data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusHead {
    pub channels: u8,
    /// Decoder warm-up samples to drop from the start of the output
    pub pre_skip: u16,
}

impl OpusHead {
    const MAGIC: &'static [u8] = b"OpusHead";
    const MIN_LEN: usize = 19;

    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN || !data.starts_with(Self::MAGIC) {
            return None;
        }
        Some(Self {
            channels: data[9],
            pre_skip: u16::from_le_bytes([data[10], data[11]]),
        })
    }
}

fn channel_count(params: &CodecParameters, head: Option<OpusHead>) -> Option<usize> {
    head.map(|h| usize::from(h.channels))
        .or_else(|| params.channels.map(|c| c.count()))
        .or_else(|| params.channel_layout.map(|l| l.into_channels().count()))
}

/// Decode every packet of the Opus track `track_id`.
pub(super) fn decode_track(
    format: &mut dyn FormatReader,
    track_id: u32,
    params: &CodecParameters,
) -> Result<SampleMatrix, DecodeError> {
    let head = params.extra_data.as_deref().and_then(OpusHead::parse);
    let channel_count = channel_count(params, head).ok_or_else(|| {
        DecodeError::InvalidContainer("Opus track has no channel count".to_string())
    })?;
    let channels = match channel_count {
        1 => Channels::Mono,
        2 => Channels::Stereo,
        n => return Err(DecodeError::UnsupportedCodec(format!("Opus with {n} channels"))),
    };
    let pre_skip = head.map_or(0, |h| usize::from(h.pre_skip));

    let mut decoder = Decoder::new(SampleRate::Hz48000, channels)
        .map_err(|e| DecodeError::CorruptData(e.to_string()))?;
    let mut frame = vec![0f32; MAX_FRAME_SIZE * channel_count];
    let mut samples: Vec<f32> = Vec::new();
    let mut decoded_packets = 0usize;
    let mut skipped = 0usize;

    while let Some(packet) = next_track_packet(format, track_id)? {
        let decoded = Packet::try_from(packet.buf()).and_then(|input| {
            let output = MutSignals::try_from(&mut frame[..])?;
            decoder.decode_float(Some(input), output, false)
        });

        match decoded {
            Ok(frames) => {
                samples.extend_from_slice(&frame[..frames * channel_count]);
                decoded_packets += 1;
            }
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable Opus packet");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        if decoded_packets == 0 {
            return Err(DecodeError::CorruptData(
                "no Opus packets could be decoded".to_string(),
            ));
        }
        tracing::warn!(skipped, "some Opus packets could not be decoded");
    }

    let warm_up = (pre_skip * channel_count).min(samples.len());
    samples.drain(..warm_up);

    tracing::debug!(
        packets = decoded_packets,
        channels = channel_count,
        pre_skip,
        "decoded Opus track"
    );
    SampleMatrix::from_interleaved(OPUS_SAMPLE_RATE, channel_count, &samples)
        .map_err(|e| DecodeError::InvalidLayout(e.to_string()))
}
