//! Decoded sample matrix value object

use crate::domain::error::SampleMatrixError;

/// Bytes per encoded sample (16-bit PCM)
pub const BYTES_PER_SAMPLE: usize = 2;

/// Most channels whose block align (channels * 2) still fits a u16
pub const MAX_CHANNELS: usize = u16::MAX as usize / BYTES_PER_SAMPLE;

/// Largest payload that still lets the RIFF chunk size (36 + data) fit in a u32
const MAX_DATA_BYTES: u64 = u32::MAX as u64 - 36;

/// Planar floating-point audio: one sample sequence per channel, all the same length.
///
/// Produced by a decoder and consumed by the WAV encoder. Samples are nominally
/// in `[-1.0, 1.0]`; out-of-range values are kept as-is and clamped at encode time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    sample_rate: u32,
    frame_count: usize,
    channels: Vec<Vec<f32>>,
}

impl SampleMatrix {
    /// Build a matrix from planar channel data.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, SampleMatrixError> {
        if channels.is_empty() {
            return Err(SampleMatrixError::NoChannels);
        }
        if channels.len() > MAX_CHANNELS {
            return Err(SampleMatrixError::TooManyChannels(channels.len()));
        }
        if sample_rate == 0 {
            return Err(SampleMatrixError::ZeroSampleRate);
        }

        let block_align = channels.len() as u64 * BYTES_PER_SAMPLE as u64;
        if sample_rate as u64 * block_align > u32::MAX as u64 {
            return Err(SampleMatrixError::ByteRateOverflow {
                sample_rate,
                channels: channels.len(),
            });
        }

        let frame_count = channels[0].len();
        if let Some((channel, data)) = channels
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != frame_count)
        {
            return Err(SampleMatrixError::RaggedChannels {
                channel,
                expected: frame_count,
                actual: data.len(),
            });
        }

        let data_bytes = (frame_count as u64)
            .checked_mul(block_align)
            .filter(|bytes| *bytes <= MAX_DATA_BYTES);
        if data_bytes.is_none() {
            return Err(SampleMatrixError::TooLarge {
                frames: frame_count,
                channels: channels.len(),
            });
        }

        Ok(Self {
            sample_rate,
            frame_count,
            channels,
        })
    }

    /// Build a matrix from interleaved samples (L, R, L, R, ...).
    pub fn from_interleaved(
        sample_rate: u32,
        channel_count: usize,
        samples: &[f32],
    ) -> Result<Self, SampleMatrixError> {
        if channel_count == 0 {
            return Err(SampleMatrixError::NoChannels);
        }
        if samples.len() % channel_count != 0 {
            return Err(SampleMatrixError::PartialFrame {
                len: samples.len(),
                channels: channel_count,
            });
        }

        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (plane, &sample) in channels.iter_mut().zip(frame) {
                plane.push(sample);
            }
        }

        Self::new(sample_rate, channels)
    }

    /// A matrix of `frame_count` zero samples on every channel.
    pub fn silence(
        sample_rate: u32,
        channel_count: usize,
        frame_count: usize,
    ) -> Result<Self, SampleMatrixError> {
        Self::new(sample_rate, vec![vec![0.0; frame_count]; channel_count])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (at most `MAX_CHANNELS`, checked on construction)
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Samples of one channel, or `None` if out of range
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Size of the 16-bit PCM payload this matrix encodes to
    pub fn pcm_data_len(&self) -> usize {
        self.frame_count * self.channels.len() * BYTES_PER_SAMPLE
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// Iterate frames in order, yielding one sample per channel for each.
    pub(crate) fn interleaved(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.frame_count)
            .flat_map(move |frame| self.channels.iter().map(move |plane| plane[frame]))
    }
}
