//! 16-bit PCM WAV container encoder
//!
//! Produces the canonical 44-byte RIFF header followed by interleaved
//! little-endian samples:
//!
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    36 + data_size
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16
//! [20-21]  1 (linear PCM)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  sample_rate * channels * 2
//! [32-33]  channels * 2
//! [34-35]  16
//! [36-39]  "data"
//! [40-43]  frames * channels * 2
//! [44..]   samples, frame by frame, channel by channel
//! ```

use super::container::EncodedContainer;
use super::sample_matrix::{SampleMatrix, BYTES_PER_SAMPLE};

/// Size of the WAV header in bytes
pub const WAV_HEADER_SIZE: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Encode a decoded recording as a 16-bit PCM WAV file.
///
/// Never fails: every bound that could overflow a header field is checked
/// when the `SampleMatrix` is built.
pub fn encode(matrix: SampleMatrix) -> EncodedContainer {
    let data_size = matrix.pcm_data_len();
    let mut bytes = Vec::with_capacity(WAV_HEADER_SIZE + data_size);

    bytes.extend_from_slice(&header(
        matrix.sample_rate(),
        matrix.channel_count(),
        data_size as u32,
    ));
    for sample in matrix.interleaved() {
        bytes.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    EncodedContainer::new(
        bytes,
        matrix.sample_rate(),
        matrix.channel_count(),
        matrix.frame_count(),
    )
}

/// Build the 44-byte header for the given format and payload size.
pub fn header(sample_rate: u32, channels: u16, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let block_align = channels * BYTES_PER_SAMPLE as u16;
    let byte_rate = sample_rate * block_align as u32;

    let mut header = [0u8; WAV_HEADER_SIZE];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    header[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Map a float sample to signed 16-bit PCM.
///
/// Clamps to `[-1.0, 1.0]`, scales negatives by 32768 and the rest by 32767,
/// then truncates toward zero. Scaling runs in `f64` so the product is
/// exact before truncation. NaN maps to silence.
pub fn quantize(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = f64::from(sample).clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn i16_at(bytes: &[u8], offset: usize) -> i16 {
        i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn empty_recording_is_header_only() {
        let container = encode(SampleMatrix::silence(44100, 2, 0).unwrap());
        let bytes = container.bytes();

        assert_eq!(bytes.len(), WAV_HEADER_SIZE);
        assert_eq!(u32_at(bytes, 4), 36);
        assert_eq!(u32_at(bytes, 40), 0);
    }

    #[test]
    fn header_magic_and_format() {
        let container = encode(SampleMatrix::silence(8000, 1, 3).unwrap());
        let bytes = container.bytes();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(bytes, 16), 16);
        assert_eq!(u16_at(bytes, 20), 1);
        assert_eq!(u16_at(bytes, 34), 16);
    }

    #[test]
    fn stereo_44k_header_fields() {
        let container = encode(SampleMatrix::silence(44100, 2, 4).unwrap());
        let bytes = container.bytes();

        assert_eq!(bytes.len(), 60);
        assert_eq!(u16_at(bytes, 22), 2);
        assert_eq!(u32_at(bytes, 24), 44100);
        assert_eq!(u32_at(bytes, 28), 176400);
        assert_eq!(u16_at(bytes, 32), 4);
        assert_eq!(u32_at(bytes, 40), 16);
        assert_eq!(u32_at(bytes, 4), 52);
        assert!(bytes[44..].iter().all(|&b| b == 0));
    }

    #[test]
    fn length_matches_frames_and_channels() {
        for (channels, frames) in [(1usize, 1usize), (1, 441), (2, 7), (6, 100)] {
            let container = encode(SampleMatrix::silence(48000, channels, frames).unwrap());
            assert_eq!(container.size_bytes(), 44 + frames * channels * 2);
        }
    }

    #[test]
    fn full_scale_values() {
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32768);
        assert_eq!(quantize(0.0), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(quantize(1.5), 32767);
        assert_eq!(quantize(f32::INFINITY), 32767);
        assert_eq!(quantize(-3.0), -32768);
        assert_eq!(quantize(f32::NEG_INFINITY), -32768);
    }

    #[test]
    fn fractional_values_truncate_toward_zero() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(quantize(0.5), 16383);
        assert_eq!(quantize(-0.5), -16384);
        // 0.25 * 32768 = 8192 exactly; -0.25 stays exact on the negative side
        assert_eq!(quantize(-0.25), -8192);
    }

    #[test]
    fn values_just_below_a_step_truncate_down() {
        // f32 multiplication would round this product up to exactly 1.0
        assert_eq!(quantize(3.051851e-5_f32), 0);

        let below_first_step = f32::from_bits((1.0_f32 / 32767.0).to_bits() - 1);
        assert_eq!(quantize(below_first_step), 0);
    }

    #[test]
    fn nan_is_silence() {
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn samples_are_interleaved_per_frame() {
        let matrix = SampleMatrix::new(8000, vec![vec![1.0, 0.0], vec![-1.0, 0.5]]).unwrap();
        let container = encode(matrix);
        let bytes = container.bytes();

        assert_eq!(i16_at(bytes, 44), 32767);
        assert_eq!(i16_at(bytes, 46), -32768);
        assert_eq!(i16_at(bytes, 48), 0);
        assert_eq!(i16_at(bytes, 50), 16383);
    }

    #[test]
    fn container_metadata_follows_matrix() {
        let container = encode(SampleMatrix::silence(22050, 1, 22050).unwrap());
        assert_eq!(container.sample_rate(), 22050);
        assert_eq!(container.channel_count(), 1);
        assert_eq!(container.frame_count(), 22050);
        assert_eq!(container.rounded_duration_secs(), 1);
    }

    #[test]
    fn encoding_is_deterministic() {
        let matrix = SampleMatrix::new(16000, vec![vec![0.1, -0.7, 0.33]]).unwrap();
        assert_eq!(encode(matrix.clone()), encode(matrix));
    }
}
