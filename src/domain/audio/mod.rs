//! Audio domain module: decoded samples and the WAV container

mod container;
mod sample_matrix;
pub mod wav;

pub use container::{format_size, AudioMimeType, EncodedContainer};
pub use sample_matrix::{SampleMatrix, BYTES_PER_SAMPLE, MAX_CHANNELS};
