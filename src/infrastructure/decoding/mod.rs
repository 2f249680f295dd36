//! Decoding infrastructure module

mod opus;
mod symphonia;

pub use self::symphonia::SymphoniaDecoder;
