//! MuteOne - capture compressed audio and keep it as a WAV file
//!
//! This crate records a live stream of compressed audio chunks, decodes the
//! finished recording and re-encodes it as a canonical 16-bit PCM WAV file
//! that is saved locally or uploaded.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Capture state machine, sample matrix, WAV encoder and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (stdin/file capture, symphonia, HTTP upload, etc.)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
