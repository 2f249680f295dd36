//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, OutputSink, DEFAULT_CHUNK_SIZE};
