//! Main app runner for a capture run

use std::env;
use std::process::ExitCode;

use crate::application::ports::{AudioMonitor, CaptureRequest, ConfigStore};
use crate::application::{
    CaptureCallbacks, CaptureInput, CaptureUseCase, DispatchError, DispatchOutcome,
    OutputDispatcher, RecordingError, StopReason,
};
use crate::domain::audio::EncodedContainer;
use crate::domain::capture::{CaptureDuration, StreamHandle};
use crate::domain::config::{AppConfig, OutputSink};
use crate::domain::error::DurationParseError;
use crate::infrastructure::{
    HttpUploader, LocalFileSaver, ReaderStreamSource, RodioMonitor, SymphoniaDecoder,
    XdgConfigStore,
};

use super::args::{CaptureOptions, Cli};
use super::presenter::{format_capture_progress, Presenter};
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the configured upload endpoint
pub const UPLOAD_URL_ENV: &str = "MUTEONE_UPLOAD_URL";

/// Run one capture: record, convert and hand the WAV to the chosen sink
pub async fn run_capture(options: CaptureOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let source = ReaderStreamSource::new(options.chunk_size);
    let use_case = CaptureUseCase::new(source, SymphoniaDecoder::new());

    let shutdown = ShutdownSignal::new();
    shutdown.setup(use_case.stop_handle());

    presenter.start_spinner("Capturing audio...");
    let callbacks = {
        let on_start = presenter.spinner();
        let on_chunk = presenter.spinner();
        let on_processing = presenter.spinner();
        let recording = shutdown.clone();
        CaptureCallbacks {
            on_capture_start: Some(Box::new(move |handle: &StreamHandle| {
                if let Some(bar) = &on_start {
                    bar.set_message(format!("Capturing audio from {}...", handle.label()));
                }
            })),
            on_chunk: Some(Box::new(move |chunks, bytes| {
                if let Some(bar) = &on_chunk {
                    bar.set_message(format_capture_progress(chunks, bytes));
                }
            })),
            on_processing_start: Some(Box::new(move |reason: StopReason| {
                recording.end_recording();
                tracing::info!(?reason, "capture stopped");
                if let Some(bar) = &on_processing {
                    bar.set_message("Stopped. Processing file...");
                }
            })),
        }
    };

    let input = CaptureInput {
        request: CaptureRequest::new(options.input.clone()),
        limit: options.limit,
    };

    let result = tokio::select! {
        result = use_case.execute(input, callbacks) => result,
        _ = shutdown.aborted() => {
            presenter.stop_spinner();
            presenter.error("Interrupted.");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    shutdown.end_recording();

    let output = match result {
        Ok(output) => output,
        Err(RecordingError::CaptureUnavailable) => {
            presenter.stop_spinner();
            presenter.error("Error: could not capture audio.");
            presenter.info(&format!("No audio stream available from '{}'", options.input));
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            presenter.stop_spinner();
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.stop_spinner();
    presenter.success(&format!(
        "Recorded {} ({}s, {} chunks)",
        output.container.human_readable_size(),
        output.container.rounded_duration_secs(),
        output.chunk_count
    ));

    if options.monitor {
        presenter.info("Playing recording... (Ctrl+C to abort)");
        let monitor = RodioMonitor::new();
        tokio::select! {
            result = monitor.play(&output.container) => {
                if let Err(e) = result {
                    presenter.warn(&format!("Could not play recording: {}", e));
                }
            }
            _ = shutdown.aborted() => {
                presenter.error("Interrupted.");
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let mut dispatcher = OutputDispatcher::new(
        LocalFileSaver::new(&options.output_dir),
        HttpUploader::from_url(options.upload_url.as_deref()),
    );
    if let Some(template) = &options.follow_up_url {
        dispatcher = dispatcher.with_follow_up(template.clone());
    }

    let controller = use_case.controller();
    match options.sink {
        OutputSink::Local => match dispatcher.dispatch(controller, OutputSink::Local).await {
            Ok(outcome) => {
                report_outcome(&presenter, &outcome);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                presenter.error(&e.to_string());
                ExitCode::from(EXIT_ERROR)
            }
        },
        OutputSink::Remote => {
            presenter.start_spinner("Uploading...");
            let result = tokio::select! {
                result = dispatcher.dispatch(controller, OutputSink::Remote) => result,
                _ = shutdown.aborted() => Err(DispatchError::Interrupted),
            };
            presenter.stop_spinner();
            match result {
                Ok(outcome) => {
                    report_outcome(&presenter, &outcome);
                    ExitCode::from(EXIT_SUCCESS)
                }
                Err(e) => {
                    presenter.error(&e.to_string());
                    save_fallback(&presenter, &dispatcher, &output.container).await;
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
    }
}

/// Keep a failed upload's recording on disk
async fn save_fallback(
    presenter: &Presenter,
    dispatcher: &OutputDispatcher<LocalFileSaver, HttpUploader>,
    container: &EncodedContainer,
) {
    match dispatcher.save_local(container).await {
        Ok(path) => presenter.warn(&format!("Saved locally instead as {}", path.display())),
        Err(e) => presenter.error(&e.to_string()),
    }
}

fn report_outcome(presenter: &Presenter, outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Saved(path) => {
            presenter.success(&format!("Saved as {}", path.display()));
            presenter.output(&path.to_string_lossy());
        }
        DispatchOutcome::Uploaded(receipt) => {
            presenter.success(&format!("Uploaded (id: {})", receipt.upload_id));
            match &receipt.follow_up_url {
                Some(url) => presenter.output(url),
                None => presenter.output(&receipt.upload_id),
            }
        }
    }
}

/// Config layer holding only the values given on the command line
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        output_dir: cli.output_dir.clone(),
        chunk_size: cli.chunk_size,
        sink: cli.upload.then(|| OutputSink::Remote.to_string()),
        ..Default::default()
    }
}

/// Resolve the options for a capture run from parsed args and merged config
pub fn resolve_options(cli: &Cli, config: &AppConfig) -> Result<CaptureOptions, DurationParseError> {
    let limit = cli
        .duration
        .as_deref()
        .map(str::parse::<CaptureDuration>)
        .transpose()?;

    Ok(CaptureOptions {
        input: cli.input.clone(),
        chunk_size: config.chunk_size_or_default(),
        limit,
        monitor: cli.monitor,
        sink: config.sink_or_default(),
        output_dir: config.output_dir_or_default(),
        upload_url: config.upload_url.clone(),
        follow_up_url: config.follow_up_url.clone(),
    })
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load_or_empty().await;

    let env_config = AppConfig {
        upload_url: env::var(UPLOAD_URL_ENV).ok().filter(|s| !s.trim().is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn cli_layer_only_sets_given_flags() {
        let cli = Cli::parse_from(["muteone"]);
        assert_eq!(cli_config(&cli), AppConfig::empty());

        let cli = Cli::parse_from(["muteone", "--upload", "--chunk-size", "10"]);
        let config = cli_config(&cli);
        assert_eq!(config.sink.as_deref(), Some("remote"));
        assert_eq!(config.chunk_size, Some(10));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let file = AppConfig {
            output_dir: Some("/from/file".to_string()),
            sink: Some("remote".to_string()),
            upload_url: Some("https://file.example/upload".to_string()),
            ..Default::default()
        };
        let cli = Cli::parse_from(["muteone", "-o", "/from/cli", "-d", "30s"]);
        let config = AppConfig::defaults().merge(file).merge(cli_config(&cli));

        let options = resolve_options(&cli, &config).unwrap();
        assert_eq!(options.output_dir, PathBuf::from("/from/cli"));
        assert_eq!(options.sink, OutputSink::Remote);
        assert_eq!(options.limit, CaptureDuration::from_secs(30));
        assert_eq!(options.upload_url.as_deref(), Some("https://file.example/upload"));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let cli = Cli::parse_from(["muteone", "-d", "soon"]);
        assert!(resolve_options(&cli, &AppConfig::defaults()).is_err());
    }
}
