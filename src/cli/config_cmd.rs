//! Config command handler

use crate::application::dispatch::{follow_up_url, UPLOAD_ID_PLACEHOLDER};
use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, OutputSink};
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let path = store.init().await?;
    presenter.success(&format!("Config file created at: {}", path.display()));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;

    match read_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = read_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(invalid(
        key,
        format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    ))
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Validate `value` and store it under `key`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    match key {
        "output_dir" => {
            if value.is_empty() {
                return Err(invalid(key, "Directory must not be empty"));
            }
            config.output_dir = Some(value.to_string());
        }
        "upload_url" => {
            validate_http_url(key, value)?;
            config.upload_url = Some(value.to_string());
        }
        "follow_up_url" => {
            if !value.contains(UPLOAD_ID_PLACEHOLDER) {
                return Err(invalid(
                    key,
                    format!("Template must contain {}", UPLOAD_ID_PLACEHOLDER),
                ));
            }
            validate_http_url(key, &follow_up_url(value, "id"))?;
            config.follow_up_url = Some(value.to_string());
        }
        "chunk_size" => {
            let size = value
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| invalid(key, "Value must be a positive number of bytes"))?;
            config.chunk_size = Some(size);
        }
        "sink" => {
            let sink = value
                .parse::<OutputSink>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.sink = Some(sink.to_string());
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "output_dir" => config.output_dir.clone(),
        "upload_url" => config.upload_url.clone(),
        "follow_up_url" => config.follow_up_url.clone(),
        "chunk_size" => config.chunk_size.map(|n| n.to_string()),
        "sink" => config.sink.clone(),
        _ => None,
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(value).map_err(|e| invalid(key, format!("Invalid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(
            key,
            format!("Unsupported scheme '{other}', expected http or https"),
        )),
    }
}
