//! File logging through `tracing`. The terminal belongs to the UI, so nothing is
//! written to stdout or stderr while it runs.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub file: PathBuf,
    pub level: String,
}

/// `<data dir>/<app>/<app>.log`, or the temp dir when there is no data dir.
pub fn default_log_file(app_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(app_name)
        .join(format!("{}.log", app_name))
}

/// Where and how verbosely to log, or `None` when logging is off.
///
/// `--log-file` turns logging on regardless of config. `--debug` raises the level to debug.
pub fn log_settings(
    app_name: &str,
    config: &LoggingConfig,
    cli_file: Option<&Path>,
    debug: bool,
) -> Option<LogSettings> {
    let file = match (cli_file, config.enabled) {
        (Some(path), _) => path.to_path_buf(),
        (None, true) => config
            .file
            .clone()
            .unwrap_or_else(|| default_log_file(app_name)),
        (None, false) => return None,
    };
    let level = if debug {
        "debug".to_string()
    } else {
        config.level.to_lowercase()
    };
    Some(LogSettings { file, level })
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(settings: &LogSettings) -> Result<()> {
    if let Some(parent) = settings.file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)
        .map_err(|e| eyre!("Failed to open log file {}: {}", settings.file.display(), e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| eyre!("Invalid log filter '{}': {}", settings.level, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    tracing::info!(file = %settings.file.display(), level = %settings.level, "logging started");
    Ok(())
}
