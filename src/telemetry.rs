//! Logging setup. Library code only emits `tracing` events; whoever drives
//! a run installs a subscriber here and keeps the guard alive for as long
//! as logs should flow. Dropping the guard restores the previous dispatcher.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;
use crate::error::{BenchError, Result};

pub struct LoggingGuard {
    _default: DefaultGuard,
}

/// Console layer on stderr plus an optional plain-text file layer.
/// `RUST_LOG` takes precedence over `cfg.level`.
pub fn install(cfg: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(&cfg.level).map_err(|e| BenchError::Config {
            message: format!("invalid log filter '{}': {}", cfg.level, e),
        })?,
    };

    let file_layer = match &cfg.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(&cfg.log_file);
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(cfg.ansi)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer);

    let default = tracing::subscriber::set_default(subscriber);
    tracing::debug!("Logging configured successfully.");
    Ok(LoggingGuard { _default: default })
}

/// Console-only logging for the window before the configuration is known,
/// so warnings raised while loading it still reach stderr.
pub fn bootstrap() -> LoggingGuard {
    bootstrap_with_writer(std::io::stderr)
}

fn bootstrap_with_writer<W>(writer: W) -> LoggingGuard
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LoggingConfig::default().level));
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(writer),
    );
    LoggingGuard {
        _default: tracing::subscriber::set_default(subscriber),
    }
}
