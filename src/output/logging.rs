//! Tracing subscriber setup.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::error::{Error, Result};

/// Install the global subscriber.
///
/// Logs go to the console. With `debug` set they are also appended to
/// `log_file`, without colors.
pub fn init_logging(debug: bool, log_file: &Path) -> Result<()> {
    let log_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file_sink = if debug {
        Some(file_layer(open_log_file(log_file)?))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_sink)
        .try_init()
        .map_err(|e| Error::Io(io::Error::other(e)))?;

    if debug {
        tracing::debug!("Writing debug log to {}", log_file.display());
    }

    Ok(())
}

/// Open `path` for appending, creating it and its parent directories.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Plain-text fmt layer writing to `file`.
pub fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
}
