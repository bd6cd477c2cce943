#![forbid(unsafe_code)]

//! Log subscriber bootstrap.
//!
//! The UI owns the terminal, so log output never goes to stdout/stderr while
//! a session is active. When a log file is configured, a `tracing-subscriber`
//! fmt layer writes there (plain or JSON lines). Filtering follows `FOLIO_LOG`
//! using `EnvFilter` directive syntax, e.g. `FOLIO_LOG=folio.nav=debug,info`.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub use tracing::{debug, error, info, trace, warn};

/// Environment variable holding the filter directives.
pub const FILTER_ENV: &str = "FOLIO_LOG";

/// Filter used when `FOLIO_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Where and how to write logs.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Append to this file. `None` disables logging entirely.
    pub file: Option<PathBuf>,
    /// Emit one JSON object per line instead of human-readable text.
    pub json: bool,
}

#[derive(Debug)]
pub enum LoggingError {
    /// The log file could not be opened.
    Io(io::Error),
    /// A global subscriber was already installed.
    AlreadyInstalled(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(e) => write!(f, "cannot open log file: {e}"),
            LoggingError::AlreadyInstalled(msg) => write!(f, "log subscriber already set: {msg}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::Io(e) => Some(e),
            LoggingError::AlreadyInstalled(_) => None,
        }
    }
}

impl From<io::Error> for LoggingError {
    fn from(e: io::Error) -> Self {
        LoggingError::Io(e)
    }
}

/// Build the filter from `FOLIO_LOG`, falling back to [`DEFAULT_DIRECTIVE`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber described by `config`.
///
/// Returns `Ok(false)` when logging is disabled (no file configured).
pub fn init(config: &LogConfig) -> Result<bool, LoggingError> {
    let Some(path) = &config.file else {
        return Ok(false);
    };
    let file = open_log_file(path)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;

    tracing::info!(
        target: "folio.logging",
        path = %path.display(),
        json = config.json,
        "logging initialised"
    );
    Ok(true)
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
