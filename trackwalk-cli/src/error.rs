//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use trackwalk::config::ConfigError;
use trackwalk::imagery::LookupError;
use trackwalk::logging::LoggingError;
use trackwalk::RouteError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or missing configuration.
    Config(String),
    /// Configuration file could not be read or written.
    ConfigFile(ConfigError),
    /// Logging could not be set up.
    Logging(LoggingError),
    /// The track file could not be read.
    TrackFile { path: PathBuf, reason: String },
    /// The track contains no usable points.
    Route(RouteError),
    /// The imagery client could not be built.
    Imagery(LookupError),
    /// Terminal or runtime I/O failed.
    Io(std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) => 2,
            CliError::TrackFile { .. } | CliError::Route(_) => 3,
            CliError::Logging(_) | CliError::Imagery(_) | CliError::Io(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::TrackFile { path, reason } => {
                write!(f, "Failed to read track {}: {}", path.display(), reason)
            }
            CliError::Route(e) => write!(f, "{}", e),
            CliError::Imagery(e) => write!(f, "Imagery client error: {}", e),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Route(e) => Some(e),
            CliError::Imagery(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Config(_) | CliError::TrackFile { .. } => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<RouteError> for CliError {
    fn from(e: RouteError) -> Self {
        CliError::Route(e)
    }
}

impl From<LookupError> for CliError {
    fn from(e: LookupError) -> Self {
        CliError::Imagery(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
