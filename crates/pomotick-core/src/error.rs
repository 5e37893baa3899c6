//! Core error types for pomotick-core.
//!
//! Every fallible operation in the library returns one of these. Audio
//! failures are the exception: the alarm notifier handles [`AudioError`]
//! locally and never lets it reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotick-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Release feed errors
    #[error("Update check failed: {0}")]
    Update(#[from] UpdateError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be prepared
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(#[source] std::io::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Duration entry is not a whole number of minutes in range
    #[error("Invalid duration '{input}': expected whole minutes between {min} and {max}")]
    InvalidDuration { input: String, min: u32, max: u32 },

    /// Duration entry was edited while the countdown is running
    #[error("Duration cannot be changed while the timer is running")]
    TimerActive,

    /// Preset list is empty
    #[error("Preset list must not be empty")]
    EmptyPresets,

    /// A preset of zero minutes
    #[error("Preset at position {index} must be at least one minute")]
    ZeroPreset { index: usize },

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },
}

/// Audio backend errors. Never escapes the alarm notifier.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device could be opened
    #[error("Audio output unavailable: {0}")]
    Unavailable(String),

    /// Configured sound file is missing
    #[error("Alarm sound not found at {0}")]
    MissingSound(PathBuf),

    /// Sound file could not be decoded
    #[error("Failed to decode alarm sound: {0}")]
    Decode(String),
}

/// Release feed errors.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Feed URL could not be parsed
    #[error("Invalid release feed URL '{url}': {source}")]
    InvalidFeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed answered with a non-success status
    #[error("Release feed returned HTTP {0}")]
    Status(u16),

    /// Tag could not be read as a version
    #[error("Cannot parse version from '{0}'")]
    BadVersion(String),
}
