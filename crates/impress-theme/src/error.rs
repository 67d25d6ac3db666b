//! Error types for impress-theme

use thiserror::Error;

/// Result type alias for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;

/// Main error type for theme operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThemeError {
    /// Clipboard-related errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Visibility observer errors
    #[error("Observer error: {0}")]
    Observer(#[from] ObserverError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Clipboard write failures, primary or fallback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The asynchronous clipboard rejected the write
    #[error("Clipboard write rejected: {0}")]
    Rejected(String),

    /// The legacy copy command threw or reported failure
    #[error("Copy command failed: {0}")]
    CommandFailed(String),

    /// The trigger carries no citation text
    #[error("Trigger has no `{attribute}` attribute")]
    MissingCitation { attribute: String },
}

/// Visibility observer setup failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The platform has no intersection observer
    #[error("Intersection observer unavailable")]
    Unavailable,

    /// Constructing or attaching the observer threw
    #[error("Observer setup failed: {0}")]
    Setup(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A class name, id or marker is empty
    #[error("`{0}` must not be empty")]
    EmptyName(&'static str),

    /// A numeric setting is out of range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// The configuration document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ThemeError::Clipboard(ClipboardError::MissingCitation {
            attribute: "data-bibtex".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Clipboard error: Trigger has no `data-bibtex` attribute"
        );
    }

    #[test]
    fn test_config_error_from_json() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
