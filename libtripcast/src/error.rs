//! Error types for Tripcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TripcastError>;

#[derive(Error, Debug)]
pub enum TripcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Text generation error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors from the social platform.
///
/// Every outbound platform call site maps into this taxonomy so callers
/// always receive a structured outcome instead of a raw SDK error.
#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

impl PlatformError {
    /// Whether the platform itself rejected the request, as opposed to the
    /// request never completing. Rejections are reportable to the caller
    /// as a structured outcome; transport failures are not.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, PlatformError::Network(_))
    }
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Image search key is not configured")]
    MissingKey,

    #[error("Image search failed: {0}")]
    Search(String),

    #[error("Image download failed: {0}")]
    Download(String),

    #[error("Failed to store media file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Text generation key is not configured")]
    MissingKey,

    #[error("Text generation request failed: {0}")]
    Request(String),

    #[error("Text generation service returned no completion")]
    EmptyCompletion,
}

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Failed to write chart file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to write backup file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        let error = TripcastError::InvalidInput("text cannot be empty".to_string());
        assert_eq!(format!("{}", error), "Invalid input: text cannot be empty");

        let error = TripcastError::Platform(PlatformError::Posting(
            "Failed to reach instance".to_string(),
        ));
        assert_eq!(
            format!("{}", error),
            "Platform error: Posting failed: Failed to reach instance"
        );
    }

    #[test]
    fn test_error_conversion_from_platform_error() {
        let platform_error = PlatformError::Posting("test".to_string());
        let error: TripcastError = platform_error.into();
        assert!(matches!(error, TripcastError::Platform(_)));
    }

    #[test]
    fn test_error_conversion_from_media_error() {
        let media_error = MediaError::Search("502 from image service".to_string());
        let error: TripcastError = media_error.into();
        assert!(matches!(error, TripcastError::Media(_)));
    }

    #[test]
    fn test_rejection_classification() {
        assert!(PlatformError::Validation("too long".into()).is_rejection());
        assert!(PlatformError::Posting("refused".into()).is_rejection());
        assert!(PlatformError::Authentication("bad token".into()).is_rejection());
        assert!(PlatformError::RateLimit("slow down".into()).is_rejection());
        assert!(!PlatformError::Network("connection reset".into()).is_rejection());
    }

    #[test]
    fn test_generator_error_formatting() {
        let error = TripcastError::Generator(GeneratorError::EmptyCompletion);
        assert_eq!(
            format!("{}", error),
            "Text generation error: Text generation service returned no completion"
        );
    }

    #[test]
    fn test_config_error_missing_field() {
        let error = ConfigError::MissingField("platform.instance".to_string());
        assert!(format!("{}", error).contains("platform.instance"));
    }
}
