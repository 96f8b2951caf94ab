use thiserror::Error;

/// Failure taxonomy shared by the broker, the page view and the settings page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummyError {
    /// Model or credential missing; raised before any backend call
    #[error("{0}")]
    Configuration(String),

    /// Page content could not be extracted
    #[error("Could not read page content: {0}")]
    Capture(String),

    /// The backend rejected the call (network, auth, quota)
    #[error("{0}")]
    Backend(String),

    /// The destination context no longer exists
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The backend answered with a malformed result
    #[error("Unexpected answer from the model: {0}")]
    Parse(String),
}

impl SummyError {
    pub fn missing_model() -> Self {
        Self::Configuration(
            "No model configured. Open the Summy settings to choose a model.".to_string(),
        )
    }

    pub fn missing_credential() -> Self {
        Self::Configuration(
            "No API key configured. Open the Summy settings to add your API key.".to_string(),
        )
    }

    /// Errors the page view renders in its error panel.
    ///
    /// Capture and delivery failures are handled where they occur and never
    /// reach the user.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Backend(_) | Self::Parse(_)
        )
    }

    /// Short machine-readable kind, used in logs and HTTP error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Capture(_) => "capture",
            Self::Backend(_) => "backend",
            Self::Delivery(_) => "delivery",
            Self::Parse(_) => "parse",
        }
    }
}

pub type Result<T> = std::result::Result<T, SummyError>;
