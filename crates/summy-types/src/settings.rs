use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SummyError;

/// Storage key of the model identifier
pub const MODEL_KEY: &str = "llm_model";
/// Storage key of the API credential
pub const API_KEY_KEY: &str = "llm_api_key";
/// Storage key of the trigger visibility flag
pub const SHOW_BUTTON_KEY: &str = "show_button";

pub const SHOW_BUTTON_DEFAULT: bool = true;
pub const DEFAULT_MODEL: &str = "";

/// The persisted user settings record.
///
/// Field names on the wire are the storage keys, so a serialized `Settings`
/// is exactly what the key/value store holds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "llm_model", default)]
    pub model: String,

    #[serde(rename = "llm_api_key", default)]
    pub credential: String,

    #[serde(default = "default_show_button")]
    pub show_button: bool,
}

fn default_show_button() -> bool {
    SHOW_BUTTON_DEFAULT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            credential: String::new(),
            show_button: SHOW_BUTTON_DEFAULT,
        }
    }
}

// The credential must never end up in logs
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("model", &self.model)
            .field("credential", &if self.has_credential() { "<redacted>" } else { "" })
            .field("show_button", &self.show_button)
            .finish()
    }
}

impl Settings {
    pub fn new(model: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            credential: credential.into(),
            ..Self::default()
        }
    }

    pub fn with_show_button(mut self, show: bool) -> Self {
        self.show_button = show;
        self
    }

    pub fn has_model(&self) -> bool {
        !self.model.trim().is_empty()
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }

    /// Model identifier, or a configuration error when unset
    pub fn require_model(&self) -> Result<&str, SummyError> {
        if self.has_model() {
            Ok(self.model.trim())
        } else {
            Err(SummyError::missing_model())
        }
    }

    /// Credential, or a configuration error when unset
    pub fn require_credential(&self) -> Result<&str, SummyError> {
        if self.has_credential() {
            Ok(self.credential.trim())
        } else {
            Err(SummyError::missing_credential())
        }
    }
}

/// Partial write issued by the settings page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_button: Option<bool>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.credential.is_none() && self.show_button.is_none()
    }

    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(model) = &self.model {
            settings.model = model.trim().to_string();
        }
        if let Some(credential) = &self.credential {
            settings.credential = credential.trim().to_string();
        }
        if let Some(show) = self.show_button {
            settings.show_button = show;
        }
        settings
    }
}
