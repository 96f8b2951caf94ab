use std::sync::Arc;
use summy_types::{Result, Settings, SettingsUpdate, SummyError};

use crate::backend::Backend;
use crate::broker::Broker;

/// Models offered as completions in the settings page
pub const MODEL_SUGGESTIONS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "o1-mini",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
    "claude-3-7-sonnet-latest",
    "claude-3-5-haiku-latest",
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "deepseek-r1-distill-llama-70b",
];

/// Result of the settings page's connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub ok: bool,
    pub message: String,
}

/// The settings page: the only writer of the settings record
#[derive(Clone)]
pub struct SettingsPage {
    broker: Arc<Broker>,
}

impl SettingsPage {
    pub fn new(broker: Arc<Broker>) -> Self {
        Self { broker }
    }

    pub fn model_suggestions(&self) -> &'static [&'static str] {
        MODEL_SUGGESTIONS
    }

    pub async fn load(&self) -> Result<Settings> {
        self.broker
            .settings()
            .read()
            .await
            .map_err(|e| SummyError::Configuration(format!("Could not read settings: {}", e)))
    }

    pub async fn save(&self, update: SettingsUpdate) -> Result<Settings> {
        self.broker.on_settings_changed(update).await
    }

    pub async fn set_model(&self, model: impl Into<String>) -> Result<Settings> {
        self.save(SettingsUpdate {
            model: Some(model.into()),
            ..Default::default()
        })
        .await
    }

    pub async fn set_credential(&self, credential: impl Into<String>) -> Result<Settings> {
        self.save(SettingsUpdate {
            credential: Some(credential.into()),
            ..Default::default()
        })
        .await
    }

    pub async fn set_show_button(&self, show: bool) -> Result<Settings> {
        self.save(SettingsUpdate {
            show_button: Some(show),
            ..Default::default()
        })
        .await
    }

    /// Check the stored model and credential against the backend
    pub async fn test_connection(&self) -> ConnectionStatus {
        let outcome = match self.load().await {
            Ok(settings) => self.verify(&settings).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(answer) => ConnectionStatus {
                ok: true,
                message: answer,
            },
            Err(e) => ConnectionStatus {
                ok: false,
                message: e.to_string(),
            },
        }
    }

    async fn verify(&self, settings: &Settings) -> Result<String> {
        let model = settings.require_model()?;
        self.broker
            .backend()
            .verify_access(model, settings.credential.trim())
            .await
    }
}
