use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use summy_types::{Settings, SettingsUpdate};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Settings as shown to the settings page. The credential itself never
/// leaves the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub model: String,
    pub has_credential: bool,
    pub show_button: bool,
    pub model_suggestions: Vec<String>,
}

impl SettingsResponse {
    fn new(settings: &Settings, suggestions: &[&str]) -> Self {
        Self {
            model: settings.model.clone(),
            has_credential: settings.has_credential(),
            show_button: settings.show_button,
            model_suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub ok: bool,
    pub message: String,
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<Json<SettingsResponse>> {
    let page = &state.settings_page;
    let settings = page.load().await?;
    Ok(Json(SettingsResponse::new(&settings, page.model_suggestions())))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<SettingsResponse>> {
    if update.is_empty() {
        return Err(ApiError::BadRequest("No settings to update".to_string()));
    }

    let page = &state.settings_page;
    let settings = page.save(update).await?;
    Ok(Json(SettingsResponse::new(&settings, page.model_suggestions())))
}

/// Connection test of the settings page
pub async fn verify_settings(State(state): State<Arc<AppState>>) -> Json<VerifyResponse> {
    let status = state.settings_page.test_connection().await;
    Json(VerifyResponse {
        ok: status.ok,
        message: status.message,
    })
}
