use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use summy_types::{Reply, Request, TabId};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Accepted {
    pub accepted: bool,
}

/// Relay one protocol request from a tab and return the broker's reply
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(tab_id): Path<i32>,
    Json(request): Json<Request>,
) -> ApiResult<Json<Reply>> {
    let tab = TabId(tab_id);

    // The summary is pushed back, so a capture needs an open event stream
    if matches!(request, Request::Capture { .. }) && !is_connected(&state, tab).await {
        return Err(ApiError::TabNotConnected(tab_id));
    }

    let reply = state.broker.send(tab, request).await?;
    Ok(Json(reply))
}

/// The context menu entry was clicked on this tab
pub async fn context_menu(
    State(state): State<Arc<AppState>>,
    Path(tab_id): Path<i32>,
) -> ApiResult<(StatusCode, Json<Accepted>)> {
    let tab = TabId(tab_id);
    if !is_connected(&state, tab).await {
        return Err(ApiError::TabNotConnected(tab_id));
    }

    state.broker.context_menu_clicked(tab);
    Ok((StatusCode::ACCEPTED, Json(Accepted { accepted: true })))
}

/// The tab was closed
pub async fn remove_tab(
    State(state): State<Arc<AppState>>,
    Path(tab_id): Path<i32>,
) -> StatusCode {
    state.broker.tab_removed(TabId(tab_id)).await;
    StatusCode::NO_CONTENT
}

async fn is_connected(state: &AppState, tab: TabId) -> bool {
    state.broker.broker().open_tabs().await.contains(&tab)
}
