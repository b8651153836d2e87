use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, instrument};

use crate::{
    app_state::AppState,
    error::{Result, StoryError},
    models::story::StoryGenerateResponse,
};

/// POST /api/story
#[instrument(skip(state, payload))]
pub async fn generate_story(
    State(state): State<AppState>,
    payload: std::result::Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<StoryGenerateResponse>> {
    let Json(body) = payload.map_err(|rejection| {
        debug!("Rejected request body: {}", rejection);
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            StoryError::PayloadTooLarge
        } else {
            StoryError::Validation("Invalid JSON body.".to_string())
        }
    })?;

    let story = state
        .story_service
        .generate_from_value(&body, &state.credentials)
        .await?;

    Ok(Json(StoryGenerateResponse {
        success: true,
        data: story,
    }))
}
