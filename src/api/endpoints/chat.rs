//! `POST /api/chat`: supportive-assistant chat turn.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson};
use crate::assistant::{self, ChatRequest, ChatResponse};

pub async fn send(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.user_message.trim().is_empty() {
        return Err(ApiError::BadRequest("userMessage is required".into()));
    }
    let response = assistant::reply(ctx.core.llm.as_ref(), &request).await?;
    Ok(Json(response))
}
