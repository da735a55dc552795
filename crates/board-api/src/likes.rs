use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use board_types::api::Claims;
use board_types::models::{LikeKind, LikeTarget};

use crate::error::ApiError;
use crate::state::{AppState, blocking};

pub async fn toggle_like(
    State(state): State<AppState>,
    Path((kind, id)): Path<(LikeKind, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let target = LikeTarget { kind, id };
    let liked = blocking(move || state.likes.toggle(claims.id, target)).await?;
    Ok(Json(liked))
}

pub async fn count_likes(
    State(state): State<AppState>,
    Path((kind, id)): Path<(LikeKind, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let target = LikeTarget { kind, id };
    let count = blocking(move || state.likes.count(target)).await?;
    Ok(Json(count))
}
