use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use board_auth::tokens::TokenKind;
use board_types::api::Claims;

use crate::auth::session_jar;
use crate::error::ApiError;
use crate::state::{AppState, blocking};

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = blocking(move || state.users.find_all()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(move || state.users.find_by_id(id)).await?;
    Ok(Json(user))
}

/// Accounts can only be removed by their owner. Removal is a soft delete.
pub async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.id != id {
        return Err(ApiError::Forbidden);
    }

    let cookies = vec![
        state.auth.logoff_cookie(TokenKind::Access),
        state.auth.logoff_cookie(TokenKind::Refresh),
    ];
    blocking(move || state.users.remove(id)).await?;
    Ok((StatusCode::NO_CONTENT, session_jar(&cookies)))
}
