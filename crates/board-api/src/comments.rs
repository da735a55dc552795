use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use board_types::api::{Claims, CommentRequest, PageQuery};

use crate::error::ApiError;
use crate::state::{AppState, blocking};

pub async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = blocking(move || state.comments.list(article_id)).await?;
    Ok(Json(comments))
}

/// Paginated comments of an article, with the pager block the board renders.
pub async fn comment_page(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = blocking(move || state.comments.page(article_id, query.page())).await?;
    Ok(Json(page))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment =
        blocking(move || state.comments.create(claims.id, article_id, &req.content)).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path((article_id, comment_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let affected = blocking(move || {
        state
            .comments
            .update(claims.id, article_id, comment_id, &req.content)
    })
    .await?;
    Ok(Json(affected))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((article_id, comment_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let affected =
        blocking(move || state.comments.delete(claims.id, article_id, comment_id)).await?;
    Ok(Json(affected))
}
