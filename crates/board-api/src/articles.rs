use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use board_types::api::{Claims, CreateArticleRequest, PageQuery, UpdateArticleRequest};

use crate::error::ApiError;
use crate::state::{AppState, blocking};

pub async fn create_article(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let article = blocking(move || state.articles.create(claims.id, req)).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = blocking(move || state.articles.list(query.page())).await?;
    Ok(Json(page))
}

pub async fn my_articles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = blocking(move || state.articles.mine(claims.id, query.page())).await?;
    Ok(Json(page))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let article = blocking(move || state.articles.get(id)).await?;
    Ok(Json(article))
}

pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let affected = blocking(move || state.articles.update(claims.id, id, req)).await?;
    Ok(Json(affected))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let affected = blocking(move || state.articles.delete(claims.id, id)).await?;
    Ok(Json(affected))
}
