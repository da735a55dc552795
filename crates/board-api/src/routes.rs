use axum::{
    Json, Router, middleware,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{articles, auth, comments, likes, users};

/// Build the board API. Routes under the protected router require a valid
/// `accessToken` cookie; everything else is open.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/user", get(users::list_users))
        .route("/user/{id}", get(users::get_user))
        .route("/article/list", get(articles::list_articles))
        .route("/article/{id}", get(articles::get_article))
        .route("/comment/{article_id}", get(comments::list_comments))
        .route("/comment/mycomment/{article_id}", get(comments::comment_page))
        .route("/like/{kind}/{id}", get(likes::count_likes));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/info", get(auth::info))
        .route("/auth/profile", put(auth::edit_profile))
        .route("/auth/withdrawal", delete(auth::withdraw))
        .route("/user/logoff/{id}", delete(users::remove_user))
        .route("/article", post(articles::create_article))
        .route("/article/myArticle", get(articles::my_articles))
        .route("/article/{id}", put(articles::update_article))
        .route("/article/delete/{id}", delete(articles::delete_article))
        .route("/comment/{article_id}", post(comments::create_comment))
        .route(
            "/comment/{article_id}/{comment_id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/like/{kind}/{id}", post(likes::toggle_like))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
