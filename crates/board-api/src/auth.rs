use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;

use board_auth::cookies::{REFRESH_COOKIE, SetCookie};
use board_types::api::{Claims, EditProfileRequest, LoginRequest, SignupRequest};

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// Response jar carrying one `Set-Cookie` per session cookie.
pub(crate) fn session_jar(cookies: &[SetCookie]) -> CookieJar {
    cookies
        .iter()
        .fold(CookieJar::new(), |jar, cookie| jar.add(cookie.to_cookie()))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = blocking(move || state.auth.signup(req)).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = blocking(move || state.auth.login(req)).await?;
    Ok((session_jar(&session.cookies), Json(session.user)))
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let raw = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthorized)?;

    let session = blocking(move || state.auth.refresh(&raw)).await?;
    Ok((session_jar(&session.cookies), Json(session.user)))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cookies = blocking(move || state.auth.logout(claims.id)).await?;
    Ok((StatusCode::NO_CONTENT, session_jar(&cookies)))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(move || state.auth.whoami(claims.id)).await?;
    Ok(Json(user))
}

pub async fn info(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = blocking(move || state.auth.info(claims.id)).await?;
    Ok(Json(profile))
}

pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<EditProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = blocking(move || state.users.edit_profile(claims.id, req)).await?;
    Ok(Json(profile))
}

/// Close the caller's own account and clear both session cookies.
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cookies = blocking(move || state.auth.deactivate(claims.id)).await?;
    Ok((StatusCode::NO_CONTENT, session_jar(&cookies)))
}
