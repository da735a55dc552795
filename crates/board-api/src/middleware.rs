use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use board_auth::cookies::ACCESS_COOKIE;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// Extract and validate the access JWT from the `accessToken` cookie, then
/// expose its `Claims` to handlers as a request extension. The token's
/// account must still be active.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthorized)?;
    let claims = blocking(move || state.auth.authenticate(&token)).await?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
