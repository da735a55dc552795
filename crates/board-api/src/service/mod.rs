//! Business logic over the store traits. Services are synchronous (the store
//! is rusqlite); handlers run them on the blocking pool.

pub mod articles;
pub mod auth;
pub mod comments;
pub mod likes;
pub mod users;

pub use articles::ArticleService;
pub use auth::AuthService;
pub use comments::CommentService;
pub use likes::LikeService;
pub use users::UserService;

use crate::error::ApiError;

/// Reject blank or oversized text fields.
pub(crate) fn require_text(field: &str, value: &str, max_chars: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(ApiError::BadRequest(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use board_auth::tokens::{
        DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, TokenConfig, TokenIssuer,
    };
    use board_db::Database;

    pub(crate) fn db() -> Arc<Database> {
        Arc::new(Database::open_in_memory().unwrap())
    }

    pub(crate) fn issuer() -> TokenIssuer {
        TokenIssuer::new(TokenConfig {
            access_secret: "test-access".into(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_secret: "test-refresh".into(),
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            cookie_domain: "localhost".into(),
            cookie_secure: false,
        })
        .unwrap()
    }
}
