use std::sync::Arc;

use anyhow::anyhow;
use tracing::error;

use board_auth::tokens::TokenIssuer;
use board_db::Database;

use crate::error::ApiError;
use crate::service::{ArticleService, AuthService, CommentService, LikeService, UserService};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub auth: AuthService,
    pub users: UserService,
    pub articles: ArticleService,
    pub comments: CommentService,
    pub likes: LikeService,
}

impl AppStateInner {
    /// Wire every service to the one database, each through the store trait
    /// it needs.
    pub fn new(db: Arc<Database>, tokens: TokenIssuer) -> Self {
        let users = UserService::new(db.clone());
        let articles = ArticleService::new(db.clone());
        let comments = CommentService::new(db.clone(), db.clone());
        let likes = LikeService::new(db, articles.clone(), comments.clone());
        let auth = AuthService::new(users.clone(), tokens);

        Self {
            auth,
            users,
            articles,
            comments,
            likes,
        }
    }
}

/// Run blocking service work (rusqlite, argon2) off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow!("blocking task failed: {}", e))
    })?
}
