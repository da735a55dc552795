use std::sync::Arc;

use uuid::Uuid;

use board_db::LikeStore;
use board_types::api::{LikeCount, LikeState};
use board_types::models::{LikeKind, LikeTarget};

use crate::error::ApiError;
use crate::service::{ArticleService, CommentService};

#[derive(Clone)]
pub struct LikeService {
    likes: Arc<dyn LikeStore>,
    articles: ArticleService,
    comments: CommentService,
}

impl LikeService {
    pub fn new(likes: Arc<dyn LikeStore>, articles: ArticleService, comments: CommentService) -> Self {
        Self {
            likes,
            articles,
            comments,
        }
    }

    /// Like the target if the user has not yet, otherwise take the like back.
    pub fn toggle(&self, user_id: Uuid, target: LikeTarget) -> Result<LikeState, ApiError> {
        self.ensure_target(target)?;
        let liked = self.likes.toggle_like(&user_id.to_string(), target)?;
        let count = self.likes.count_likes(target)?;
        Ok(LikeState { liked, count })
    }

    pub fn count(&self, target: LikeTarget) -> Result<LikeCount, ApiError> {
        Ok(LikeCount {
            count: self.likes.count_likes(target)?,
        })
    }

    /// Places are external, so only articles and comments are checked.
    fn ensure_target(&self, target: LikeTarget) -> Result<(), ApiError> {
        match target.kind {
            LikeKind::Article if !self.articles.exists(target.id)? => Err(ApiError::NotFound("article")),
            LikeKind::Comment if !self.comments.exists(target.id)? => Err(ApiError::NotFound("comment")),
            _ => Ok(()),
        }
    }
}
