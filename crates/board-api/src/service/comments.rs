use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use board_db::models::NewComment;
use board_db::{ArticleStore, CommentStore};
use board_types::api::{Affected, CommentPage};
use board_types::models::Comment;
use board_types::page::{PAGE_SIZE, PageMeta, offset};

use crate::error::ApiError;
use crate::service::require_text;

const MAX_COMMENT_CHARS: usize = 1_000;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    articles: Arc<dyn ArticleStore>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, articles: Arc<dyn ArticleStore>) -> Self {
        Self { comments, articles }
    }

    pub fn exists(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.comments.find_comment(&id.to_string())?.is_some())
    }

    /// Every live comment on the article, oldest first.
    pub fn list(&self, article_id: Uuid) -> Result<Vec<Comment>, ApiError> {
        let rows = self.comments.list_comments(&article_id.to_string())?;
        Ok(rows
            .into_iter()
            .map(Comment::try_from)
            .collect::<anyhow::Result<_>>()?)
    }

    pub fn page(&self, article_id: Uuid, page: u32) -> Result<CommentPage, ApiError> {
        let aid = article_id.to_string();
        let total = self.comments.count_comments(&aid)?;
        let rows = self.comments.list_comments_page(&aid, offset(page), PAGE_SIZE)?;
        Ok(CommentPage {
            meta: PageMeta::new(page, total),
            comments: rows
                .into_iter()
                .map(Comment::try_from)
                .collect::<anyhow::Result<_>>()?,
        })
    }

    pub fn create(&self, user_id: Uuid, article_id: Uuid, content: &str) -> Result<Comment, ApiError> {
        require_text("content", content, MAX_COMMENT_CHARS)?;

        let aid = article_id.to_string();
        if self.articles.find_article(&aid)?.is_none() {
            return Err(ApiError::NotFound("article"));
        }

        let id = Uuid::new_v4();
        self.comments.insert_comment(&NewComment {
            id: id.to_string(),
            article_id: aid,
            user_id: user_id.to_string(),
            content: content.to_string(),
        })?;

        let row = self
            .comments
            .find_comment(&id.to_string())?
            .ok_or(ApiError::NotFound("comment"))?;
        Ok(Comment::try_from(row)?)
    }

    /// Only the row matching `(user, article, comment)` changes. A mismatched
    /// key is not an error; it reports `affected: 0`.
    pub fn update(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Affected, ApiError> {
        require_text("content", content, MAX_COMMENT_CHARS)?;

        let affected = self.comments.update_comment(
            &user_id.to_string(),
            &article_id.to_string(),
            &comment_id.to_string(),
            content,
        )?;
        if affected == 0 {
            debug!("Comment update by {} matched nothing ({}/{})", user_id, article_id, comment_id);
        }
        Ok(Affected { affected })
    }

    pub fn delete(&self, user_id: Uuid, article_id: Uuid, comment_id: Uuid) -> Result<Affected, ApiError> {
        let affected = self.comments.delete_comment(
            &user_id.to_string(),
            &article_id.to_string(),
            &comment_id.to_string(),
        )?;
        if affected == 0 {
            debug!("Comment delete by {} matched nothing ({}/{})", user_id, article_id, comment_id);
        }
        Ok(Affected { affected })
    }
}
