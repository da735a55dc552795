use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use board_db::ArticleStore;
use board_db::models::{ArticleChanges, NewArticle};
use board_types::api::{Affected, ArticlePage, CreateArticleRequest, UpdateArticleRequest};
use board_types::models::Article;
use board_types::page::{PAGE_SIZE, PageMeta, offset};

use crate::error::ApiError;
use crate::service::require_text;

const MAX_TITLE_CHARS: usize = 100;
const MAX_CONTENT_CHARS: usize = 10_000;

#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, user_id: Uuid, req: CreateArticleRequest) -> Result<Article, ApiError> {
        require_text("title", &req.title, MAX_TITLE_CHARS)?;
        require_text("content", &req.content, MAX_CONTENT_CHARS)?;

        let id = Uuid::new_v4();
        self.store.insert_article(&NewArticle {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: req.title,
            content: req.content,
            image: req.image,
        })?;
        info!("Article {} created by {}", id, user_id);

        self.get(id)
    }

    pub fn get(&self, id: Uuid) -> Result<Article, ApiError> {
        let row = self
            .store
            .find_article(&id.to_string())?
            .ok_or(ApiError::NotFound("article"))?;
        Ok(Article::try_from(row)?)
    }

    pub fn exists(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.store.find_article(&id.to_string())?.is_some())
    }

    pub fn list(&self, page: u32) -> Result<ArticlePage, ApiError> {
        let total = self.store.count_articles()?;
        let rows = self.store.list_articles(offset(page), PAGE_SIZE)?;
        Ok(ArticlePage {
            meta: PageMeta::new(page, total),
            articles: rows
                .into_iter()
                .map(Article::try_from)
                .collect::<anyhow::Result<_>>()?,
        })
    }

    /// Articles written by `user_id`, newest first.
    pub fn mine(&self, user_id: Uuid, page: u32) -> Result<ArticlePage, ApiError> {
        let uid = user_id.to_string();
        let total = self.store.count_articles_by_user(&uid)?;
        let rows = self.store.list_articles_by_user(&uid, offset(page), PAGE_SIZE)?;
        Ok(ArticlePage {
            meta: PageMeta::new(page, total),
            articles: rows
                .into_iter()
                .map(Article::try_from)
                .collect::<anyhow::Result<_>>()?,
        })
    }

    /// Scoped to the owner; another user's id simply matches nothing.
    pub fn update(&self, user_id: Uuid, id: Uuid, req: UpdateArticleRequest) -> Result<Affected, ApiError> {
        if let Some(title) = &req.title {
            require_text("title", title, MAX_TITLE_CHARS)?;
        }
        if let Some(content) = &req.content {
            require_text("content", content, MAX_CONTENT_CHARS)?;
        }

        let changes = ArticleChanges {
            title: req.title,
            content: req.content,
            image: req.image,
        };
        let affected = self
            .store
            .update_article(&user_id.to_string(), &id.to_string(), &changes)?;
        Ok(Affected { affected })
    }

    pub fn delete(&self, user_id: Uuid, id: Uuid) -> Result<Affected, ApiError> {
        let affected = self.store.delete_article(&user_id.to_string(), &id.to_string())?;
        if affected > 0 {
            info!("Article {} deleted by {}", id, user_id);
        }
        Ok(Affected { affected })
    }
}
