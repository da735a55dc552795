//! Data-access capabilities the services depend on. `Database` implements
//! all of them; services hold them as trait objects.
//!
//! Every lookup that takes an identity (email, id, nickname) only sees active
//! accounts unless its name says otherwise.

use anyhow::Result;
use board_types::models::LikeTarget;

use crate::models::{
    ArticleChanges, ArticleRow, CommentRow, NewArticle, NewComment, NewUser, ProfileChanges,
    ProfileOutcome, SignupOutcome, UserRow,
};

pub trait UserStore: Send + Sync {
    /// Check email and nickname uniqueness and insert, as one transaction.
    fn insert_user(&self, user: &NewUser) -> Result<SignupOutcome>;

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>>;

    fn find_user_by_id(&self, id: &str) -> Result<Option<UserRow>>;

    fn find_user_by_id_and_nickname(&self, id: &str, nickname: &str) -> Result<Option<UserRow>>;

    /// Raw lookup that also returns deactivated rows.
    fn find_user_including_deactivated(&self, id: &str) -> Result<Option<UserRow>>;

    fn list_users(&self) -> Result<Vec<UserRow>>;

    /// Store (or clear, with `None`) the refresh-token hash. Returns whether an
    /// active user was touched.
    fn set_refresh_token_hash(&self, id: &str, hash: Option<&str>) -> Result<bool>;

    /// Nickname uniqueness check and update, as one transaction.
    fn update_profile(&self, id: &str, changes: &ProfileChanges) -> Result<ProfileOutcome>;

    /// Suffix the email, clear the refresh hash and mark the row deleted, as
    /// one transaction. Returns `false` if no active user matched.
    fn deactivate_user(&self, id: &str, email_suffix: &str) -> Result<bool>;
}

pub trait ArticleStore: Send + Sync {
    fn insert_article(&self, article: &NewArticle) -> Result<()>;

    fn find_article(&self, id: &str) -> Result<Option<ArticleRow>>;

    fn list_articles(&self, offset: u64, limit: u32) -> Result<Vec<ArticleRow>>;

    fn count_articles(&self) -> Result<u64>;

    fn list_articles_by_user(&self, user_id: &str, offset: u64, limit: u32) -> Result<Vec<ArticleRow>>;

    fn count_articles_by_user(&self, user_id: &str) -> Result<u64>;

    /// Update the article only if `user_id` owns it. Returns rows affected.
    fn update_article(&self, user_id: &str, id: &str, changes: &ArticleChanges) -> Result<usize>;

    /// Soft-delete the article only if `user_id` owns it. Returns rows affected.
    fn delete_article(&self, user_id: &str, id: &str) -> Result<usize>;
}

pub trait CommentStore: Send + Sync {
    fn insert_comment(&self, comment: &NewComment) -> Result<()>;

    fn find_comment(&self, id: &str) -> Result<Option<CommentRow>>;

    fn list_comments(&self, article_id: &str) -> Result<Vec<CommentRow>>;

    fn list_comments_page(&self, article_id: &str, offset: u64, limit: u32) -> Result<Vec<CommentRow>>;

    fn count_comments(&self, article_id: &str) -> Result<u64>;

    /// Update by the full `(user, article, comment)` key. Returns rows affected.
    fn update_comment(
        &self,
        user_id: &str,
        article_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<usize>;

    /// Soft-delete by the full `(user, article, comment)` key. Returns rows affected.
    fn delete_comment(&self, user_id: &str, article_id: &str, comment_id: &str) -> Result<usize>;
}

pub trait LikeStore: Send + Sync {
    /// Insert the like if absent, remove it if present. Returns `true` when
    /// the like now exists.
    fn toggle_like(&self, user_id: &str, target: LikeTarget) -> Result<bool>;

    fn count_likes(&self, target: LikeTarget) -> Result<u64>;
}
