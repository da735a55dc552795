//! Database row types. These map directly to SQLite rows and are kept
//! distinct from the board-types API models so the DB layer stays independent.
use anyhow::{Context, Result};
use board_types::models::{Article, Author, Comment, UserProfile};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

/// Whether an account can still be looked up by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Active,
    Deactivated,
}

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub password: String,
    pub phone: String,
    pub image: Option<String>,
    pub refresh_token_hash: Option<String>,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

impl UserRow {
    pub fn state(&self) -> AccountState {
        match self.deleted_at {
            Some(_) => AccountState::Deactivated,
            None => AccountState::Active,
        }
    }

    pub fn uuid(&self) -> Result<Uuid> {
        parse_id(&self.id, "user")
    }

    pub fn to_profile(&self) -> Result<UserProfile> {
        Ok(UserProfile {
            id: self.uuid()?,
            email: self.email.clone(),
            name: self.name.clone(),
            nickname: self.nickname.clone(),
            phone: self.phone.clone(),
            image: self.image.clone(),
            created_at: parse_timestamp(&self.created_at, &self.id)?,
        })
    }
}

/// Values for a signup insert. `password` is already hashed.
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub password: String,
    pub phone: String,
}

/// Outcome of the transactional signup insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Created,
    EmailTaken,
    NicknameTaken,
}

/// Partial profile update; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutcome {
    Updated,
    NicknameTaken,
    NotFound,
}

pub struct ArticleRow {
    pub id: String,
    pub user_id: String,
    pub nickname: String,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: String,
}

impl TryFrom<ArticleRow> for Article {
    type Error = anyhow::Error;

    fn try_from(row: ArticleRow) -> Result<Self> {
        Ok(Article {
            id: parse_id(&row.id, "article")?,
            created_at: parse_timestamp(&row.created_at, &row.id)?,
            user: Author {
                id: parse_id(&row.user_id, "user")?,
                nickname: row.nickname,
            },
            title: row.title,
            content: row.content,
            image: row.image,
        })
    }
}

pub struct NewArticle {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

pub struct CommentRow {
    pub id: String,
    pub article_id: String,
    pub user_id: String,
    pub nickname: String,
    pub content: String,
    pub created_at: String,
}

impl TryFrom<CommentRow> for Comment {
    type Error = anyhow::Error;

    fn try_from(row: CommentRow) -> Result<Self> {
        Ok(Comment {
            id: parse_id(&row.id, "comment")?,
            article_id: parse_id(&row.article_id, "article")?,
            created_at: parse_timestamp(&row.created_at, &row.id)?,
            user: Author {
                id: parse_id(&row.user_id, "user")?,
                nickname: row.nickname,
            },
            content: row.content,
        })
    }
}

pub struct NewComment {
    pub id: String,
    pub article_id: String,
    pub user_id: String,
    pub content: String,
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("corrupt {what} id '{raw}'"))
}

fn parse_timestamp(raw: &str, row_id: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .with_context(|| format!("corrupt created_at '{raw}' on row '{row_id}'"))
}
