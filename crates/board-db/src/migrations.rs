use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                email               TEXT NOT NULL,
                name                TEXT NOT NULL,
                nickname            TEXT NOT NULL,
                password            TEXT NOT NULL,
                phone               TEXT NOT NULL,
                image               TEXT,
                refresh_token_hash  TEXT,
                created_at          TEXT NOT NULL DEFAULT (datetime('now')),
                deleted_at          TEXT
            );

            -- Uniqueness only binds active accounts
            CREATE UNIQUE INDEX idx_users_email_active
                ON users(email) WHERE deleted_at IS NULL;
            CREATE UNIQUE INDEX idx_users_nickname_active
                ON users(nickname) WHERE deleted_at IS NULL;

            CREATE TABLE articles (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                image       TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                deleted_at  TEXT
            );

            CREATE INDEX idx_articles_user
                ON articles(user_id, created_at);

            CREATE TABLE comments (
                id          TEXT PRIMARY KEY,
                article_id  TEXT NOT NULL REFERENCES articles(id),
                user_id     TEXT NOT NULL REFERENCES users(id),
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                deleted_at  TEXT
            );

            CREATE INDEX idx_comments_article
                ON comments(article_id, created_at);

            CREATE TABLE article_likes (
                id          TEXT PRIMARY KEY,
                article_id  TEXT NOT NULL REFERENCES articles(id),
                user_id     TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(article_id, user_id)
            );

            CREATE TABLE comment_likes (
                id          TEXT PRIMARY KEY,
                comment_id  TEXT NOT NULL REFERENCES comments(id),
                user_id     TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(comment_id, user_id)
            );

            -- Places are owned by another service; only the id is kept
            CREATE TABLE place_likes (
                id          TEXT PRIMARY KEY,
                place_id    TEXT NOT NULL,
                user_id     TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(place_id, user_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
