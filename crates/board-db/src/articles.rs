use anyhow::Result;
use rusqlite::Row;

use crate::models::{ArticleChanges, ArticleRow, NewArticle};
use crate::store::ArticleStore;
use crate::{Database, OptionalExt};

// JOIN users to fetch the author's nickname in the same query
const ARTICLE_SELECT: &str = "SELECT a.id, a.user_id, u.nickname, a.title, a.content, a.image, a.created_at
     FROM articles a
     JOIN users u ON a.user_id = u.id";

impl ArticleStore for Database {
    fn insert_article(&self, article: &NewArticle) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO articles (id, user_id, title, content, image) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    article.id,
                    article.user_id,
                    article.title,
                    article.content,
                    article.image
                ],
            )?;
            Ok(())
        })
    }

    fn find_article(&self, id: &str) -> Result<Option<ArticleRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{ARTICLE_SELECT} WHERE a.id = ?1 AND a.deleted_at IS NULL"
            ))?;
            let row = stmt.query_row([id], map_article).optional()?;
            Ok(row)
        })
    }

    fn list_articles(&self, offset: u64, limit: u32) -> Result<Vec<ArticleRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{ARTICLE_SELECT}
                 WHERE a.deleted_at IS NULL
                 ORDER BY a.created_at DESC, a.rowid DESC
                 LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset], map_article)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn count_articles(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM articles WHERE deleted_at IS NULL",
                [],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }

    fn list_articles_by_user(&self, user_id: &str, offset: u64, limit: u32) -> Result<Vec<ArticleRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{ARTICLE_SELECT}
                 WHERE a.user_id = ?1 AND a.deleted_at IS NULL
                 ORDER BY a.created_at DESC, a.rowid DESC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit, offset], map_article)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn count_articles_by_user(&self, user_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM articles WHERE user_id = ?1 AND deleted_at IS NULL",
                [user_id],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }

    fn update_article(&self, user_id: &str, id: &str, changes: &ArticleChanges) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE articles SET
                    title = COALESCE(?1, title),
                    content = COALESCE(?2, content),
                    image = COALESCE(?3, image)
                 WHERE id = ?4 AND user_id = ?5 AND deleted_at IS NULL",
                rusqlite::params![changes.title, changes.content, changes.image, id, user_id],
            )?;
            Ok(changed)
        })
    }

    fn delete_article(&self, user_id: &str, id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE articles SET deleted_at = datetime('now')
                 WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
                [id, user_id],
            )?;
            Ok(changed)
        })
    }
}

fn map_article(row: &Row<'_>) -> rusqlite::Result<ArticleRow> {
    Ok(ArticleRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        nickname: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        image: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::UserStore;
    use crate::users::tests::new_user;

    pub(crate) fn new_article(id: &str, user_id: &str) -> NewArticle {
        NewArticle {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: format!("title {id}"),
            content: "body".to_string(),
            image: None,
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("u1", "a@x.io", "alice")).unwrap();
        db.insert_user(&new_user("u2", "b@x.io", "bob")).unwrap();
        db
    }

    #[test]
    fn listing_is_newest_first_and_paged() {
        let db = seeded();
        for i in 0..12 {
            let owner = if i % 2 == 0 { "u1" } else { "u2" };
            db.insert_article(&new_article(&format!("a{i}"), owner)).unwrap();
        }

        assert_eq!(db.count_articles().unwrap(), 12);
        let first = db.list_articles(0, 10).unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].id, "a11");
        assert_eq!(first[0].nickname, "bob");

        let second = db.list_articles(10, 10).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].id, "a0");

        assert_eq!(db.count_articles_by_user("u1").unwrap(), 6);
        let mine = db.list_articles_by_user("u1", 0, 10).unwrap();
        assert!(mine.iter().all(|a| a.user_id == "u1"));
    }

    #[test]
    fn only_owner_can_update_or_delete() {
        let db = seeded();
        db.insert_article(&new_article("a1", "u1")).unwrap();

        let changes = ArticleChanges {
            title: Some("edited".into()),
            ..Default::default()
        };
        assert_eq!(db.update_article("u2", "a1", &changes).unwrap(), 0);
        assert_eq!(db.update_article("u1", "a1", &changes).unwrap(), 1);
        assert_eq!(db.find_article("a1").unwrap().unwrap().title, "edited");

        assert_eq!(db.delete_article("u2", "a1").unwrap(), 0);
        assert_eq!(db.delete_article("u1", "a1").unwrap(), 1);
        assert!(db.find_article("a1").unwrap().is_none());
        assert_eq!(db.count_articles().unwrap(), 0);
    }
}
