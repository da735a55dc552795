use anyhow::Result;
use rusqlite::Row;

use crate::{Database, OptionalExt};
use crate::models::{CommentRow, NewComment};
use crate::store::CommentStore;

const COMMENT_SELECT: &str = "SELECT c.id, c.article_id, c.user_id, u.nickname, c.content, c.created_at
     FROM comments c
     JOIN users u ON c.user_id = u.id";

impl CommentStore for Database {
    fn insert_comment(&self, comment: &NewComment) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, article_id, user_id, content) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![comment.id, comment.article_id, comment.user_id, comment.content],
            )?;
            Ok(())
        })
    }

    fn find_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.id = ?1 AND c.deleted_at IS NULL"
            ))?;
            let row = stmt.query_row([id], map_comment).optional()?;
            Ok(row)
        })
    }

    fn list_comments(&self, article_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT}
                 WHERE c.article_id = ?1 AND c.deleted_at IS NULL
                 ORDER BY c.created_at, c.rowid"
            ))?;
            let rows = stmt
                .query_map([article_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn list_comments_page(&self, article_id: &str, offset: u64, limit: u32) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT}
                 WHERE c.article_id = ?1 AND c.deleted_at IS NULL
                 ORDER BY c.created_at, c.rowid
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![article_id, limit, offset], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn count_comments(&self, article_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE article_id = ?1 AND deleted_at IS NULL",
                [article_id],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }

    fn update_comment(
        &self,
        user_id: &str,
        article_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET content = ?1
                 WHERE id = ?2 AND article_id = ?3 AND user_id = ?4 AND deleted_at IS NULL",
                [content, comment_id, article_id, user_id],
            )?;
            Ok(changed)
        })
    }

    fn delete_comment(&self, user_id: &str, article_id: &str, comment_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET deleted_at = datetime('now')
                 WHERE id = ?1 AND article_id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
                [comment_id, article_id, user_id],
            )?;
            Ok(changed)
        })
    }
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        article_id: row.get(1)?,
        user_id: row.get(2)?,
        nickname: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articles::tests::new_article;
    use crate::store::{ArticleStore, UserStore};
    use crate::users::tests::new_user;

    fn comment(id: &str, article_id: &str, user_id: &str, content: &str) -> NewComment {
        NewComment {
            id: id.to_string(),
            article_id: article_id.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("u1", "a@x.io", "alice")).unwrap();
        db.insert_user(&new_user("u2", "b@x.io", "bob")).unwrap();
        db.insert_article(&new_article("a1", "u1")).unwrap();
        db.insert_article(&new_article("a2", "u1")).unwrap();
        db
    }

    #[test]
    fn list_is_scoped_to_article_and_skips_deleted() {
        let db = seeded();
        db.insert_comment(&comment("c1", "a1", "u1", "first")).unwrap();
        db.insert_comment(&comment("c2", "a1", "u2", "second")).unwrap();
        db.insert_comment(&comment("c3", "a2", "u2", "elsewhere")).unwrap();

        let rows = db.list_comments("a1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content, "first");
        assert_eq!(rows[1].nickname, "bob");

        assert_eq!(db.delete_comment("u1", "a1", "c1").unwrap(), 1);
        let rows = db.list_comments("a1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(db.count_comments("a1").unwrap(), 1);
        assert!(db.find_comment("c1").unwrap().is_none());
        assert_eq!(db.find_comment("c2").unwrap().unwrap().nickname, "bob");
    }

    #[test]
    fn mismatched_keys_touch_nothing() {
        let db = seeded();
        db.insert_comment(&comment("c1", "a1", "u1", "mine")).unwrap();

        // wrong user, wrong article, wrong id
        assert_eq!(db.update_comment("u2", "a1", "c1", "hijack").unwrap(), 0);
        assert_eq!(db.update_comment("u1", "a2", "c1", "moved").unwrap(), 0);
        assert_eq!(db.delete_comment("u1", "a1", "nope").unwrap(), 0);

        assert_eq!(db.list_comments("a1").unwrap()[0].content, "mine");

        assert_eq!(db.update_comment("u1", "a1", "c1", "edited").unwrap(), 1);
        assert_eq!(db.list_comments("a1").unwrap()[0].content, "edited");
    }

    #[test]
    fn page_slices_in_order() {
        let db = seeded();
        for i in 0..13 {
            db.insert_comment(&comment(&format!("c{i:02}"), "a1", "u2", &format!("#{i}")))
                .unwrap();
        }

        let page = db.list_comments_page("a1", 10, 10).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].content, "#10");
    }
}
