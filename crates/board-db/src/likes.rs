use anyhow::Result;
use board_types::models::{LikeKind, LikeTarget};
use uuid::Uuid;

use crate::store::LikeStore;
use crate::{Database, OptionalExt};

/// Table and target column for each like kind. Static strings only, so the
/// formatted SQL below never carries caller input.
fn like_table(kind: LikeKind) -> (&'static str, &'static str) {
    match kind {
        LikeKind::Article => ("article_likes", "article_id"),
        LikeKind::Comment => ("comment_likes", "comment_id"),
        LikeKind::Place => ("place_likes", "place_id"),
    }
}

impl LikeStore for Database {
    fn toggle_like(&self, user_id: &str, target: LikeTarget) -> Result<bool> {
        let (table, column) = like_table(target.kind);
        let target_id = target.id.to_string();

        self.with_tx(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    &format!("SELECT id FROM {table} WHERE {column} = ?1 AND user_id = ?2"),
                    [target_id.as_str(), user_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [&existing_id])?;
                Ok(false)
            } else {
                let like_id = Uuid::new_v4().to_string();
                conn.execute(
                    &format!("INSERT INTO {table} (id, {column}, user_id) VALUES (?1, ?2, ?3)"),
                    [like_id.as_str(), target_id.as_str(), user_id],
                )?;
                Ok(true)
            }
        })
    }

    fn count_likes(&self, target: LikeTarget) -> Result<u64> {
        let (table, column) = like_table(target.kind);

        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"),
                [target.id.to_string()],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserStore;
    use crate::users::tests::new_user;

    #[test]
    fn toggle_flips_and_counts_per_target() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("u1", "a@x.io", "alice")).unwrap();
        db.insert_user(&new_user("u2", "b@x.io", "bob")).unwrap();

        let place = LikeTarget {
            kind: LikeKind::Place,
            id: Uuid::new_v4(),
        };

        assert!(db.toggle_like("u1", place).unwrap());
        assert!(db.toggle_like("u2", place).unwrap());
        assert_eq!(db.count_likes(place).unwrap(), 2);

        assert!(!db.toggle_like("u1", place).unwrap());
        assert_eq!(db.count_likes(place).unwrap(), 1);

        let other = LikeTarget {
            kind: LikeKind::Place,
            id: Uuid::new_v4(),
        };
        assert_eq!(db.count_likes(other).unwrap(), 0);
    }
}
