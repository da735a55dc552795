use anyhow::Result;
use rusqlite::{Connection, Row};

use crate::models::{NewUser, ProfileChanges, ProfileOutcome, SignupOutcome, UserRow};
use crate::store::UserStore;
use crate::{Database, OptionalExt};

const USER_COLUMNS: &str = "id, email, name, nickname, password, phone, image, refresh_token_hash, created_at, deleted_at";

impl UserStore for Database {
    fn insert_user(&self, user: &NewUser) -> Result<SignupOutcome> {
        self.with_tx(|conn| {
            if active_user_exists(conn, "email", &user.email, None)? {
                return Ok(SignupOutcome::EmailTaken);
            }
            if active_user_exists(conn, "nickname", &user.nickname, None)? {
                return Ok(SignupOutcome::NicknameTaken);
            }

            conn.execute(
                "INSERT INTO users (id, email, name, nickname, password, phone)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id,
                    user.email,
                    user.name,
                    user.nickname,
                    user.password,
                    user.phone
                ],
            )?;
            Ok(SignupOutcome::Created)
        })
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1 AND deleted_at IS NULL", &[&email]))
    }

    fn find_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1 AND deleted_at IS NULL", &[&id]))
    }

    fn find_user_by_id_and_nickname(&self, id: &str, nickname: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(
                conn,
                "id = ?1 AND nickname = ?2 AND deleted_at IS NULL",
                &[&id, &nickname],
            )
        })
    }

    fn find_user_including_deactivated(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &[&id]))
    }

    fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY created_at, rowid"
            ))?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn set_refresh_token_hash(&self, id: &str, hash: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET refresh_token_hash = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                rusqlite::params![hash, id],
            )?;
            Ok(changed > 0)
        })
    }

    fn update_profile(&self, id: &str, changes: &ProfileChanges) -> Result<ProfileOutcome> {
        self.with_tx(|conn| {
            if query_user(conn, "id = ?1 AND deleted_at IS NULL", &[&id])?.is_none() {
                return Ok(ProfileOutcome::NotFound);
            }
            if let Some(nickname) = &changes.nickname {
                if active_user_exists(conn, "nickname", nickname, Some(id))? {
                    return Ok(ProfileOutcome::NicknameTaken);
                }
            }

            // COALESCE keeps the stored value for every field left as None
            conn.execute(
                "UPDATE users SET
                    name = COALESCE(?1, name),
                    phone = COALESCE(?2, phone),
                    nickname = COALESCE(?3, nickname),
                    image = COALESCE(?4, image)
                 WHERE id = ?5",
                rusqlite::params![changes.name, changes.phone, changes.nickname, changes.image, id],
            )?;
            Ok(ProfileOutcome::Updated)
        })
    }

    fn deactivate_user(&self, id: &str, email_suffix: &str) -> Result<bool> {
        self.with_tx(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    email = email || ?1,
                    refresh_token_hash = NULL,
                    deleted_at = datetime('now')
                 WHERE id = ?2 AND deleted_at IS NULL",
                rusqlite::params![email_suffix, id],
            )?;
            Ok(changed > 0)
        })
    }
}

/// `column` is always one of our own literals, never caller input.
fn active_user_exists(conn: &Connection, column: &str, value: &str, except_id: Option<&str>) -> Result<bool> {
    let sql = format!(
        "SELECT COUNT(*) FROM users WHERE {column} = ?1 AND deleted_at IS NULL AND id IS NOT ?2"
    );
    let count: i64 = conn.query_row(&sql, rusqlite::params![value, except_id], |r| r.get(0))?;
    Ok(count > 0)
}

fn query_user(conn: &Connection, filter: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {filter}"))?;
    let row = stmt.query_row(params, map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        nickname: row.get(3)?,
        password: row.get(4)?,
        phone: row.get(5)?,
        image: row.get(6)?,
        refresh_token_hash: row.get(7)?,
        created_at: row.get(8)?,
        deleted_at: row.get(9)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::AccountState;

    pub(crate) fn new_user(id: &str, email: &str, nickname: &str) -> NewUser {
        NewUser {
            id: id.to_string(),
            email: email.to_string(),
            name: "Test".to_string(),
            nickname: nickname.to_string(),
            password: "hash".to_string(),
            phone: "010-0000-0000".to_string(),
        }
    }

    fn user_count(db: &Database) -> i64 {
        db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
            .unwrap()
    }

    #[test]
    fn insert_rejects_duplicates_without_writing() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.insert_user(&new_user("a", "a@x.io", "alice")).unwrap(), SignupOutcome::Created);

        let outcome = db.insert_user(&new_user("b", "a@x.io", "bob")).unwrap();
        assert_eq!(outcome, SignupOutcome::EmailTaken);

        let outcome = db.insert_user(&new_user("c", "c@x.io", "alice")).unwrap();
        assert_eq!(outcome, SignupOutcome::NicknameTaken);

        assert_eq!(user_count(&db), 1);
    }

    #[test]
    fn deactivate_hides_user_but_keeps_row() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("a", "a@x.io", "alice")).unwrap();
        db.set_refresh_token_hash("a", Some("rt-hash")).unwrap();

        assert!(db.deactivate_user("a", "logoff").unwrap());
        assert!(!db.deactivate_user("a", "logoff").unwrap());

        assert!(db.find_user_by_email("a@x.io").unwrap().is_none());
        assert!(db.find_user_by_id("a").unwrap().is_none());

        let row = db.find_user_including_deactivated("a").unwrap().unwrap();
        assert_eq!(row.state(), AccountState::Deactivated);
        assert_eq!(row.email, "a@x.iologoff");
        assert!(row.refresh_token_hash.is_none());
    }

    #[test]
    fn deactivated_identity_can_be_reused() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("a", "a@x.io", "alice")).unwrap();
        db.deactivate_user("a", "logoff").unwrap();

        let outcome = db.insert_user(&new_user("b", "a@x.io", "alice")).unwrap();
        assert_eq!(outcome, SignupOutcome::Created);
    }

    #[test]
    fn profile_nickname_conflicts_only_with_other_users() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("a", "a@x.io", "alice")).unwrap();
        db.insert_user(&new_user("b", "b@x.io", "bob")).unwrap();

        let keep_own = ProfileChanges {
            nickname: Some("alice".into()),
            ..Default::default()
        };
        assert_eq!(db.update_profile("a", &keep_own).unwrap(), ProfileOutcome::Updated);

        let steal = ProfileChanges {
            nickname: Some("bob".into()),
            ..Default::default()
        };
        assert_eq!(db.update_profile("a", &steal).unwrap(), ProfileOutcome::NicknameTaken);

        let rename = ProfileChanges {
            nickname: Some("ally".into()),
            phone: Some("010-1111-2222".into()),
            ..Default::default()
        };
        assert_eq!(db.update_profile("a", &rename).unwrap(), ProfileOutcome::Updated);

        let row = db.find_user_by_id("a").unwrap().unwrap();
        assert_eq!(row.nickname, "ally");
        assert_eq!(row.phone, "010-1111-2222");
        assert_eq!(row.name, "Test");

        assert_eq!(
            db.update_profile("missing", &ProfileChanges::default()).unwrap(),
            ProfileOutcome::NotFound
        );
    }

    #[test]
    fn refresh_hash_is_set_and_cleared() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("a", "a@x.io", "alice")).unwrap();

        assert!(db.set_refresh_token_hash("a", Some("h1")).unwrap());
        let row = db.find_user_by_id_and_nickname("a", "alice").unwrap().unwrap();
        assert_eq!(row.refresh_token_hash.as_deref(), Some("h1"));

        assert!(db.set_refresh_token_hash("a", None).unwrap());
        let row = db.find_user_by_id("a").unwrap().unwrap();
        assert!(row.refresh_token_hash.is_none());

        assert!(db.find_user_by_id_and_nickname("a", "bob").unwrap().is_none());
        assert!(!db.set_refresh_token_hash("missing", Some("h")).unwrap());
    }
}
