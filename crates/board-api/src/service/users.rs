use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use board_auth::password::{hash_secret, verify_secret};
use board_db::UserStore;
use board_db::models::{NewUser, ProfileChanges, ProfileOutcome, SignupOutcome, UserRow};
use board_types::api::EditProfileRequest;
use board_types::models::UserProfile;

use crate::error::ApiError;
use crate::service::require_text;

/// Appended to the email of a deactivated account.
pub const LOGOFF_EMAIL_SUFFIX: &str = "logoff";

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn find_all(&self) -> Result<Vec<UserProfile>, ApiError> {
        let rows = self.store.list_users()?;
        Ok(rows.iter().map(UserRow::to_profile).collect::<anyhow::Result<_>>()?)
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<UserProfile, ApiError> {
        Ok(self.find_row(id)?.to_profile()?)
    }

    pub(crate) fn find_row(&self, id: Uuid) -> Result<UserRow, ApiError> {
        self.store
            .find_user_by_id(&id.to_string())?
            .ok_or(ApiError::NotFound("user"))
    }

    /// Active account by email. Absence is `Unauthorized`, as this only backs
    /// credential checks.
    pub fn find_by_email(&self, email: &str) -> Result<UserRow, ApiError> {
        self.store.find_user_by_email(email)?.ok_or(ApiError::Unauthorized)
    }

    /// Insert a new account; email and nickname uniqueness is checked in the
    /// same transaction as the insert.
    pub fn create(&self, user: &NewUser) -> Result<(), ApiError> {
        match self.store.insert_user(user)? {
            SignupOutcome::Created => Ok(()),
            SignupOutcome::EmailTaken => Err(ApiError::Conflict("email")),
            SignupOutcome::NicknameTaken => Err(ApiError::Conflict("nickname")),
        }
    }

    pub fn verify_password(&self, plain: &str, hash: &str) -> Result<(), ApiError> {
        if verify_secret(plain, hash)? {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    /// Persist a salted hash of the raw refresh token.
    pub fn set_refresh_token(&self, id: Uuid, raw_token: &str) -> Result<(), ApiError> {
        let hash = hash_secret(raw_token)?;
        if !self.store.set_refresh_token_hash(&id.to_string(), Some(&hash))? {
            return Err(ApiError::NotFound("user"));
        }
        Ok(())
    }

    /// `Ok(None)` when the stored hash is missing or does not match; callers
    /// must treat that as an authentication failure.
    pub fn match_refresh_token(
        &self,
        raw_token: &str,
        id: Uuid,
        nickname: &str,
    ) -> Result<Option<UserRow>, ApiError> {
        let user = self
            .store
            .find_user_by_id_and_nickname(&id.to_string(), nickname)?
            .ok_or(ApiError::Unauthorized)?;

        let Some(hash) = user.refresh_token_hash.as_deref() else {
            return Ok(None);
        };

        match verify_secret(raw_token, hash) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!("Unreadable refresh hash for user {}: {}", id, e);
                Ok(None)
            }
        }
    }

    pub fn remove_refresh_token(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.set_refresh_token_hash(&id.to_string(), None)?;
        Ok(())
    }

    /// Apply the provided fields. A nickname is rejected only when another
    /// active account already holds it.
    pub fn edit_profile(&self, id: Uuid, req: EditProfileRequest) -> Result<UserProfile, ApiError> {
        if let Some(name) = &req.name {
            require_text("name", name, 50)?;
        }
        if let Some(phone) = &req.phone {
            require_text("phone", phone, 20)?;
        }
        if let Some(nickname) = &req.nickname {
            require_text("nickname", nickname, 20)?;
        }

        let changes = ProfileChanges {
            name: req.name,
            phone: req.phone,
            nickname: req.nickname,
            image: req.image,
        };

        match self.store.update_profile(&id.to_string(), &changes)? {
            ProfileOutcome::Updated => self.find_by_id(id),
            ProfileOutcome::NicknameTaken => Err(ApiError::Conflict("nickname")),
            ProfileOutcome::NotFound => Err(ApiError::NotFound("user")),
        }
    }

    /// Soft delete: suffix the email, drop the refresh hash and mark the row
    /// deleted in one transaction. The row itself is kept.
    pub fn deactivate(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.deactivate_user(&id.to_string(), LOGOFF_EMAIL_SUFFIX)? {
            return Err(ApiError::NotFound("user"));
        }
        info!("User {} deactivated", id);
        Ok(())
    }

    pub fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        self.deactivate(id)
    }

    /// Raw lookup that also sees deactivated accounts.
    pub fn find_including_deactivated(&self, id: Uuid) -> Result<Option<UserRow>, ApiError> {
        Ok(self.store.find_user_including_deactivated(&id.to_string())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::db;
    use board_db::models::AccountState;

    fn service_with_user() -> (UserService, Uuid) {
        let users = UserService::new(db());
        let id = Uuid::new_v4();
        users
            .create(&NewUser {
                id: id.to_string(),
                email: "a@x.io".into(),
                name: "Alice".into(),
                nickname: "alice".into(),
                password: hash_secret("password1").unwrap(),
                phone: "010".into(),
            })
            .unwrap();
        (users, id)
    }

    #[test]
    fn verify_password_rejects_mismatch() {
        let (users, _) = service_with_user();
        let row = users.find_by_email("a@x.io").unwrap();
        assert!(users.verify_password("password1", &row.password).is_ok());
        assert!(matches!(
            users.verify_password("nope", &row.password),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn refresh_token_is_stored_hashed() {
        let (users, id) = service_with_user();
        users.set_refresh_token(id, "raw-refresh").unwrap();

        let row = users.find_row(id).unwrap();
        let stored = row.refresh_token_hash.unwrap();
        assert_ne!(stored, "raw-refresh");

        assert!(users.match_refresh_token("raw-refresh", id, "alice").unwrap().is_some());
    }

    #[test]
    fn refresh_mismatch_or_absence_is_none() {
        let (users, id) = service_with_user();

        // nothing stored yet
        assert!(users.match_refresh_token("raw", id, "alice").unwrap().is_none());

        users.set_refresh_token(id, "raw").unwrap();
        assert!(users.match_refresh_token("other", id, "alice").unwrap().is_none());

        users.remove_refresh_token(id).unwrap();
        assert!(users.match_refresh_token("raw", id, "alice").unwrap().is_none());
    }

    #[test]
    fn refresh_for_unknown_identity_is_unauthorized() {
        let (users, id) = service_with_user();
        assert!(matches!(
            users.match_refresh_token("raw", id, "mallory"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn edit_profile_allows_new_nickname() {
        let (users, id) = service_with_user();
        let profile = users
            .edit_profile(
                id,
                EditProfileRequest {
                    nickname: Some("ally".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(profile.nickname, "ally");
        assert_eq!(profile.name, "Alice");
    }

    #[test]
    fn edit_profile_rejects_blank_fields() {
        let (users, id) = service_with_user();
        let result = users.edit_profile(
            id,
            EditProfileRequest {
                name: Some("   ".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn remove_is_a_soft_delete() {
        let (users, id) = service_with_user();
        users.remove(id).unwrap();

        assert!(matches!(users.find_by_id(id), Err(ApiError::NotFound("user"))));
        assert!(users.find_all().unwrap().is_empty());

        let row = users.find_including_deactivated(id).unwrap().unwrap();
        assert_eq!(row.state(), AccountState::Deactivated);

        assert!(matches!(users.remove(id), Err(ApiError::NotFound("user"))));
    }

    #[test]
    fn corrupt_ids_surface_as_internal_errors() {
        let db = db();
        let users = UserService::new(db.clone());
        users
            .create(&NewUser {
                id: Uuid::new_v4().to_string(),
                email: "a@x.io".into(),
                name: "Alice".into(),
                nickname: "alice".into(),
                password: "h".into(),
                phone: "010".into(),
            })
            .unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE users SET id = 'not-a-uuid'", [])?;
            Ok(())
        })
        .unwrap();

        assert!(matches!(users.find_all(), Err(ApiError::Internal(_))));
    }
}
