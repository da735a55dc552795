use tracing::{debug, info};
use uuid::Uuid;

use board_auth::cookies::SetCookie;
use board_auth::password::hash_secret;
use board_auth::tokens::{IssuedToken, TokenIssuer, TokenKind};
use board_db::models::{NewUser, UserRow};
use board_types::api::{Claims, LoginRequest, SessionUser, SignupRequest};
use board_types::models::UserProfile;

use crate::error::ApiError;
use crate::service::UserService;
use crate::service::require_text;

const MIN_PASSWORD_LEN: usize = 8;

/// Outcome of a login or refresh: who is signed in, and the cookies to set.
#[derive(Debug)]
pub struct Session {
    pub user: SessionUser,
    pub cookies: Vec<SetCookie>,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: UserService, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Unknown email and wrong password fail identically.
    pub fn validate_credentials(&self, email: &str, password: &str) -> Result<UserRow, ApiError> {
        let user = self.users.find_by_email(email)?;
        self.users.verify_password(password, &user.password)?;
        Ok(user)
    }

    pub fn signup(&self, req: SignupRequest) -> Result<UserProfile, ApiError> {
        if !req.email.contains('@') {
            return Err(ApiError::BadRequest("email is not valid".into()));
        }
        require_text("email", &req.email, 100)?;
        require_text("name", &req.name, 50)?;
        require_text("nickname", &req.nickname, 20)?;
        require_text("phone", &req.phone, 20)?;
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::BadRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let id = Uuid::new_v4();
        let user = NewUser {
            id: id.to_string(),
            email: req.email,
            name: req.name,
            nickname: req.nickname,
            password: hash_secret(&req.password)?,
            phone: req.phone,
        };

        self.users.create(&user)?;
        info!("User {} ({}) signed up", user.nickname, id);

        self.users.find_by_id(id)
    }

    pub fn issue_access_token(&self, user_id: Uuid, nickname: &str) -> Result<IssuedToken, ApiError> {
        Ok(self.tokens.issue(TokenKind::Access, user_id, nickname)?)
    }

    pub fn issue_refresh_token(&self, user_id: Uuid, nickname: &str) -> Result<IssuedToken, ApiError> {
        Ok(self.tokens.issue(TokenKind::Refresh, user_id, nickname)?)
    }

    pub fn logoff_cookie(&self, kind: TokenKind) -> SetCookie {
        self.tokens.logoff_cookie(kind)
    }

    fn logoff_cookies(&self) -> Vec<SetCookie> {
        vec![
            self.logoff_cookie(TokenKind::Access),
            self.logoff_cookie(TokenKind::Refresh),
        ]
    }

    /// Check credentials, issue both tokens and remember the refresh token's
    /// hash for later rotation.
    pub fn login(&self, req: LoginRequest) -> Result<Session, ApiError> {
        let user = self.validate_credentials(&req.email, &req.password)?;
        let id = user.uuid()?;

        let access = self.issue_access_token(id, &user.nickname)?;
        let refresh = self.issue_refresh_token(id, &user.nickname)?;
        self.users.set_refresh_token(id, &refresh.token)?;

        info!("User {} ({}) logged in", user.nickname, id);
        Ok(Session {
            user: SessionUser {
                id,
                nickname: user.nickname,
            },
            cookies: vec![access.cookie, refresh.cookie],
        })
    }

    /// Mint a new access token from a raw refresh token. The token must both
    /// verify under the refresh secret and match the stored hash.
    pub fn refresh(&self, raw_refresh: &str) -> Result<Session, ApiError> {
        let claims = self.tokens.decode(TokenKind::Refresh, raw_refresh)?;

        let user = self
            .users
            .match_refresh_token(raw_refresh, claims.id, &claims.nickname)?
            .ok_or(ApiError::Unauthorized)?;

        let access = self.issue_access_token(claims.id, &user.nickname)?;
        debug!("Access token refreshed for {}", claims.id);

        Ok(Session {
            user: SessionUser {
                id: claims.id,
                nickname: user.nickname,
            },
            cookies: vec![access.cookie],
        })
    }

    /// Decode an access token and confirm its account is still active. Used
    /// by the auth middleware, so a withdrawn account's unexpired token is
    /// refused.
    pub fn authenticate(&self, access_token: &str) -> Result<Claims, ApiError> {
        let claims = self.tokens.decode(TokenKind::Access, access_token)?;
        self.active_row(claims.id)?;
        Ok(claims)
    }

    /// A missing or deactivated account is `Unauthorized`; store failures
    /// pass through untouched.
    fn active_row(&self, user_id: Uuid) -> Result<UserRow, ApiError> {
        match self.users.find_row(user_id) {
            Err(ApiError::NotFound(_)) => Err(ApiError::Unauthorized),
            other => other,
        }
    }

    /// Forget the refresh token and return cookies that clear both tokens.
    pub fn logout(&self, user_id: Uuid) -> Result<Vec<SetCookie>, ApiError> {
        self.users.remove_refresh_token(user_id)?;
        info!("User {} logged out", user_id);
        Ok(self.logoff_cookies())
    }

    /// Deactivate the account (email freed, refresh hash cleared, row
    /// soft-deleted, all atomically) and return clearing cookies.
    pub fn deactivate(&self, user_id: Uuid) -> Result<Vec<SetCookie>, ApiError> {
        self.users.deactivate(user_id)?;
        Ok(self.logoff_cookies())
    }

    pub fn whoami(&self, user_id: Uuid) -> Result<SessionUser, ApiError> {
        let row = self.active_row(user_id)?;
        Ok(SessionUser {
            id: user_id,
            nickname: row.nickname,
        })
    }

    pub fn info(&self, user_id: Uuid) -> Result<UserProfile, ApiError> {
        self.users.find_by_id(user_id)
    }
}
