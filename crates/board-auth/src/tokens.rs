use board_types::api::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use thiserror::Error;
use uuid::Uuid;

use crate::cookies::{ACCESS_COOKIE, SetCookie, REFRESH_COOKIE};

pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 60 * 60 * 24 * 30;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("access and refresh tokens must use different secrets")]
    SharedSecret,

    #[error("token lifetime must be positive")]
    InvalidLifetime,

    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("failed to encode token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn cookie_name(self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_COOKIE,
            TokenKind::Refresh => REFRESH_COOKIE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_secret: String,
    pub refresh_ttl_secs: i64,
    pub cookie_domain: String,
    /// Mark session cookies `Secure` (HTTPS deployments).
    pub cookie_secure: bool,
}

/// A signed token and the cookie it should be delivered in.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub cookie: SetCookie,
}

/// Signs and verifies the access/refresh JWT pair. Each kind has its own
/// secret, so a refresh token is never accepted where an access token is
/// expected and vice versa.
#[derive(Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        if config.access_secret == config.refresh_secret {
            return Err(TokenError::SharedSecret);
        }
        if config.access_ttl_secs <= 0 || config.refresh_ttl_secs <= 0 {
            return Err(TokenError::InvalidLifetime);
        }
        Ok(Self { config })
    }

    pub fn cookie_domain(&self) -> &str {
        &self.config.cookie_domain
    }

    pub fn ttl_secs(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.config.access_ttl_secs,
            TokenKind::Refresh => self.config.refresh_ttl_secs,
        }
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.config.access_secret.as_bytes(),
            TokenKind::Refresh => self.config.refresh_secret.as_bytes(),
        }
    }

    /// Sign `{id, nickname}` for `kind` and wrap it in its session cookie.
    pub fn issue(&self, kind: TokenKind, user_id: Uuid, nickname: &str) -> Result<IssuedToken, TokenError> {
        let ttl = self.ttl_secs(kind);
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            nickname: nickname.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(ttl)).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )
        .map_err(TokenError::Encode)?;

        let cookie = SetCookie::session(kind.cookie_name(), token.clone(), self.cookie_domain(), ttl)
            .with_secure(self.config.cookie_secure);
        Ok(IssuedToken { token, cookie })
    }

    pub fn decode(&self, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret(kind)),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;
        Ok(data.claims)
    }

    /// Cookie that clears the session cookie for `kind`.
    pub fn logoff_cookie(&self, kind: TokenKind) -> SetCookie {
        SetCookie::logoff(kind.cookie_name(), self.cookie_domain()).with_secure(self.config.cookie_secure)
    }
}
