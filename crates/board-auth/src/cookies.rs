use cookie::{Cookie, SameSite, time::Duration};

/// Cookie carrying the short-lived access token.
pub const ACCESS_COOKIE: &str = "accessToken";

/// Cookie carrying the long-lived refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Attributes of a session cookie. The API layer adds the rendered
/// [`Cookie`] to its response jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: &'static str,
    pub value: String,
    pub domain: String,
    pub path: &'static str,
    pub http_only: bool,
    pub secure: bool,
    pub max_age_secs: i64,
}

impl SetCookie {
    pub fn session(name: &'static str, value: String, domain: &str, max_age_secs: i64) -> Self {
        Self {
            name,
            value,
            domain: domain.to_string(),
            path: "/",
            http_only: true,
            secure: false,
            max_age_secs,
        }
    }

    /// Same name, domain and path as the session cookie with max-age 0, so
    /// the browser drops it.
    pub fn logoff(name: &'static str, domain: &str) -> Self {
        Self::session(name, String::new(), domain, 0)
    }

    /// Only send over HTTPS.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name, self.value.clone()))
            .domain(self.domain.clone())
            .path(self.path)
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(self.max_age_secs))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = SetCookie::session(ACCESS_COOKIE, "abc.def".into(), "board.test", 3600).to_cookie();
        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.value(), "abc.def");
        assert_eq!(cookie.domain(), Some("board.test"));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));
        assert!(!cookie.secure().unwrap_or(false));
    }

    #[test]
    fn logoff_expires_immediately() {
        let cookie = SetCookie::logoff(REFRESH_COOKIE, "board.test").to_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(cookie.to_string().contains("Max-Age=0"));
    }

    #[test]
    fn secure_flag_is_rendered() {
        let cookie = SetCookie::session(ACCESS_COOKIE, "t".into(), "board.test", 60)
            .with_secure(true)
            .to_cookie();
        assert_eq!(cookie.secure(), Some(true));
        assert!(cookie.to_string().contains("Secure"));
    }
}
