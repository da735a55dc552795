use anyhow::{Context, bail};

use board_auth::tokens::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, TokenConfig};

/// JWT secrets that must never reach a running server.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub tokens: TokenConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("BOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("BOARD_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("BOARD_PORT is not a valid port")?;
        let db_path = var("BOARD_DB_PATH").unwrap_or_else(|| "board.db".into());

        let access_secret = required_secret(&var, "JWT_ACCESS_TOKEN_SECRET")?;
        let refresh_secret = required_secret(&var, "JWT_REFRESH_TOKEN_SECRET")?;
        let access_ttl_secs = ttl(&var, "JWT_ACCESS_TOKEN_EXPIRATION_TIME", DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl_secs = ttl(&var, "JWT_REFRESH_TOKEN_EXPIRATION_TIME", DEFAULT_REFRESH_TTL_SECS)?;

        // Cookies are scoped to the host the deployment shares with its database.
        let cookie_domain = var("COOKIE_DOMAIN")
            .or_else(|| var("DATABASE_HOST"))
            .unwrap_or_else(|| "localhost".into());
        let cookie_secure = var("COOKIE_SECURE").is_some_and(|v| matches!(v.as_str(), "1" | "true"));

        Ok(Self {
            host,
            port,
            db_path,
            tokens: TokenConfig {
                access_secret,
                access_ttl_secs,
                refresh_secret,
                refresh_ttl_secs,
                cookie_domain,
                cookie_secure,
            },
        })
    }
}

fn required_secret(var: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    let secret = var(key).unwrap_or_default();
    if secret.is_empty() || PLACEHOLDER_SECRETS.contains(&secret.as_str()) {
        bail!("{key} is unset or still a placeholder; set it in your .env file and restart");
    }
    Ok(secret)
}

fn ttl(var: &impl Fn(&str) -> Option<String>, key: &str, default: i64) -> anyhow::Result<i64> {
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a number of seconds")),
        None => Ok(default),
    }
}
