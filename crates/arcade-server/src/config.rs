use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub cache_ttl_secs: u64,
    pub premium_pass_price: i64,
    pub admin_usernames: HashSet<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("ARCADE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("ARCADE_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = std::env::var("ARCADE_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("ARCADE_PORT is not a valid port")?;
        let cache_ttl_secs: u64 = std::env::var("ARCADE_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .context("ARCADE_CACHE_TTL_SECS is not a number")?;
        let premium_pass_price: i64 = std::env::var("ARCADE_PREMIUM_PASS_PRICE")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .context("ARCADE_PREMIUM_PASS_PRICE is not a number")?;
        if premium_pass_price < 0 {
            bail!("ARCADE_PREMIUM_PASS_PRICE must not be negative");
        }

        Ok(Self {
            host: std::env::var("ARCADE_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            db_path: std::env::var("ARCADE_DB_PATH")
                .unwrap_or_else(|_| "arcade.db".into())
                .into(),
            jwt_secret,
            cache_ttl_secs,
            premium_pass_price,
            admin_usernames: parse_list(&std::env::var("ARCADE_ADMIN_USERNAMES").unwrap_or_default()),
        })
    }
}

fn parse_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
