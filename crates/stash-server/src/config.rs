use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub token_ttl_minutes: i64,
    pub admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("STASH_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("STASH_JWT_SECRET is unset or still a placeholder");
        }

        let db_path = get("STASH_DB_PATH").unwrap_or_else(|| "stash.db".into()).into();
        let host = get("STASH_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("STASH_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("STASH_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let token_ttl_minutes: i64 = get("STASH_TOKEN_EXPIRES_MINUTES")
            .map(|v| v.parse())
            .transpose()
            .context("STASH_TOKEN_EXPIRES_MINUTES must be an integer")?
            .unwrap_or(30);
        if token_ttl_minutes <= 0 {
            bail!("STASH_TOKEN_EXPIRES_MINUTES must be positive");
        }

        let admin = match (get("STASH_ADMIN_EMAIL"), get("STASH_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        };

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            token_ttl_minutes,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let cfg = load(&[("STASH_JWT_SECRET", "s3cr3t")]).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("stash.db"));
        assert_eq!(cfg.addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(cfg.token_ttl_minutes, 30);
        assert!(cfg.admin.is_none());
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(load(&[]).is_err());
        assert!(load(&[("STASH_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn overrides_and_admin_pair() {
        let cfg = load(&[
            ("STASH_JWT_SECRET", "s3cr3t"),
            ("STASH_HOST", "127.0.0.1"),
            ("STASH_PORT", "9000"),
            ("STASH_TOKEN_EXPIRES_MINUTES", "5"),
            ("STASH_ADMIN_EMAIL", "root@example.com"),
            ("STASH_ADMIN_PASSWORD", "pw"),
        ])
        .unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.token_ttl_minutes, 5);
        assert_eq!(cfg.admin, Some(("root@example.com".into(), "pw".into())));
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(load(&[("STASH_JWT_SECRET", "s"), ("STASH_PORT", "http")]).is_err());
        assert!(load(&[("STASH_JWT_SECRET", "s"), ("STASH_TOKEN_EXPIRES_MINUTES", "0")]).is_err());
    }
}
