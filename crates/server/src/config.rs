use log::{info, warn};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read once from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Marks session cookies `Secure`
    pub in_production: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender of guest confirmations
    pub mail_from: String,
    /// Recipient of new-booking notifications
    pub owner_email: String,
    pub email_template_dir: PathBuf,
    pub session_lifetime_hours: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("PORT", "8080")?,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            in_production: try_load("IN_PRODUCTION", "false")?,
            smtp_host: try_load("SMTP_HOST", "localhost")?,
            smtp_port: try_load("SMTP_PORT", "1025")?,
            mail_from: try_load("MAIL_FROM", "me@here.com")?,
            owner_email: try_load("OWNER_EMAIL", "me@here.com")?,
            email_template_dir: try_load("EMAIL_TEMPLATE_DIR", "./email-templates")?,
            session_lifetime_hours: try_load("SESSION_LIFETIME_HOURS", "24")?,
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        warn!("{key} not set, using default: {default}");
        default.to_string()
    });

    match value.parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn optional(key: &str) -> Option<String> {
    let value = env::var(key).ok().filter(|v| !v.is_empty());
    if value.is_none() {
        info!("{key} not set");
    }

    value
}

#[cfg(test)]
mod test {
    use super::{ConfigError, try_load};

    #[test]
    fn test_default_is_parsed() {
        let port: u16 = try_load("BNB_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_invalid_default_is_reported() {
        let result: Result<u16, _> = try_load("BNB_TEST_UNSET_PORT", "eighty");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "BNB_TEST_UNSET_PORT", .. })
        ));
    }
}
