use serde::Deserialize;

use hbnb_core::config::{Config, split_list};

/// API service configuration, read from the environment (and `.env`).
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Redis URL for two-factor codes. In-process store when unset.
    pub redis_url: Option<String>,
    /// SMTP relay host. Codes are only logged when unset.
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// `From:` mailbox, e.g. `HBnB <no-reply@hbnb.test>`.
    pub mail_from: Option<String>,
    /// Directory for uploaded images and avatars, served at `/uploads`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Comma-separated origins, or `*`.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,
}

impl Config for ApiConfig {}

fn default_api_port() -> u16 {
    3110
}

fn default_smtp_port() -> u16 {
    587
}

fn default_upload_dir() -> String {
    "uploads".to_owned()
}

fn default_cors_allowed_origins() -> String {
    "*".to_owned()
}

/// SMTP relay settings, present only when `SMTP_HOST` is configured.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl ApiConfig {
    pub fn smtp(&self) -> Option<SmtpSettings> {
        let host = self.smtp_host.clone()?;
        let username = self.smtp_username.clone().unwrap_or_default();
        let from = self
            .mail_from
            .clone()
            .unwrap_or_else(|| format!("HBnB <{username}>"));
        Some(SmtpSettings {
            host,
            port: self.smtp_port,
            username,
            password: self.smtp_password.clone().unwrap_or_default(),
            from,
        })
    }

    /// `None` means any origin.
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        let origins = split_list(&self.cors_allowed_origins);
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}
