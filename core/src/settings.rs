//! Process-wide configuration: service address and account credentials.
//!
//! Read from the environment, after an optional `.env` file in the working
//! directory has been loaded.

use secrecy::{ExposeSecret, Secret};

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";

pub const BASE_URL_VAR: &str = "PETFRIENDS_BASE_URL";
pub const EMAIL_VAR: &str = "PETFRIENDS_EMAIL";
pub const PASSWORD_VAR: &str = "PETFRIENDS_PASSWORD";

/// Email and password of a PetFriends account.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    password: Secret<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Secret::new(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

#[derive(Debug)]
pub struct Settings {
    pub base_url: String,
    pub credentials: Credentials,
}

impl Settings {
    pub fn from_env() -> Result<Self, ApiError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source. Blank values count
    /// as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let base_url = get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let email = get(EMAIL_VAR).ok_or(ApiError::MissingSetting(EMAIL_VAR))?;
        let password = get(PASSWORD_VAR).ok_or(ApiError::MissingSetting(PASSWORD_VAR))?;
        Ok(Self {
            base_url,
            credentials: Credentials::new(email, password),
        })
    }
}
