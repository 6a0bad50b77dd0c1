use crate::backend::AppwriteConfig;
use std::{
    env,
    num::{NonZeroU32, NonZeroUsize},
};
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_LOGIN_QUOTA: NonZeroU32 = NonZeroU32::new(10).unwrap();
const DEFAULT_MAX_CONCURRENT_REQUESTS: NonZeroUsize = NonZeroUsize::new(64).unwrap();

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set when SNAPGRAM_BACKEND=appwrite")]
    Missing(&'static str),

    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub enum BackendKind {
    Appwrite(AppwriteConfig),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub backend: BackendKind,
    /// Signs memory-backend session tokens
    pub session_secret: String,
    /// Session creations allowed per minute by the memory backend
    pub login_quota: NonZeroU32,
    pub max_concurrent_requests: NonZeroUsize,
}

impl Config {
    /// Read configuration from the process environment (after `.env` has
    /// been loaded by the caller).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            get(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let backend = match get("SNAPGRAM_BACKEND").as_deref().unwrap_or("memory") {
            "appwrite" => BackendKind::Appwrite(AppwriteConfig {
                endpoint: required("APPWRITE_URL")?,
                project_id: required("APPWRITE_PROJECT_ID")?,
                database_id: required("APPWRITE_DATABASE_ID")?,
                user_collection_id: required("APPWRITE_USER_COLLECTION_ID")?,
                post_collection_id: required("APPWRITE_POST_COLLECTION_ID")?,
                saves_collection_id: required("APPWRITE_SAVES_COLLECTION_ID")?,
            }),
            "memory" => BackendKind::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "SNAPGRAM_BACKEND",
                    message: format!("expected appwrite or memory, got {other:?}"),
                });
            }
        };

        let session_secret = get("SNAPGRAM_SESSION_SECRET").unwrap_or_else(|| {
            warn!("SNAPGRAM_SESSION_SECRET not set, sessions will not survive a restart");
            uuid::Uuid::new_v4().to_string()
        });

        Ok(Self {
            addr: get("SNAPGRAM_ADDR").unwrap_or_else(|| {
                info!("SNAPGRAM_ADDR not set, using default: {DEFAULT_ADDR}");
                DEFAULT_ADDR.to_string()
            }),
            backend,
            session_secret,
            login_quota: parse(&get, "SNAPGRAM_LOGIN_QUOTA", DEFAULT_LOGIN_QUOTA)?,
            max_concurrent_requests: parse(
                &get,
                "SNAPGRAM_MAX_CONCURRENT_REQUESTS",
                DEFAULT_MAX_CONCURRENT_REQUESTS,
            )?,
        })
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
