use crate::env::{
    env_opt, env_or, ROLLBAR_ACCESS_TOKEN_ENV, ROLLBAR_CODE_ROOT_ENV, ROLLBAR_ENDPOINT_ENV,
    ROLLBAR_ENVIRONMENT_ENV,
};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Construction-time settings of a [`Notifier`](crate::notifier::Notifier).
///
/// **Fields**
/// - `endpoint`: item API URL; parsed when the notifier is created.
/// - `access_token`: project token sent as `access_token`.
/// - `environment`: reported as `data.environment`.
/// - `code_root`: optional root package, reported as `server.root`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifierConfig {
    pub endpoint: String,
    pub access_token: String,
    pub environment: String,
    pub code_root: Option<String>,
}

impl NotifierConfig {
    pub fn new(access_token: impl Into<String>, environment: impl Into<String>) -> Self {
        NotifierConfig {
            access_token: access_token.into(),
            environment: environment.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn code_root(mut self, code_root: impl Into<String>) -> Self {
        self.code_root = Some(code_root.into());
        self
    }

    /// Build a config from the `ROLLBAR_*` variables in [`crate::env`],
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Self {
        NotifierConfig {
            endpoint: env_or(ROLLBAR_ENDPOINT_ENV, DEFAULT_ENDPOINT),
            access_token: env_or(ROLLBAR_ACCESS_TOKEN_ENV, ""),
            environment: env_or(ROLLBAR_ENVIRONMENT_ENV, DEFAULT_ENVIRONMENT),
            code_root: env_opt(ROLLBAR_CODE_ROOT_ENV),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        NotifierConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: String::new(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            code_root: None,
        }
    }
}

/// How often and how patiently an item is re-sent.
///
/// Defaults to 5 attempts, 1 second apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. At least 1.
    pub max_attempts: u32,
    /// Fixed delay between a failed attempt and the next one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}
