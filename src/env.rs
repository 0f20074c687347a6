//! Environment variable names understood by [`NotifierConfig::from_env`].
//!
//! These are purely helpers; the notifier itself never reads the
//! environment.
//!
//! [`NotifierConfig::from_env`]: crate::config::NotifierConfig::from_env

/// Item endpoint, e.g. `https://api.rollbar.com/api/1/item/`.
pub const ROLLBAR_ENDPOINT_ENV: &str = "ROLLBAR_ENDPOINT";

/// Project access token with `post_server_item` scope.
pub const ROLLBAR_ACCESS_TOKEN_ENV: &str = "ROLLBAR_ACCESS_TOKEN";

/// Environment name reported with every item.
pub const ROLLBAR_ENVIRONMENT_ENV: &str = "ROLLBAR_ENVIRONMENT";

/// Optional code root reported as `server.root`.
pub const ROLLBAR_CODE_ROOT_ENV: &str = "ROLLBAR_CODE_ROOT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, treating unset and empty the same.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
