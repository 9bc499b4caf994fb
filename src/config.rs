//! Application configuration via environment variables.

use std::env;
use std::fmt;

use axum::http::HeaderValue;

/// Default prefix for every auth route.
pub const DEFAULT_BASE_PATH: &str = "/auth";

/// URL prefix under which the auth routes are mounted.
///
/// Either empty (routes at the root) or a path starting with `/` and never
/// ending with one, so joining a `/`-prefixed suffix yields exactly one
/// slash at the seam.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasePath(String);

impl BasePath {
    /// Validate and normalize a base path.
    ///
    /// Trailing slashes are stripped and `/` collapses to the root prefix.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBasePath {
            value: raw.into(),
            reason: reason.into(),
        };

        if raw.is_empty() {
            return Ok(Self::root());
        }
        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        if raw.contains(['{', '}', '*', '?', '#']) {
            return Err(invalid("must not contain route wildcards, query or fragment"));
        }

        let trimmed = raw.trim_end_matches('/');
        if trimmed.contains("//") {
            return Err(invalid("must not contain empty segments"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Routes mounted directly at `/`.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a route suffix. `suffix` must begin with `/`.
    pub fn join(&self, suffix: &str) -> String {
        debug_assert!(suffix.starts_with('/'));
        format!("{}{}", self.0, suffix)
    }
}

impl fmt::Display for BasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_path: BasePath,
    pub port: u16,
    pub frontend_url: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; malformed values are rejected rather than
    /// silently replaced.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_path = BasePath::parse(
            &env::var("AUTH_BASE_PATH").unwrap_or_else(|_| DEFAULT_BASE_PATH.into()),
        )?;

        let port = match env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidPort(v))?,
            Err(_) => 3001,
        };

        let frontend_url = env::var("FRONTEND_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| match HeaderValue::from_str(&v) {
                Ok(_) => Ok(v),
                Err(_) => Err(ConfigError::InvalidFrontendUrl(v)),
            })
            .transpose()?;

        Ok(Self {
            base_path,
            port,
            frontend_url,
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Configuration for testing with the given base path.
    pub fn with_base_path(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_path: BasePath::parse(raw)?,
            ..Self::test_default()
        })
    }
}

/// Configuration for testing, all fields settable directly.
impl Config {
    pub fn test_default() -> Self {
        Self {
            base_path: BasePath(DEFAULT_BASE_PATH.into()),
            port: 3001,
            frontend_url: None,
            log_json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base path {value:?}: {reason}")]
    InvalidBasePath { value: String, reason: String },

    #[error("invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("invalid FRONTEND_URL value: {0}")]
    InvalidFrontendUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_creates_valid_config() {
        let cfg = Config::test_default();
        assert_eq!(cfg.base_path.as_str(), "/auth");
        assert_eq!(cfg.port, 3001);
        assert!(cfg.frontend_url.is_none());
        assert!(!cfg.log_json);
    }

    #[test]
    fn test_base_path_strips_trailing_slashes() {
        assert_eq!(BasePath::parse("/auth/").unwrap().as_str(), "/auth");
        assert_eq!(BasePath::parse("/auth///").unwrap().as_str(), "/auth");
        assert_eq!(BasePath::parse("/api/v1/auth").unwrap().as_str(), "/api/v1/auth");
    }

    #[test]
    fn test_base_path_root() {
        assert_eq!(BasePath::parse("").unwrap(), BasePath::root());
        assert_eq!(BasePath::parse("/").unwrap(), BasePath::root());
        assert_eq!(BasePath::root().to_string(), "/");
        assert_eq!(BasePath::root().join("/isloggedin"), "/isloggedin");
    }

    #[test]
    fn test_base_path_join_single_slash() {
        let base = BasePath::parse("/auth/").unwrap();
        assert_eq!(base.join("/login/callback"), "/auth/login/callback");
    }

    #[test]
    fn test_base_path_rejects_relative() {
        let err = BasePath::parse("auth").unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_base_path_rejects_wildcards_and_gaps() {
        assert!(BasePath::parse("/auth/{tenant}").is_err());
        assert!(BasePath::parse("/auth/*rest").is_err());
        assert!(BasePath::parse("/auth?x=1").is_err());
        assert!(BasePath::parse("/a//b").is_err());
        assert!(BasePath::parse("/my auth").is_err());
    }

    #[test]
    fn test_with_base_path() {
        let cfg = Config::with_base_path("/sso/").unwrap();
        assert_eq!(cfg.base_path.as_str(), "/sso");
        assert_eq!(cfg.port, 3001);
    }
}
