//! Configuration management for the QRNG client

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Unauthenticated legacy JSON endpoint
pub const LEGACY_ENDPOINT: &str = "https://qrng.anu.edu.au/API/jsonI.php";

/// Key-authenticated endpoint
pub const AUTHENTICATED_ENDPOINT: &str = "https://api.quantumnumbers.anu.edu.au";

/// Authentication mode of a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No credential, legacy endpoint
    Legacy,
    /// `x-api-key` header credential, authenticated endpoint
    ApiKey(String),
}

impl AuthMode {
    pub fn requires_api_key(&self) -> bool {
        matches!(self, AuthMode::ApiKey(_))
    }

    /// Credential to attach, if any. Fails when the key is required but empty.
    pub fn credential(&self) -> Result<Option<&str>> {
        match self {
            AuthMode::Legacy => Ok(None),
            AuthMode::ApiKey(key) if key.is_empty() => Err(Error::MissingApiKey),
            AuthMode::ApiKey(key) => Ok(Some(key.as_str())),
        }
    }
}

/// Client configuration
///
/// Immutable once handed to a [`crate::QrngClient`], apart from the endpoint and
/// transport overrides the client exposes for tests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint URL requests are sent to
    pub endpoint: String,
    /// Authentication mode
    pub auth: AuthMode,
    /// Per-request timeout enforced by the transport
    pub timeout: Duration,
    /// Upper bound on sampler draws; `None` retries until a draw is accepted
    pub max_sampling_attempts: Option<u32>,
}

impl ClientConfig {
    /// Legacy endpoint without credential
    pub fn legacy() -> Self {
        Self {
            endpoint: LEGACY_ENDPOINT.to_string(),
            auth: AuthMode::Legacy,
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            max_sampling_attempts: Some(crate::DEFAULT_MAX_SAMPLING_ATTEMPTS),
        }
    }

    /// Authenticated endpoint. An empty key is only rejected at request time.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: AUTHENTICATED_ENDPOINT.to_string(),
            auth: AuthMode::ApiKey(api_key.into()),
            ..Self::legacy()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_sampling_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_sampling_attempts = attempts;
        self
    }

    /// Parsed endpoint URL
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("Invalid endpoint '{}': {}", self.endpoint, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::Config(format!(
                "Unsupported endpoint scheme '{}'",
                scheme
            ))),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.endpoint_url()?;

        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be > 0".to_string()));
        }

        if self.max_sampling_attempts == Some(0) {
            return Err(Error::Config(
                "max_sampling_attempts must be > 0 (omit it for no cap)".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from `QRNG_*` environment variables
    ///
    /// A missing or empty `QRNG_API_KEY` selects the legacy endpoint.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub(crate) fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: RawClientConfig = envy::prefixed("QRNG_")
            .from_iter(vars)
            .map_err(|e| Error::Config(format!("Failed to parse environment variables: {}", e)))?;
        raw.into_config()
    }

    /// Load configuration from a file (format picked by extension), with
    /// `QRNG_*` environment variables taking precedence.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw: RawClientConfig = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(::config::Environment::with_prefix("QRNG"))
            .build()?
            .try_deserialize()?;
        raw.into_config()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::legacy()
    }
}

/// Flat shape shared by the environment and file loaders
#[derive(Debug, Deserialize)]
struct RawClientConfig {
    #[serde(default)]
    api_key: Option<String>,

    #[serde(default)]
    endpoint: Option<String>,

    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// 0 disables the cap
    #[serde(default = "default_max_sampling_attempts")]
    max_sampling_attempts: u32,
}

impl RawClientConfig {
    fn into_config(self) -> Result<ClientConfig> {
        let mut config = match self.api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => ClientConfig::with_api_key(key.trim()),
            None => ClientConfig::legacy(),
        };

        if let Some(endpoint) = self.endpoint.filter(|e| !e.is_empty()) {
            config.endpoint = endpoint;
        }

        config.timeout = Duration::from_secs(self.timeout_secs);
        config.max_sampling_attempts =
            (self.max_sampling_attempts > 0).then_some(self.max_sampling_attempts);

        config.validate()?;
        Ok(config)
    }
}

fn default_timeout_secs() -> u64 {
    crate::DEFAULT_TIMEOUT_SECS
}

fn default_max_sampling_attempts() -> u32 {
    crate::DEFAULT_MAX_SAMPLING_ATTEMPTS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let legacy = ClientConfig::legacy();
        assert_eq!(legacy.endpoint, LEGACY_ENDPOINT);
        assert_eq!(legacy.auth, AuthMode::Legacy);
        assert_eq!(legacy.timeout, Duration::from_secs(10));
        assert!(legacy.validate().is_ok());

        let auth = ClientConfig::with_api_key("secret");
        assert_eq!(auth.endpoint, AUTHENTICATED_ENDPOINT);
        assert!(auth.auth.requires_api_key());
        assert_eq!(auth.auth.credential().unwrap(), Some("secret"));
    }

    #[test]
    fn test_empty_key_fails_at_use() {
        let config = ClientConfig::with_api_key("");
        assert!(config.validate().is_ok());
        assert!(matches!(config.auth.credential(), Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_validation() {
        let config = ClientConfig::legacy().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ClientConfig::legacy().with_endpoint("ftp://example.com");
        assert!(config.validate().is_err());

        let config = ClientConfig::legacy().with_endpoint("not a url");
        assert!(config.validate().is_err());

        let config = ClientConfig::legacy().with_max_sampling_attempts(Some(0));
        assert!(config.validate().is_err());

        let config = ClientConfig::legacy().with_max_sampling_attempts(None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_vars_legacy() {
        let config = ClientConfig::from_vars(vars(&[("QRNG_TIMEOUT_SECS", "3")])).unwrap();
        assert_eq!(config.auth, AuthMode::Legacy);
        assert_eq!(config.endpoint, LEGACY_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.max_sampling_attempts, Some(128));
    }

    #[test]
    fn test_from_vars_authenticated() {
        let config = ClientConfig::from_vars(vars(&[
            ("QRNG_API_KEY", "abc123"),
            ("QRNG_ENDPOINT", "http://localhost:9000/random"),
            ("QRNG_MAX_SAMPLING_ATTEMPTS", "0"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.auth, AuthMode::ApiKey("abc123".to_string()));
        assert_eq!(config.endpoint, "http://localhost:9000/random");
        assert_eq!(config.max_sampling_attempts, None);
    }

    #[test]
    fn test_from_vars_blank_key_is_legacy() {
        let config = ClientConfig::from_vars(vars(&[("QRNG_API_KEY", "  ")])).unwrap();
        assert_eq!(config.auth, AuthMode::Legacy);
    }

    #[test]
    fn test_from_vars_rejects_garbage() {
        assert!(ClientConfig::from_vars(vars(&[("QRNG_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ClientConfig::from_vars(vars(&[("QRNG_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("qrng-client-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "api_key: file-key\nendpoint: http://127.0.0.1:8080/\ntimeout_secs: 5\n",
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.auth, AuthMode::ApiKey("file-key".to_string()));
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/qrng.yaml").unwrap_err();
        assert!(err.is_config());
    }
}
