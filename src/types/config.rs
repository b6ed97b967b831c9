//! Configuration structures.
//!
//! Configuration is read once from the environment at process start and is
//! immutable afterwards. The CLI may override individual fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::types::{Error, Result};

pub const ENV_REGION: &str = "VOLCENGINE_REGION";
pub const ENV_ACCESS_KEY: &str = "VOLCENGINE_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "VOLCENGINE_SECRET_KEY";
pub const ENV_ENDPOINT: &str = "VOLCENGINE_ENDPOINT";
pub const ENV_SERVER_PORT: &str = "MCP_SERVER_PORT";

/// Global process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target region, e.g. `cn-beijing`.
    pub region: String,

    /// OpenAPI host, without scheme.
    pub endpoint: String,

    /// Access credentials.
    #[serde(default)]
    pub credentials: Credentials,

    /// Resource client configuration.
    #[serde(default)]
    pub client: ClientConfig,

    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: "cn-beijing".to_string(),
            endpoint: "open.volcengineapi.com".to_string(),
            credentials: Credentials::default(),
            client: ClientConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(region) = get(ENV_REGION) {
            config.region = region;
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            config.endpoint = endpoint;
        }
        config.credentials = Credentials {
            access_key: get(ENV_ACCESS_KEY).unwrap_or_default(),
            secret_key: get(ENV_SECRET_KEY).unwrap_or_default(),
        };
        if let Some(port) = get(ENV_SERVER_PORT) {
            let port: u16 = port
                .parse()
                .map_err(|_| Error::config(format!("{ENV_SERVER_PORT} must be a port number, got '{port}'")))?;
            config.server.listen_addr = format!("127.0.0.1:{port}");
        }

        Ok(config)
    }

    /// Check that everything needed to sign requests is present.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.access_key.is_empty() {
            return Err(Error::config(format!("{ENV_ACCESS_KEY} is not set")));
        }
        if self.credentials.secret_key.is_empty() {
            return Err(Error::config(format!("{ENV_SECRET_KEY} is not set")));
        }
        if self.region.is_empty() {
            return Err(Error::config(format!("{ENV_REGION} is not set")));
        }
        if self.endpoint.contains("://") {
            return Err(Error::config(format!(
                "{ENV_ENDPOINT} must be a bare host, got '{}'",
                self.endpoint
            )));
        }
        Ok(())
    }
}

/// Access key pair. The secret never appears in `Debug` output or serialized config.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub access_key: String,
    #[serde(skip_serializing, default)]
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Resource client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL scheme for the OpenAPI endpoint.
    pub scheme: String,

    /// Per-request timeout for remote calls.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the streamable HTTP transport.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_fields() {
        let config = Config::from_lookup(lookup(&[
            (ENV_REGION, "cn-shanghai"),
            (ENV_ACCESS_KEY, "AK"),
            (ENV_SECRET_KEY, "SK"),
            (ENV_ENDPOINT, "rds.example.com"),
            (ENV_SERVER_PORT, "9000"),
        ]))
        .unwrap();

        assert_eq!(config.region, "cn-shanghai");
        assert_eq!(config.endpoint, "rds.example.com");
        assert_eq!(config.credentials.access_key, "AK");
        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        let config = Config::from_lookup(lookup(&[(ENV_ACCESS_KEY, "AK")])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(ENV_SECRET_KEY));
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let err = Config::from_lookup(lookup(&[(ENV_SERVER_PORT, "http")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_with_scheme_rejected() {
        let mut config = Config::default();
        config.credentials = Credentials {
            access_key: "AK".to_string(),
            secret_key: "SK".to_string(),
        };
        config.endpoint = "https://open.volcengineapi.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_is_redacted() {
        let creds = Credentials {
            access_key: "AK".to_string(),
            secret_key: "very-secret".to_string(),
        };
        assert!(!format!("{creds:?}").contains("very-secret"));
        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("very-secret"));
    }
}
