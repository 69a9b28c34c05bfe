//! Client connection configuration with TOML/YAML support

use std::fmt::Write as _;
use std::net::{IpAddr, Ipv6Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ClientError, Result};

/// Connection settings for a JSON:API server
///
/// Can be loaded from YAML, TOML, or constructed programmatically.
/// Immutable once handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// Hostname or IP literal of the server
    #[validate(custom(function = "validate_hostname"))]
    pub hostname: String,

    /// Port of the server (default: 80)
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Path segment between the API version and resource paths
    #[serde(default)]
    pub path_base: String,

    /// API version, rendered as `/v{api_version}` (default: 1)
    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Use https instead of http
    #[serde(default)]
    pub https: bool,

    /// Request timeout in milliseconds, 0 disables it (default: 20s)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port() -> u16 {
    80
}

fn default_api_version() -> u32 {
    1
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("localhost")
    }
}

/// RFC 1123 hostname or an IP literal
fn validate_hostname(hostname: &str) -> std::result::Result<(), ValidationError> {
    if hostname.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let valid = !hostname.is_empty()
        && hostname.len() <= 253
        && hostname.trim_end_matches('.').split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("hostname"))
    }
}

impl ClientConfig {
    /// Configuration for `hostname` with default port, version and timeout
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: default_port(),
            path_base: String::new(),
            api_version: default_api_version(),
            https: false,
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Load configuration from a YAML or TOML file, chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| load_error(path, e))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content).map_err(|e| load_error(path, e)),
            Some("yaml") | Some("yml") => {
                Self::from_yaml(&content).map_err(|e| load_error(path, e))
            }
            other => Err(load_error(
                path,
                format!("unsupported config extension: {:?}", other.unwrap_or("")),
            )),
        }
    }

    /// Find `<dir>/<name>.{toml,yaml,yml}` (first match wins) and load it
    pub fn read(name: &str, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        ["toml", "yaml", "yml"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext)))
            .find(|p| p.is_file())
            .ok_or_else(|| load_error(&dir.join(name), "no config file found"))
            .and_then(|path| Self::load(path))
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse from TOML string
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Builder-style method to set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder-style method to set the path base
    pub fn with_path_base(mut self, path_base: impl Into<String>) -> Self {
        self.path_base = path_base.into();
        self
    }

    /// Builder-style method to set the API version
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Builder-style method to enable https
    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    /// Builder-style method to set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// `scheme://host:port/v{version}[/{path_base}]`
    pub fn base_url(&self) -> String {
        let mut url = String::from("http");
        if self.https {
            url.push('s');
        }

        let host = if self.hostname.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.hostname)
        } else {
            self.hostname.clone()
        };
        let _ = write!(url, "://{}:{}/v{}", host, self.port, self.api_version);

        let path_base = self.path_base.trim_matches('/');
        if !path_base.is_empty() {
            url.push('/');
            url.push_str(path_base);
        }
        url
    }

    /// Full endpoint URL for a resource path starting with `/`
    pub fn endpoint_url(&self, path: &str) -> String {
        let mut url = self.base_url();
        url.push_str(path);
        url
    }
}

fn load_error(path: &Path, e: impl ToString) -> ClientError {
    ClientError::ConfigLoad {
        path: PathBuf::from(path),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("api.example.com");
        assert_eq!(config.port, 80);
        assert_eq!(config.api_version, 1);
        assert_eq!(config.timeout(), Some(Duration::from_secs(20)));
        assert!(!config.https);
    }

    #[test]
    fn test_endpoint_url_without_path_base() {
        let config = ClientConfig::new("localhost").with_port(8080);
        assert_eq!(
            config.endpoint_url("/api/articles"),
            "http://localhost:8080/v1/api/articles"
        );
    }

    #[test]
    fn test_endpoint_url_with_path_base_and_https() {
        let config = ClientConfig::new("example.com")
            .with_port(443)
            .with_https(true)
            .with_api_version(2)
            .with_path_base("/jsonapi/");
        assert_eq!(
            config.endpoint_url("/api/articles/7"),
            "https://example.com:443/v2/jsonapi/api/articles/7"
        );
    }

    #[test]
    fn test_endpoint_url_never_doubles_slash() {
        for https in [false, true] {
            for base in ["", "/", "base"] {
                let config = ClientConfig::new("h").with_https(https).with_path_base(base);
                let url = config.endpoint_url("/x");
                let scheme = if https { "https://" } else { "http://" };
                assert!(url.starts_with(scheme), "{}", url);
                assert!(!url[scheme.len()..].contains("//"), "{}", url);
            }
        }
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let config = ClientConfig::new("::1").with_port(9000);
        assert_eq!(config.base_url(), "http://[::1]:9000/v1");
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::new("localhost").validate().is_ok());
        assert!(ClientConfig::new("127.0.0.1").validate().is_ok());
        assert!(ClientConfig::new("my-host.example.org").validate().is_ok());

        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("bad host").validate().is_err());
        assert!(ClientConfig::new("-leading.example").validate().is_err());
        assert!(ClientConfig::new("localhost").with_port(0).validate().is_err());
    }

    #[test]
    fn test_from_toml_applies_defaults() {
        let config = ClientConfig::from_toml(
            r#"
hostname = "jsonapi.local"
path_base = "store"
https = true
"#,
        )
        .unwrap();
        assert_eq!(config.hostname, "jsonapi.local");
        assert_eq!(config.port, 80);
        assert_eq!(config.api_version, 1);
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.https);
    }

    #[test]
    fn test_from_yaml() {
        let config = ClientConfig::from_yaml(
            r#"
hostname: jsonapi.local
port: 8443
api_version: 3
timeout_ms: 0
"#,
        )
        .unwrap();
        assert_eq!(config.port, 8443);
        assert_eq!(config.api_version, 3);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_read_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("client.yaml")).unwrap();
        writeln!(file, "hostname: from-yaml\nport: 9090").unwrap();

        let config = ClientConfig::read("client", dir.path()).unwrap();
        assert_eq!(config.hostname, "from-yaml");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_read_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::read("absent", dir.path()).unwrap_err();
        assert!(matches!(err, ClientError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.ini");
        std::fs::write(&path, "hostname=x").unwrap();
        assert!(matches!(
            ClientConfig::load(&path),
            Err(ClientError::ConfigLoad { .. })
        ));
    }
}
