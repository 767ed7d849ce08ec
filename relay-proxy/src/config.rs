//! Proxy configuration

use relay_core::{RelayError, RelayResult};

/// Default conversion tracking endpoint
pub const DEFAULT_TRACK_URL: &str = "https://business-api.tiktok.com/open_api/v1.3/pixel/track/";

pub const PIXEL_ID_VAR: &str = "TIKTOK_PIXEL_ID";
pub const ACCESS_TOKEN_VAR: &str = "TIKTOK_ACCESS_TOKEN";

/// Advertiser secrets.
///
/// Read once at startup and injected into the delivery client; business
/// logic never reads the environment. Setting a missing secret therefore
/// takes a restart. Either may be absent; that surfaces as
/// [`RelayError::MissingConfig`] in the logs of each delivery, never as a
/// startup failure.
#[derive(Clone, Default)]
pub struct AdvertiserConfig {
    pub pixel_code: Option<String>,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for AdvertiserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvertiserConfig")
            .field("pixel_code", &self.pixel_code)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolved secrets for one delivery
#[derive(Clone)]
pub struct Credentials {
    pub pixel_code: String,
    pub access_token: String,
}

impl AdvertiserConfig {
    pub fn new(pixel_code: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            pixel_code: Some(pixel_code.into()),
            access_token: Some(access_token.into()),
        }
    }

    /// Read secrets from the process environment
    pub fn from_env() -> Self {
        Self {
            pixel_code: std::env::var(PIXEL_ID_VAR).ok(),
            access_token: std::env::var(ACCESS_TOKEN_VAR).ok(),
        }
    }

    /// Names of secrets that are absent or blank
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(&self.pixel_code) {
            missing.push(PIXEL_ID_VAR);
        }
        if blank(&self.access_token) {
            missing.push(ACCESS_TOKEN_VAR);
        }
        missing
    }

    pub fn credentials(&self) -> RelayResult<Credentials> {
        Ok(Credentials {
            pixel_code: require(&self.pixel_code, PIXEL_ID_VAR)?,
            access_token: require(&self.access_token, ACCESS_TOKEN_VAR)?,
        })
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn require(value: &Option<String>, key: &str) -> RelayResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(RelayError::MissingConfig { key: key.to_string() }),
    }
}

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Port to listen on
    pub port: u16,
    /// Outbound request timeout in milliseconds
    pub timeout_ms: u64,
    /// Conversion tracking endpoint
    pub endpoint: String,
    pub advertiser: AdvertiserConfig,
}

impl ProxyConfig {
    /// Create a new configuration builder
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::default()
    }

    /// Configuration from environment.
    ///
    /// `RELAY_PORT`, `RELAY_TIMEOUT_MS` and `TIKTOK_TRACK_URL` fall back to
    /// defaults when unset or unparseable.
    pub fn from_env() -> Self {
        let port = std::env::var("RELAY_PORT").ok().and_then(|p| p.parse().ok());
        let timeout_ms = std::env::var("RELAY_TIMEOUT_MS").ok().and_then(|v| v.parse().ok());

        let mut builder = ProxyConfig::builder().advertiser(AdvertiserConfig::from_env());
        if let Some(port) = port {
            builder = builder.port(port);
        }
        if let Some(timeout_ms) = timeout_ms {
            builder = builder.timeout_ms(timeout_ms);
        }
        if let Ok(endpoint) = std::env::var("TIKTOK_TRACK_URL") {
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for ProxyConfig
#[derive(Debug, Default)]
pub struct ProxyConfigBuilder {
    port: Option<u16>,
    timeout_ms: Option<u64>,
    endpoint: Option<String>,
    advertiser: Option<AdvertiserConfig>,
}

impl ProxyConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn advertiser(mut self, advertiser: AdvertiserConfig) -> Self {
        self.advertiser = Some(advertiser);
        self
    }

    pub fn build(self) -> ProxyConfig {
        ProxyConfig {
            port: self.port.unwrap_or(8422),
            timeout_ms: self.timeout_ms.unwrap_or(30000),
            endpoint: self.endpoint.unwrap_or_else(|| DEFAULT_TRACK_URL.to_string()),
            advertiser: self.advertiser.unwrap_or_default(),
        }
    }
}
