use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the Nominatim-compatible geocoding service.
    pub geocoder_url: String,
    /// Identifying client label sent as `User-Agent` on every lookup.
    pub geocoder_user_agent: String,
    /// Upper bound on a single address lookup before the visit is dropped.
    pub geocoder_timeout_secs: u64,
    /// Minimum gap between the starts of consecutive address lookups in one
    /// pass, whether or not the earlier lookup succeeded. Literal coordinates
    /// never wait.
    pub geocoder_throttle_ms: u64,
    /// Pixel padding applied when fitting the viewport to the route.
    pub map_padding_px: u32,
    pub api_keys: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("geocoder_url", &self.geocoder_url)
            .field("geocoder_user_agent", &self.geocoder_user_agent)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("geocoder_throttle_ms", &self.geocoder_throttle_ms)
            .field("map_padding_px", &self.map_padding_px)
            .field("api_keys", &self.api_keys.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}
