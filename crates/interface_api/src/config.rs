//! API configuration

use rust_decimal::Decimal;
use serde::Deserialize;

use domain_quote::DEFAULT_NUMBER_ATTEMPTS;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_PORT=9090` or `API_CATALOG_PATH=/etc/tpa/catalog.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Product catalog document; without one the API starts with no products
    pub catalog_path: Option<String>,
    /// Replaces the catalog's default tax percentage
    pub default_tax_percent: Option<Decimal>,
    /// Number draws before a quote or request number is given up on
    pub number_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_json: false,
            catalog_path: None,
            default_tax_percent: None,
            number_attempts: DEFAULT_NUMBER_ATTEMPTS,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
