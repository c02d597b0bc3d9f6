use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Testnet API credentials, injected via APP_API_KEY / APP_API_SECRET
    /// or a local config file. Never compiled into source.
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub recv_window_ms: u64,
    pub log_file: String,
    pub log_level: String,
    pub log_to_file: bool,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("api_key", "")?
        .set_default("api_secret", "")?
        .set_default("base_url", "https://testnet.binancefuture.com")?
        .set_default("recv_window_ms", 5000_i64)?
        .set_default("log_file", "log/orderbot.log")?
        .set_default("log_level", "info")?
        .set_default("log_to_file", true)?
        // Add configuration from a file
        .add_source(File::with_name("config/config.yaml").required(false))
        // Add configuration from environment variables
        .add_source(config::Environment::with_prefix("APP"))
        .build()?;

    s.try_deserialize()
}
