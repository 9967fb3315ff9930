//! Client configuration module

use std::path::PathBuf;

use clap::Parser;

/// Storefront client configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "storefront-app", about = "Storefront checkout client", long_about = None)]
pub struct AppConfig {
    /// Backend API base URL
    #[arg(long, env = "API_BASE_URL", default_value = "http://localhost:5000/api")]
    pub api_base_url: String,

    /// Display name shown on the hosted payment widget
    #[arg(long, env = "SHOP_NAME", default_value = "Storefront")]
    pub shop_name: String,

    /// Description line shown on the hosted payment widget
    #[arg(long, env = "SHOP_TAGLINE", default_value = "Order payment")]
    pub shop_tagline: String,

    /// Cash-on-delivery shipping surcharge in minor currency units
    #[arg(long, env = "COD_SHIPPING_FEE", default_value = "80")]
    pub cod_shipping_fee: u64,

    /// Seconds between access-token expiry checks
    #[arg(long, env = "SESSION_POLL_SECS", default_value = "5")]
    pub session_poll_secs: u64,

    /// Path of the local state file
    #[arg(long, env = "STATE_FILE", default_value = "storefront-state.json")]
    pub state_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
