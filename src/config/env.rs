// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Places API key
    pub google_places_api_key: String,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Default region to scrape when none is given on the command line
    pub region: String,

    /// Optional place type filter (e.g., "restaurant", "bar")
    pub place_type: Option<String>,

    /// Optional keyword filter
    pub keyword: Option<String>,

    /// Places API request budget per second
    pub requests_per_second: u32,

    /// Search response cache TTL in seconds
    pub cache_ttl_seconds: u64,

    /// Directory for report and GeoJSON output
    pub output_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        Config {
            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY")
                .unwrap_or_else(|_| String::new()),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            region: env::var("REGION").unwrap_or_else(|_| "ottawa".to_string()),

            place_type: env::var("PLACE_TYPE").ok().filter(|v| !v.is_empty()),

            keyword: env::var("KEYWORD").ok().filter(|v| !v.is_empty()),

            requests_per_second: env::var("REQUESTS_PER_SECOND")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),

            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.region.is_empty() {
            return Err("REGION is required".to_string());
        }

        if self.google_places_api_key.is_empty() {
            log::warn!("GOOGLE_PLACES_API_KEY not configured - scraping will not work");
        }

        Ok(())
    }
}
