use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres (ledger + result cache)
    pub database_url: String,

    // Remote analysis backend. Optional: when absent, new analysis
    // attempts are refused with a terminal outcome instead of failing boot.
    pub endpoint_url: Option<String>,
    pub api_token: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Result cache TTL
    pub cache_ttl_secs: i64,

    // Polling
    pub poll_interval_secs: u64,
    pub poll_max_secs: u64,

    // Cleanup sweep
    pub sweep_interval_secs: u64,
    pub failed_retention_secs: i64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: required_env("DATABASE_URL"),
            endpoint_url: env::var("ENDPOINT_URL").ok().filter(|s| !s.is_empty()),
            api_token: env::var("API_TOKEN").ok().filter(|s| !s.is_empty()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", 86_400),
            poll_interval_secs: env_or("POLL_INTERVAL_SECS", 20),
            poll_max_secs: env_or("POLL_MAX_SECS", 300),
            sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", 900),
            failed_retention_secs: env_or("FAILED_RETENTION_SECS", 3_600),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
