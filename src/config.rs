use anyhow::Context;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_JWT_MAXAGE_DAYS: i64 = 7;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;
const DEFAULT_MAX_SESSIONS: usize = 10_000;
pub const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_maxage_days: i64,
    pub coingecko_api_url: String,
    pub coingecko_api_key: Option<String>,
    /// When false, fetch errors are only logged and kept out of session views.
    pub surface_fetch_errors: bool,
    /// Lookup sessions untouched for this long are evicted.
    pub session_idle_secs: u64,
    pub max_sessions: usize,
    pub log_level: String,
}

impl Config {
    /// Reads the configuration from the environment, loading `.env` first if present.
    pub fn init() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let port = match std::env::var("PORT") {
            Ok(port) => port.parse().context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };
        let jwt_maxage_days = match std::env::var("JWT_MAXAGE_DAYS") {
            Ok(days) => days.parse().context("JWT_MAXAGE_DAYS must be an integer")?,
            Err(_) => DEFAULT_JWT_MAXAGE_DAYS,
        };

        let coingecko_api_url = std::env::var("COINGECKO_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_COINGECKO_API_URL.to_string());
        let coingecko_api_key = std::env::var("COINGECKO_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        let surface_fetch_errors = std::env::var("SURFACE_FETCH_ERRORS")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        let session_idle_secs = match std::env::var("SESSION_IDLE_SECS") {
            Ok(secs) => secs.parse().context("SESSION_IDLE_SECS must be an integer")?,
            Err(_) => DEFAULT_SESSION_IDLE_SECS,
        };
        let max_sessions = match std::env::var("MAX_SESSIONS") {
            Ok(max) => max.parse().context("MAX_SESSIONS must be an integer")?,
            Err(_) => DEFAULT_MAX_SESSIONS,
        };

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            db_url,
            port,
            jwt_secret,
            jwt_maxage_days,
            coingecko_api_url,
            coingecko_api_key,
            surface_fetch_errors,
            session_idle_secs,
            max_sessions,
            log_level,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
