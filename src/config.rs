//! Service configuration parsed from environment variables.

pub const DEFAULT_MONGO_DB: &str = "ugc";
pub const DEFAULT_REVIEWS_COLLECTION: &str = "reviews";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_AUTH_USER_HEADER: &str = "x-user-id";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
    /// Create the `(film_id, user_id)` unique index at startup.
    pub unique_index: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mongo: MongoConfig,
    pub port: u16,
    /// Header carrying the user id forwarded by the auth gateway (lowercase).
    pub auth_user_header: String,
    /// Upper bound for `per_page` on the list endpoint. `None` means unbounded.
    pub max_per_page: Option<u32>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `MONGO_URL`
    ///
    /// Optional:
    /// - `MONGO_DB`: default `ugc`
    /// - `REVIEWS_COLLECTION`: default `reviews`
    /// - `REVIEWS_UNIQUE_INDEX`: default `true`
    /// - `PORT`: default 8000
    /// - `AUTH_USER_HEADER`: default `x-user-id`
    /// - `REVIEWS_MAX_PER_PAGE`: unset means no bound
    ///
    /// # Errors
    ///
    /// Returns an error if `MONGO_URL` is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = non_empty_var("MONGO_URL").ok_or(ConfigError::Missing("MONGO_URL"))?;
        let mongo = MongoConfig {
            url,
            database: non_empty_var("MONGO_DB").unwrap_or_else(|| DEFAULT_MONGO_DB.to_string()),
            collection: non_empty_var("REVIEWS_COLLECTION").unwrap_or_else(|| DEFAULT_REVIEWS_COLLECTION.to_string()),
            unique_index: parse_bool("REVIEWS_UNIQUE_INDEX", non_empty_var("REVIEWS_UNIQUE_INDEX"))?.unwrap_or(true),
        };

        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let auth_user_header = non_empty_var("AUTH_USER_HEADER")
            .unwrap_or_else(|| DEFAULT_AUTH_USER_HEADER.to_string())
            .to_ascii_lowercase();

        let max_per_page = match non_empty_var("REVIEWS_MAX_PER_PAGE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(ConfigError::Invalid { key: "REVIEWS_MAX_PER_PAGE", value: raw }),
            },
            None => None,
        };

        Ok(Self { mongo, port, auth_user_header, max_per_page })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
