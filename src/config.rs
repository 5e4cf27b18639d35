use std::fmt::Write;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::warn;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_LATEST_GAMES_LIMIT: i64 = 10;

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub refresh_interval: Duration,
    pub date_format: String,
    pub cache_ttl: Option<Duration>,
    pub latest_games_limit: i64,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            redis_url: None,
            refresh_interval: Duration::from_millis(1000),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            cache_ttl: None,
            latest_games_limit: DEFAULT_LATEST_GAMES_LIMIT,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup so tests don't touch the process env
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").or_else(|| {
            match (lookup("DB_USER"), lookup("DB_PASSWORD"), lookup("DB_URI")) {
                (Some(user), Some(password), Some(uri)) => {
                    Some(format!("postgres://{}:{}@{}", user, password, uri))
                }
                _ => None,
            }
        });

        let refresh_interval = parse_number::<u64>(&lookup, "REFRESH_INTERVAL_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.refresh_interval);

        let cache_ttl = parse_number::<u64>(&lookup, "CACHE_TTL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let latest_games_limit = parse_number::<i64>(&lookup, "LATEST_GAMES_LIMIT")
            .filter(|limit| *limit > 0)
            .unwrap_or(defaults.latest_games_limit);

        Self {
            database_url,
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            refresh_interval,
            date_format: lookup("DATE_FORMAT")
                .and_then(|format| {
                    if round_trips_dates(&format) {
                        Some(format)
                    } else {
                        warn!(value = %format, "DATE_FORMAT cannot identify a day, using default");
                        None
                    }
                })
                .unwrap_or(defaults.date_format),
            cache_ttl,
            latest_games_limit,
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

/// Day-scoped cache keys and request parameters are parsed back with the format, so it
/// must render a date that parses to the same day.
fn round_trips_dates(format: &str) -> bool {
    let Some(sample) = NaiveDate::from_ymd_opt(2024, 11, 23) else {
        return false;
    };
    let mut rendered = String::new();
    if write!(rendered, "{}", sample.format(format)).is_err() {
        return false;
    }
    NaiveDate::parse_from_str(&rendered, format).is_ok_and(|parsed| parsed == sample)
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparseable config value");
            None
        }
    }
}
