use crate::stats::BucketZone;
use chrono::FixedOffset;
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/events.json";

/// Startup settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub zone: BucketZone,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        let zone = match env::var("APP_UTC_OFFSET") {
            Ok(value) => parse_zone(&value).unwrap_or_else(|| {
                warn!("ignoring invalid APP_UTC_OFFSET '{value}', using local time");
                BucketZone::Local
            }),
            Err(_) => BucketZone::Local,
        };

        Self {
            port,
            data_path,
            zone,
        }
    }
}

/// Accepts `UTC`, `Z`, `local` or an offset such as `+02:00`.
pub fn parse_zone(value: &str) -> Option<BucketZone> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("local") {
        return Some(BucketZone::Local);
    }
    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).map(BucketZone::Fixed);
    }
    value.parse::<FixedOffset>().ok().map(BucketZone::Fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_names_and_offsets_parse() {
        assert_eq!(parse_zone("local"), Some(BucketZone::Local));
        assert_eq!(
            parse_zone("UTC"),
            Some(BucketZone::Fixed(FixedOffset::east_opt(0).unwrap()))
        );
        assert_eq!(
            parse_zone(" +05:30 "),
            Some(BucketZone::Fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap()))
        );
        assert_eq!(
            parse_zone("-08:00"),
            Some(BucketZone::Fixed(FixedOffset::west_opt(8 * 3600).unwrap()))
        );
        assert_eq!(parse_zone("tomorrow"), None);
    }
}
