use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Result, anyhow};
use graph::upstream::{UPSTREAM_URL, UpstreamConfig};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "3000")?,
            upstream: UpstreamConfig {
                base_url: try_load("UPSTREAM_URL", UPSTREAM_URL)?,
                timeout: Duration::from_millis(try_load("UPSTREAM_TIMEOUT_MS", "10000")?),
                max_users: try_load("SEARCH_MAX_USERS", "5")?,
                page_limit: try_load("GRAPH_PAGE_LIMIT", "100")?,
            },
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Environment misconfigured: {key}={raw}: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::try_load;

    #[test]
    fn test_default_used_when_unset() {
        let port: u16 = try_load("CASTGRAPH_TEST_UNSET_PORT", "3000").unwrap();

        assert_eq!(port, 3000);
    }

    #[test]
    fn test_bad_default_is_an_error() {
        assert!(try_load::<u16>("CASTGRAPH_TEST_UNSET_PORT", "not-a-port").is_err());
    }
}
