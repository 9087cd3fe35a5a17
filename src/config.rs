use std::collections::HashMap;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const DEFAULT_FEED_CACHE: bool = true;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RippleConfig {
    /// Memoize feed lookups for the lifetime of the process.
    pub feed_cache: bool,
    /// Default for the force flag when a request does not set it.
    pub force_updates: bool,
}

impl Default for RippleConfig {
    fn default() -> Self {
        RippleConfig {
            feed_cache: DEFAULT_FEED_CACHE,
            force_updates: false,
        }
    }
}

impl RippleConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;
        Ok(raw_config.into())
    }
}

impl From<RawConfig> for RippleConfig {
    fn from(raw: RawConfig) -> Self {
        RippleConfig {
            feed_cache: raw.feed.cache.unwrap_or(DEFAULT_FEED_CACHE),
            force_updates: raw.plan.force.unwrap_or(false),
        }
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    feed: FeedConfig,
    #[serde(default)]
    plan: PlanConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct FeedConfig {
    cache: Option<bool>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct PlanConfig {
    force: Option<bool>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("RIPPLE")
                    .separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
