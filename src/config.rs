use crate::client::DEFAULT_BASE_URL;
use crate::controller::{DEFAULT_REFRESH_INTERVAL, DEFAULT_TAG, WriteFailurePolicy};
use std::{env, str::FromStr, time::Duration};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub api_base: String,
    pub tag: String,
    pub refresh_every: Duration,
    pub policy: WriteFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base: DEFAULT_BASE_URL.to_string(),
            tag: DEFAULT_TAG.to_string(),
            refresh_every: DEFAULT_REFRESH_INTERVAL,
            policy: WriteFailurePolicy::KeepOptimistic,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset keys take the default; values that do not parse are logged and
    /// also take the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let refresh_secs: u64 = parsed(&lookup, "AQUATRACK_REFRESH_SECS", defaults.refresh_every.as_secs());
        let rollback: bool = parsed(&lookup, "AQUATRACK_ROLLBACK_ON_FAILURE", false);

        Config {
            port: parsed(&lookup, "PORT", defaults.port),
            api_base: lookup("AQUATRACK_API_BASE")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.api_base),
            tag: lookup("AQUATRACK_TAG")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.tag),
            refresh_every: Duration::from_secs(refresh_secs.max(1)),
            policy: if rollback {
                WriteFailurePolicy::Rollback
            } else {
                WriteFailurePolicy::KeepOptimistic
            },
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={raw:?}");
            default
        }),
    }
}
