//! Runtime configuration.
//!
//! Everything is read from the environment once at startup into an
//! immutable struct; nothing is re-read while the loop runs. Invalid
//! values fail fast before the first cycle.

use anyhow::{Context, bail};
use log::warn;
use std::time::Duration;

const DEFAULT_INTERVAL_SECS: u64 = 10;
const MIN_INTERVAL_SECS: u64 = 1;
const DEFAULT_PING_TARGET: &str = "1.1.1.1";

/// Forces a specific Wi-Fi lookup method, skipping the fallback chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WifiSource {
    #[default]
    Auto,
    Nmcli,
    Iwgetid,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Master switch for icon rendering.
    pub icons_enabled: bool,
    /// Bypass font detection, force icon mode.
    pub assume_icons: bool,
    /// Cycle period.
    pub interval: Duration,
    /// Reachability probe target for the cloud-sync classifier.
    pub ping_target: String,
    pub wifi_source: WifiSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            icons_enabled: true,
            assume_icons: false,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            ping_target: DEFAULT_PING_TARGET.to_string(),
            wifi_source: WifiSource::Auto,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Some(raw) = get("ICONS_ENABLED") {
            config.icons_enabled = parse_bool(&raw).context("ICONS_ENABLED")?;
        }
        if let Some(raw) = get("ASSUME_ICONS") {
            config.assume_icons = parse_bool(&raw).context("ASSUME_ICONS")?;
        }
        if let Some(raw) = get("REFRESH_INTERVAL_SECONDS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("REFRESH_INTERVAL_SECONDS: not a number: {raw:?}"))?;
            let secs = if secs < MIN_INTERVAL_SECS {
                warn!(
                    "REFRESH_INTERVAL_SECONDS={secs} below minimum, using {MIN_INTERVAL_SECS}"
                );
                MIN_INTERVAL_SECS
            } else {
                secs
            };
            config.interval = Duration::from_secs(secs);
        }
        if let Some(raw) = get("NETWORK_PING_TARGET") {
            let target = raw.trim();
            if !target.is_empty() {
                config.ping_target = target.to_string();
            }
        }
        if let Some(raw) = get("WIFI_SOURCE_OVERRIDE") {
            config.wifi_source = match raw.trim().to_ascii_lowercase().as_str() {
                "auto" => WifiSource::Auto,
                "nmcli" => WifiSource::Nmcli,
                "iwgetid" => WifiSource::Iwgetid,
                other => bail!("WIFI_SOURCE_OVERRIDE: unknown source {other:?}"),
            };
        }

        Ok(config)
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let config = from_vars(&[]).unwrap();
        assert!(config.icons_enabled);
        assert!(!config.assume_icons);
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.ping_target, "1.1.1.1");
        assert_eq!(config.wifi_source, WifiSource::Auto);
    }

    #[test]
    fn parses_overrides() {
        let config = from_vars(&[
            ("ICONS_ENABLED", "no"),
            ("ASSUME_ICONS", "1"),
            ("REFRESH_INTERVAL_SECONDS", "30"),
            ("NETWORK_PING_TARGET", "9.9.9.9"),
            ("WIFI_SOURCE_OVERRIDE", "iwgetid"),
        ])
        .unwrap();
        assert!(!config.icons_enabled);
        assert!(config.assume_icons);
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.ping_target, "9.9.9.9");
        assert_eq!(config.wifi_source, WifiSource::Iwgetid);
    }

    #[test]
    fn non_numeric_interval_is_fatal() {
        assert!(from_vars(&[("REFRESH_INTERVAL_SECONDS", "abc")]).is_err());
    }

    #[test]
    fn zero_interval_clamps_to_minimum() {
        let config = from_vars(&[("REFRESH_INTERVAL_SECONDS", "0")]).unwrap();
        assert_eq!(config.interval, Duration::from_secs(1));
    }

    #[test]
    fn unknown_wifi_source_is_fatal() {
        assert!(from_vars(&[("WIFI_SOURCE_OVERRIDE", "iwconfig")]).is_err());
    }
}
