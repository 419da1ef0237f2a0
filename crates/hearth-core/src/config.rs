// crates/hearth-core/src/config.rs
//
// Engine configuration for Hearth.
//
// A TrustConfig is built once and handed to the engine at construction, so
// tests can vary thresholds and limits without touching process state. It can
// be deserialized from the `[trust]` table of a TOML file; every field has a
// default.

use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HearthError;

/// Per-hop multiplicative trust decay.
pub const DEFAULT_ATTENUATION: f64 = 0.8;

/// Longest chain (in hops) the discovery search will follow.
pub const DEFAULT_MAX_VOUCH_DISTANCE: u32 = 10;

/// Vouches a single voucher may create per rate-limit window.
pub const DEFAULT_MAX_VOUCHES_PER_MONTH: u32 = 5;

pub const DEFAULT_RATE_LIMIT_WINDOW_DAYS: i64 = 30;

/// Minimum relationship age before vouching, in hours.
pub const DEFAULT_MIN_KNOWN_HOURS: u32 = 24;

/// Trust score cache freshness window: 1 hour.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3_600;

/// Maximum users a single revocation cascade will recompute.
pub const DEFAULT_MAX_CASCADE_NODES: usize = 10_000;

/// Action names recognized by the default threshold map.
pub mod actions {
    pub const VIEW_PUBLIC_OFFERS: &str = "view_public_offers";
    pub const POST_OFFERS_NEEDS: &str = "post_offers_needs";
    pub const SEND_MESSAGES: &str = "send_messages";
    pub const VOUCH_OTHERS: &str = "vouch_others";
    pub const STEWARD_ACTIONS: &str = "steward_actions";
}

/// Immutable engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrustConfig {
    /// Per-hop trust decay factor. Default: 0.8.
    #[serde(default = "default_attenuation")]
    pub attenuation: f64,

    /// Longest chain followed by discovery, in hops. Default: 10.
    #[serde(default = "default_max_vouch_distance")]
    pub max_vouch_distance: u32,

    /// Action name -> minimum trust required.
    #[serde(default = "default_thresholds")]
    pub thresholds: BTreeMap<String, f64>,

    /// Default: 5.
    #[serde(default = "default_max_vouches_per_month")]
    pub max_vouches_per_month: u32,

    /// Trailing window for the vouch rate limit. Default: 30 days.
    #[serde(default = "default_rate_limit_window_days")]
    pub rate_limit_window_days: i64,

    /// Required relationship age before vouching. Default: 24 hours.
    #[serde(default = "default_min_known_hours")]
    pub min_known_hours: u32,

    /// Trust score cache freshness window in seconds. Default: 3600.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Cap on users recomputed by one revocation cascade. None = unbounded.
    #[serde(default = "default_max_cascade_nodes")]
    pub max_cascade_nodes: Option<usize>,
}

fn default_attenuation() -> f64 {
    DEFAULT_ATTENUATION
}

fn default_max_vouch_distance() -> u32 {
    DEFAULT_MAX_VOUCH_DISTANCE
}

fn default_thresholds() -> BTreeMap<String, f64> {
    [
        (actions::VIEW_PUBLIC_OFFERS, 0.3),
        (actions::POST_OFFERS_NEEDS, 0.5),
        (actions::SEND_MESSAGES, 0.6),
        (actions::VOUCH_OTHERS, 0.7),
        (actions::STEWARD_ACTIONS, 0.9),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_max_vouches_per_month() -> u32 {
    DEFAULT_MAX_VOUCHES_PER_MONTH
}

fn default_rate_limit_window_days() -> i64 {
    DEFAULT_RATE_LIMIT_WINDOW_DAYS
}

fn default_min_known_hours() -> u32 {
    DEFAULT_MIN_KNOWN_HOURS
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_max_cascade_nodes() -> Option<usize> {
    Some(DEFAULT_MAX_CASCADE_NODES)
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            attenuation: default_attenuation(),
            max_vouch_distance: default_max_vouch_distance(),
            thresholds: default_thresholds(),
            max_vouches_per_month: default_max_vouches_per_month(),
            rate_limit_window_days: default_rate_limit_window_days(),
            min_known_hours: default_min_known_hours(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_cascade_nodes: default_max_cascade_nodes(),
        }
    }
}

impl TrustConfig {
    /// Parse a TrustConfig from a TOML document and validate it.
    pub fn from_toml_str(contents: &str) -> Result<Self, HearthError> {
        let config: TrustConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is internally consistent.
    pub fn validate(&self) -> Result<(), HearthError> {
        if !(self.attenuation > 0.0 && self.attenuation <= 1.0) {
            return Err(HearthError::Configuration(format!(
                "attenuation must be in (0, 1], got {}",
                self.attenuation
            )));
        }
        for (action, value) in &self.thresholds {
            if !(0.0..=1.0).contains(value) {
                return Err(HearthError::Configuration(format!(
                    "threshold for '{}' must be in [0, 1], got {}",
                    action, value
                )));
            }
        }
        if !self.thresholds.contains_key(actions::VOUCH_OTHERS) {
            return Err(HearthError::Configuration(format!(
                "threshold map is missing required action '{}'",
                actions::VOUCH_OTHERS
            )));
        }
        if self.rate_limit_window_days <= 0 {
            return Err(HearthError::Configuration(
                "rate_limit_window_days must be positive".to_string(),
            ));
        }

        let window = self.try_rate_limit_window()?;
        if Utc::now().checked_sub_signed(window).is_none() {
            return Err(HearthError::Configuration(format!(
                "rate_limit_window_days of {} reaches before the earliest representable date",
                self.rate_limit_window_days
            )));
        }
        self.try_cache_ttl()?;
        self.try_min_known()?;
        Ok(())
    }

    fn try_cache_ttl(&self) -> Result<TimeDelta, HearthError> {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                HearthError::Configuration(format!(
                    "cache_ttl_secs of {} is out of range",
                    self.cache_ttl_secs
                ))
            })
    }

    fn try_rate_limit_window(&self) -> Result<TimeDelta, HearthError> {
        TimeDelta::try_days(self.rate_limit_window_days).ok_or_else(|| {
            HearthError::Configuration(format!(
                "rate_limit_window_days of {} is out of range",
                self.rate_limit_window_days
            ))
        })
    }

    fn try_min_known(&self) -> Result<TimeDelta, HearthError> {
        TimeDelta::try_hours(i64::from(self.min_known_hours)).ok_or_else(|| {
            HearthError::Configuration(format!(
                "min_known_hours of {} is out of range",
                self.min_known_hours
            ))
        })
    }

    /// Minimum trust required for `action`.
    ///
    /// An unrecognized action is a programmer error, not a user rejection.
    pub fn threshold(&self, action: &str) -> Result<f64, HearthError> {
        self.thresholds.get(action).copied().ok_or_else(|| {
            HearthError::Configuration(format!("Unknown trust-gated action '{}'", action))
        })
    }

    // The accessors below saturate instead of panicking on a config that
    // skipped `validate()`.

    pub fn cache_ttl(&self) -> TimeDelta {
        self.try_cache_ttl().unwrap_or(TimeDelta::MAX)
    }

    pub fn rate_limit_window(&self) -> TimeDelta {
        self.try_rate_limit_window().unwrap_or(TimeDelta::MAX)
    }

    pub fn min_known(&self) -> TimeDelta {
        self.try_min_known().unwrap_or(TimeDelta::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = TrustConfig::default();
        assert_eq!(c.attenuation, 0.8);
        assert_eq!(c.max_vouch_distance, 10);
        assert_eq!(c.max_vouches_per_month, 5);
        assert_eq!(c.min_known_hours, 24);
        assert_eq!(c.cache_ttl_secs, 3600);
        assert_eq!(c.threshold(actions::VOUCH_OTHERS).unwrap(), 0.7);
        assert_eq!(c.threshold(actions::STEWARD_ACTIONS).unwrap(), 0.9);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn unknown_action_is_configuration_error() {
        let c = TrustConfig::default();
        let err = c.threshold("launch_rockets").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = TrustConfig::from_toml_str("attenuation = 0.5\nmax_vouches_per_month = 2\n").unwrap();
        assert_eq!(c.attenuation, 0.5);
        assert_eq!(c.max_vouches_per_month, 2);
        assert_eq!(c.max_vouch_distance, 10);
        assert_eq!(c.thresholds.len(), 5);
    }

    #[test]
    fn custom_thresholds_replace_the_map() {
        let c = TrustConfig::from_toml_str(
            "[thresholds]\nvouch_others = 0.4\nhost_events = 0.6\n",
        )
        .unwrap();
        assert_eq!(c.threshold("vouch_others").unwrap(), 0.4);
        assert_eq!(c.threshold("host_events").unwrap(), 0.6);
        assert!(c.threshold("send_messages").is_err());
    }

    #[test]
    fn rejects_out_of_range_attenuation() {
        let err = TrustConfig::from_toml_str("attenuation = 1.5").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
        let err = TrustConfig::from_toml_str("attenuation = 0.0").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
    }

    #[test]
    fn rejects_durations_chrono_cannot_represent() {
        let err = TrustConfig::from_toml_str("rate_limit_window_days = 9000000000000\n").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
        let err = TrustConfig::from_toml_str("cache_ttl_secs = 100000000000000000\n").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
        // Representable as a duration, but not as a distance back from today.
        let err = TrustConfig::from_toml_str("rate_limit_window_days = 100000000\n").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
    }

    #[test]
    fn unvalidated_accessors_saturate() {
        let c = TrustConfig {
            cache_ttl_secs: u64::MAX,
            rate_limit_window_days: i64::MAX,
            ..TrustConfig::default()
        };
        assert_eq!(c.cache_ttl(), TimeDelta::MAX);
        assert_eq!(c.rate_limit_window(), TimeDelta::MAX);
        assert_eq!(c.min_known(), TimeDelta::hours(24));
    }

    #[test]
    fn rejects_missing_vouch_threshold() {
        let err = TrustConfig::from_toml_str("[thresholds]\nsend_messages = 0.6\n").unwrap_err();
        assert!(matches!(err, HearthError::Configuration(_)));
    }
}
