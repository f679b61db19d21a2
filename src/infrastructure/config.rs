//! Runtime settings read from `INTELFUSE_*` environment variables.

use std::str::FromStr;

use tracing::warn;

use crate::domain::services::clustering::ClusterMode;
use crate::domain::services::fusion::FusionConfig;
use crate::domain::services::similarity::{MatchConfig, MAX_TIME_WINDOW_HOURS};

pub const DEFAULT_DB_PATH: &str = "./intelfuse.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: String,
    pub matching: MatchConfig,
    pub cluster_mode: ClusterMode,
    pub fusion: FusionConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            matching: MatchConfig::default(),
            cluster_mode: ClusterMode::default(),
            fusion: FusionConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Missing keys keep their defaults;
    /// unparseable or out-of-range values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let matching = MatchConfig {
            time_window_hours: parse_within(
                &lookup,
                "INTELFUSE_TIME_WINDOW_HOURS",
                defaults.matching.time_window_hours,
                |h| (1..=MAX_TIME_WINDOW_HOURS).contains(h),
            ),
            geo_radius_km: parse_within(
                &lookup,
                "INTELFUSE_GEO_RADIUS_KM",
                defaults.matching.geo_radius_km,
                |r| r.is_finite() && *r >= 0.0,
            ),
            text_threshold_with_geo: parse_within(
                &lookup,
                "INTELFUSE_TEXT_THRESHOLD_GEO",
                defaults.matching.text_threshold_with_geo,
                is_unit_interval,
            ),
            text_threshold_alone: parse_within(
                &lookup,
                "INTELFUSE_TEXT_THRESHOLD_ALONE",
                defaults.matching.text_threshold_alone,
                is_unit_interval,
            ),
        };

        Self {
            db_path: lookup("INTELFUSE_DB").unwrap_or(defaults.db_path),
            matching,
            cluster_mode: parse_within(
                &lookup,
                "INTELFUSE_CLUSTER_MODE",
                defaults.cluster_mode,
                |_| true,
            ),
            fusion: defaults.fusion,
        }
    }
}

fn is_unit_interval(v: &f64) -> bool {
    (0.0..=1.0).contains(v)
}

fn parse_within<T, F>(lookup: &F, key: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        Ok(value) => {
            warn!(key, %value, fallback = %default, "ignoring out-of-range setting");
            default
        }
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring invalid setting");
            default
        }
    }
}
