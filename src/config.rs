use anyhow::{ensure, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tui_cluster::cluster::MAX_INDEX_ZOOM;

/// Runtime settings read from the environment (and `.env` when present)
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// GeoJSON point file; synthetic points are used when it is missing
    pub data_path: PathBuf,
    pub max_zoom: u8,
    pub radius: f64,
    /// Synthetic point count
    pub synthetic: usize,
    /// Log destination; logging is off without one
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/points.json"),
            max_zoom: 10,
            radius: 40.0,
            synthetic: 5000,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing .env is fine
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            data_path: lookup("TUI_CLUSTER_DATA").map(PathBuf::from).unwrap_or(defaults.data_path),
            max_zoom: parse_var(&lookup, "TUI_CLUSTER_MAX_ZOOM")?.unwrap_or(defaults.max_zoom),
            radius: parse_var(&lookup, "TUI_CLUSTER_RADIUS")?.unwrap_or(defaults.radius),
            synthetic: parse_var(&lookup, "TUI_CLUSTER_SYNTHETIC")?.unwrap_or(defaults.synthetic),
            log_file: lookup("TUI_CLUSTER_LOG").map(PathBuf::from),
        };

        ensure!(
            config.radius.is_finite() && config.radius >= 0.0,
            "TUI_CLUSTER_RADIUS must be a finite number >= 0, got {}",
            config.radius
        );
        ensure!(
            config.max_zoom <= MAX_INDEX_ZOOM,
            "TUI_CLUSTER_MAX_ZOOM must be at most {MAX_INDEX_ZOOM}, got {}",
            config.max_zoom
        );
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse().with_context(|| format!("{key}={raw:?}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TUI_CLUSTER_DATA", "cafes.json"),
            ("TUI_CLUSTER_MAX_ZOOM", "14"),
            ("TUI_CLUSTER_RADIUS", " 60.5 "),
            ("TUI_CLUSTER_LOG", "cluster.log"),
        ]))
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("cafes.json"));
        assert_eq!(config.max_zoom, 14);
        assert_eq!(config.radius, 60.5);
        assert_eq!(config.synthetic, 5000);
        assert_eq!(config.log_file, Some(PathBuf::from("cluster.log")));
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[("TUI_CLUSTER_MAX_ZOOM", "ten")])).unwrap_err();
        assert!(err.to_string().contains("TUI_CLUSTER_MAX_ZOOM"));
        assert!(Config::from_lookup(lookup(&[("TUI_CLUSTER_MAX_ZOOM", "300")])).is_err());
    }

    #[test]
    fn test_out_of_range_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[("TUI_CLUSTER_RADIUS", "-5")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TUI_CLUSTER_RADIUS", "NaN")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TUI_CLUSTER_RADIUS", "inf")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TUI_CLUSTER_MAX_ZOOM", "31")])).is_err());

        let config = Config::from_lookup(lookup(&[
            ("TUI_CLUSTER_RADIUS", "0"),
            ("TUI_CLUSTER_MAX_ZOOM", "30"),
        ]))
        .unwrap();
        assert_eq!(config.radius, 0.0);
        assert_eq!(config.max_zoom, 30);
    }
}
