//! Effective store settings of a cache region.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::StoreOptions;
use crate::domain::errors::ConfigError;

/// Store settings after merging the `common` block with a region's overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Backend identifier (`memory`, `null`)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Seconds an entry stays valid; no expiry when absent
    #[serde(default)]
    pub expiration_time: Option<u64>,

    /// Maximum number of cached searches held by the region
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,

    /// Remaining backend-specific options, passed through untouched
    #[serde(flatten)]
    pub arguments: StoreOptions,
}

fn default_backend() -> String {
    "memory".to_string()
}

const fn default_max_capacity() -> u64 {
    10_000
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            expiration_time: None,
            max_capacity: default_max_capacity(),
            arguments: StoreOptions::new(),
        }
    }
}

impl StoreSettings {
    /// Shallow-merge `overrides` over `common` and parse the result.
    pub fn merged(common: &StoreOptions, overrides: &StoreOptions) -> Result<Self, ConfigError> {
        let mut options = common.clone();
        options.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

        let settings: Self = serde_json::from_value(serde_json::Value::Object(options))
            .map_err(|e| ConfigError::InvalidStoreOptions(e.to_string()))?;

        if settings.expiration_time == Some(0) {
            return Err(ConfigError::InvalidStoreOptions(
                "expiration_time must be positive".to_string(),
            ));
        }
        if settings.max_capacity == 0 {
            return Err(ConfigError::InvalidStoreOptions(
                "max_capacity must be at least 1".to_string(),
            ));
        }

        Ok(settings)
    }

    pub fn time_to_live(&self) -> Option<Duration> {
        self.expiration_time.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: serde_json::Value) -> StoreOptions {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let settings = StoreSettings::merged(&StoreOptions::new(), &StoreOptions::new()).unwrap();
        assert_eq!(settings, StoreSettings::default());
        assert_eq!(settings.time_to_live(), None);
    }

    #[test]
    fn test_region_overrides_common() {
        let common = options(json!({"backend": "memory", "expiration_time": 300, "max_capacity": 50}));
        let region = options(json!({"expiration_time": 60, "namespace": "users"}));

        let settings = StoreSettings::merged(&common, &region).unwrap();
        assert_eq!(settings.backend, "memory");
        assert_eq!(settings.expiration_time, Some(60));
        assert_eq!(settings.max_capacity, 50);
        assert_eq!(settings.arguments.get("namespace"), Some(&json!("users")));
        assert_eq!(settings.time_to_live(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_merge_does_not_touch_inputs() {
        let common = options(json!({"expiration_time": 300}));
        let region = options(json!({"expiration_time": 60}));
        let _ = StoreSettings::merged(&common, &region).unwrap();
        assert_eq!(common["expiration_time"], json!(300));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let bad_type = options(json!({"expiration_time": "soon"}));
        assert!(matches!(
            StoreSettings::merged(&bad_type, &StoreOptions::new()),
            Err(ConfigError::InvalidStoreOptions(_))
        ));

        let zero_ttl = options(json!({"expiration_time": 0}));
        assert!(StoreSettings::merged(&zero_ttl, &StoreOptions::new()).is_err());

        let zero_capacity = options(json!({"max_capacity": 0}));
        assert!(StoreSettings::merged(&zero_capacity, &StoreOptions::new()).is_err());
    }
}
