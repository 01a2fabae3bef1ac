use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::Deserialize;

use crate::domain::errors::ConfigError;
use crate::domain::models::{CacheConfig, Config};

/// Prefix of environment variables overriding scalar settings.
pub const ENV_PREFIX: &str = "LDAPCACHED_";

/// The part of the document figment cannot carry without losing region order.
#[derive(Debug, Default, Deserialize)]
struct CacheSection {
    #[serde(default)]
    cache_conf: Option<CacheConfig>,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a specific file
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. The YAML file
    /// 3. Environment variables (`LDAPCACHED_*` prefix, `__` for nesting)
    ///
    /// `cache_conf` is taken from the file only.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::load_from_str(&text)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Load configuration from YAML text, applying environment overrides.
    pub fn load_from_str(yaml: &str) -> Result<Config> {
        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        config.cache_conf = Self::parse_cache_conf(yaml)?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn parse_cache_conf(yaml: &str) -> Result<CacheConfig> {
        if yaml.trim().is_empty() {
            return Ok(CacheConfig::default());
        }
        let section: CacheSection =
            serde_yaml::from_str(yaml).context("Failed to parse cache_conf")?;
        Ok(section.cache_conf.unwrap_or_default())
    }

    /// Validate configuration after loading
    ///
    /// Region and store settings are validated when the search cache is
    /// built from `cache_conf`.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.upstream.trim().is_empty() {
            return Err(ConfigError::MissingUpstream);
        }

        if config.listen_port == 0 {
            return Err(ConfigError::InvalidListenPort(config.listen_port));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
upstream: "ldap.example.com:389"
upstream_use_tls: true
listen_port: 1389
cache_conf:
  common:
    backend: memory
    expiration_time: 300
  regions:
    users:
      templates:
        - filter: "re:^\\(uid="
      expiration_time: 60
    groups:
      templates:
        - filter: "re:^\\(cn="
"#;

    fn without_overrides<R>(f: impl FnOnce() -> R) -> R {
        temp_env::with_vars_unset(
            [
                "LDAPCACHED_UPSTREAM",
                "LDAPCACHED_UPSTREAM_USE_TLS",
                "LDAPCACHED_LISTEN_PORT",
            ],
            f,
        )
    }

    #[test]
    fn test_load_from_str() {
        let config = without_overrides(|| ConfigLoader::load_from_str(SAMPLE)).unwrap();

        assert_eq!(config.upstream, "ldap.example.com:389");
        assert!(config.upstream_use_tls);
        assert_eq!(config.listen_port, 1389);
        assert_eq!(config.cache_conf.common["expiration_time"], serde_json::json!(300));

        let names: Vec<&str> = config.cache_conf.regions.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["users", "groups"]);
    }

    #[test]
    fn test_defaults_apply() {
        let config =
            without_overrides(|| ConfigLoader::load_from_str("upstream: ldap:389\n")).unwrap();

        assert_eq!(config.listen_port, 389);
        assert!(!config.upstream_use_tls);
        assert!(config.cache_conf.regions.is_empty());
    }

    #[test]
    fn test_missing_upstream() {
        let result = without_overrides(|| ConfigLoader::load_from_str("listen_port: 1389\n"));
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingUpstream)
        ));
    }

    #[test]
    fn test_validate_zero_port() {
        let config = Config {
            upstream: "ldap:389".to_string(),
            listen_port: 0,
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidListenPort(0))
        ));
    }

    #[test]
    fn test_duplicate_region_rejected() {
        let yaml = "upstream: ldap:389\ncache_conf:\n  regions:\n    a: {}\n    a: {}\n";
        assert!(without_overrides(|| ConfigLoader::load_from_str(yaml)).is_err());
    }

    #[test]
    fn test_env_override() {
        let config = temp_env::with_vars(
            [
                ("LDAPCACHED_UPSTREAM", Some("override.example.com:636")),
                ("LDAPCACHED_LISTEN_PORT", Some("1636")),
                ("LDAPCACHED_UPSTREAM_USE_TLS", None),
            ],
            || ConfigLoader::load_from_str(SAMPLE),
        )
        .unwrap();

        assert_eq!(config.upstream, "override.example.com:636");
        assert_eq!(config.listen_port, 1636);
        assert_eq!(config.cache_conf.regions.len(), 2, "regions still come from the file");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        file.flush().unwrap();

        let config = without_overrides(|| ConfigLoader::load_from_file(file.path())).unwrap();
        assert_eq!(config.cache_conf.regions.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigLoader::load_from_file("/nonexistent/ldapcached.yaml");
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to read config file"));
    }
}
