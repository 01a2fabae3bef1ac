use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Open mapping of backend-specific store options.
pub type StoreOptions = serde_json::Map<String, serde_json::Value>;

/// One search template: field name -> matcher spec (e.g. `filter: "re:^\\(uid="`).
pub type TemplateConfig = BTreeMap<String, String>;

/// Main configuration structure for ldapcached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Upstream directory server, `host:port` or an `ldap://` / `ldaps://` URL
    #[serde(default)]
    pub upstream: String,

    /// Negotiate TLS towards the upstream
    #[serde(default)]
    pub upstream_use_tls: bool,

    /// Port the proxy listens on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Search cache configuration.
    ///
    /// Read straight from the YAML document by the loader so that region
    /// declaration order survives.
    #[serde(skip)]
    pub cache_conf: CacheConfig,
}

const fn default_listen_port() -> u16 {
    389
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: String::new(),
            upstream_use_tls: false,
            listen_port: default_listen_port(),
            cache_conf: CacheConfig::default(),
        }
    }
}

/// Search cache configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CacheConfig {
    /// Store options shared by every region
    #[serde(default)]
    pub common: StoreOptions,

    /// Regions in declaration order
    #[serde(default)]
    pub regions: RegionsConfig,
}

/// Per-region configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegionConfig {
    /// Search templates; a request is cached by this region if any template matches
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,

    /// Store options overriding `common` for this region
    #[serde(flatten)]
    pub store: StoreOptions,
}

/// Named regions, kept in the order they were declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionsConfig(Vec<(String, RegionConfig)>);

impl RegionsConfig {
    pub fn new(regions: Vec<(String, RegionConfig)>) -> Self {
        Self(regions)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegionConfig)> {
        self.0.iter().map(|(name, region)| (name.as_str(), region))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for RegionsConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RegionsVisitor;

        impl<'de> Visitor<'de> for RegionsVisitor {
            type Value = RegionsConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of region name to region configuration")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(RegionsConfig::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut regions: Vec<(String, RegionConfig)> = Vec::new();
                while let Some((name, region)) = map.next_entry::<String, RegionConfig>()? {
                    if regions.iter().any(|(existing, _)| *existing == name) {
                        return Err(de::Error::custom(format!("duplicate region '{name}'")));
                    }
                    regions.push((name, region));
                }
                Ok(RegionsConfig(regions))
            }
        }

        deserializer.deserialize_any(RegionsVisitor)
    }
}
