//! Loading a full configuration file and building the search cache from it.

use std::io::Write;

use ldapcached::cli::commands::build_search_cache;
use ldapcached::domain::models::{Filter, SearchRequest};
use ldapcached::{ConfigError, ConfigLoader};
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 3] = [
    "LDAPCACHED_UPSTREAM",
    "LDAPCACHED_UPSTREAM_USE_TLS",
    "LDAPCACHED_LISTEN_PORT",
];

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_regions_built_in_declaration_order() {
    let file = write_config(
        r#"
upstream: "ldap.example.com:389"
listen_port: 1389
cache_conf:
  common:
    backend: memory
    expiration_time: 600
    max_capacity: 500
  regions:
    zz_specific:
      templates:
        - filter: "re:^\\(uid=alice\\)"
      expiration_time: 30
    aa_general:
      templates:
        - filter: "re:^\\(uid="
        - filter: "re:^\\(mail="
"#,
    );

    let config = temp_env::with_vars_unset(ENV_VARS, || ConfigLoader::load_from_file(file.path()))
        .unwrap();
    let cache = build_search_cache(&config).unwrap();

    let names: Vec<&str> = cache.regions().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["zz_specific", "aa_general"]);

    let specific = &cache.regions()[0];
    assert_eq!(specific.settings().expiration_time, Some(30));
    assert_eq!(specific.settings().max_capacity, 500);

    let general = &cache.regions()[1];
    assert_eq!(general.template_count(), 2);
    assert_eq!(general.settings().expiration_time, Some(600));

    let alice = SearchRequest::new("", Filter::equality("uid", "alice"));
    assert_eq!(cache.find_region(&alice).map(|r| r.name()), Some("zz_specific"));
}

#[test]
fn test_configuration_errors_surface_at_startup() {
    let cases = [
        ("unsupported kind", "templates:\n        - filter: \"glob:uid*\""),
        ("unsupported field", "templates:\n        - base: \"re:dc=\""),
        ("empty templates", "templates: []"),
        ("bad regex", "templates:\n        - filter: \"re:(\""),
        ("unknown backend", "templates:\n        - filter: \"re:x\"\n      backend: redis"),
        ("missing colon", "templates:\n        - filter: \"uid\""),
    ];

    for (label, region) in cases {
        let yaml = format!(
            "upstream: ldap:389\ncache_conf:\n  regions:\n    broken:\n      {region}\n"
        );
        let config = temp_env::with_vars_unset(ENV_VARS, || ConfigLoader::load_from_str(&yaml))
            .unwrap_or_else(|e| panic!("{label}: config should load: {e:#}"));

        let Err(err) = build_search_cache(&config) else {
            panic!("{label}: cache should not build");
        };
        let config_error = err
            .downcast_ref::<ConfigError>()
            .unwrap_or_else(|| panic!("{label}: expected ConfigError, got {err:#}"));
        assert!(
            matches!(config_error, ConfigError::Region { region, .. } if region == "broken"),
            "{label}: {config_error}"
        );
    }
}

#[test]
fn test_missing_upstream_is_rejected() {
    let file = write_config("listen_port: 389\n");
    let err = temp_env::with_vars_unset(ENV_VARS, || ConfigLoader::load_from_file(file.path()))
        .unwrap_err();
    assert!(format!("{err:#}").contains("Upstream server address cannot be empty"));
}
