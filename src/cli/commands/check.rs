//! Implementation of the `ldapcached check` command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::cli::table::{list_table, render_list};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{CacheRegion, SearchCache};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration file
    #[arg(short, long)]
    pub conf_file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct RegionSummary {
    pub name: String,
    pub templates: usize,
    pub backend: String,
    pub expiration_time: Option<u64>,
    pub max_capacity: u64,
}

impl From<&CacheRegion> for RegionSummary {
    fn from(region: &CacheRegion) -> Self {
        let settings = region.settings();
        Self {
            name: region.name().to_string(),
            templates: region.template_count(),
            backend: settings.backend.clone(),
            expiration_time: settings.expiration_time,
            max_capacity: settings.max_capacity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub success: bool,
    pub upstream: String,
    pub upstream_use_tls: bool,
    pub listen_port: u16,
    pub regions: Vec<RegionSummary>,
}

impl CheckOutput {
    pub fn new(config: &Config, cache: &SearchCache) -> Self {
        Self {
            success: true,
            upstream: config.upstream.clone(),
            upstream_use_tls: config.upstream_use_tls,
            listen_port: config.listen_port,
            regions: cache.regions().iter().map(RegionSummary::from).collect(),
        }
    }
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["region", "templates", "backend", "ttl", "capacity"]);
        for region in &self.regions {
            table.add_row(vec![
                region.name.clone(),
                region.templates.to_string(),
                region.backend.clone(),
                region
                    .expiration_time
                    .map_or_else(|| "-".to_string(), |secs| format!("{secs}s")),
                region.max_capacity.to_string(),
            ]);
        }

        let tls = if self.upstream_use_tls { " (tls)" } else { "" };
        format!(
            "Configuration OK\nUpstream: {}{tls}\nListen port: {}\n\n{}",
            self.upstream,
            self.listen_port,
            render_list("region", &table, self.regions.len())
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CheckArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load_from_file(&args.conf_file)?;
    let cache = super::build_search_cache(&config)?;

    output(&CheckOutput::new(&config, &cache), json_mode);
    Ok(())
}
