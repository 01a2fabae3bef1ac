//! Implementation of the `ldapcached route` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Filter, SearchRequest};
use crate::infrastructure::config::ConfigLoader;
use crate::services::SearchCache;

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Configuration file
    #[arg(short, long)]
    pub conf_file: PathBuf,

    /// Search filter, RFC 4515 text (e.g. "(uid=alice)")
    #[arg(short, long)]
    pub filter: String,

    /// Search base
    #[arg(short, long, default_value = "")]
    pub base: String,
}

#[derive(Debug, Serialize)]
pub struct RouteOutput {
    pub filter: String,
    pub region: Option<String>,
}

impl RouteOutput {
    /// Route a search for `filter` under `base` through `cache`.
    pub fn resolve(cache: &SearchCache, base: &str, filter_text: &str) -> Result<Self> {
        let filter = Filter::parse(filter_text)
            .with_context(|| format!("Invalid search filter \"{filter_text}\""))?;
        let request = SearchRequest::new(base, filter);

        Ok(Self {
            filter: request.filter.as_text(),
            region: cache
                .find_region(&request)
                .map(|region| region.name().to_string()),
        })
    }
}

impl CommandOutput for RouteOutput {
    fn to_human(&self) -> String {
        match &self.region {
            Some(region) => format!("{} -> region \"{region}\"", self.filter),
            None => format!("{} -> not cached", self.filter),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RouteArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load_from_file(&args.conf_file)?;
    let cache = super::build_search_cache(&config)?;

    let output_data = RouteOutput::resolve(&cache, &args.base, &args.filter)?;
    output(&output_data, json_mode);
    Ok(())
}
