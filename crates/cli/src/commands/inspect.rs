use anyhow::Context;
use std::fmt::Write as _;
use std::path::PathBuf;
use treecache::{CacheConfiguration, CacheFacade, GlobalConfiguration};
use treecache_config::ConfigLoader;

pub fn execute(config: Option<PathBuf>) -> anyhow::Result<String> {
    let facade = bootstrap(config)?;
    facade.start().context("Failed to start cache")?;
    let report = report(&facade)?;
    facade.stop().context("Failed to stop cache")?;
    Ok(report)
}

/// An explicit path must exist; a missing default file falls back to defaults
fn bootstrap(config: Option<PathBuf>) -> anyhow::Result<CacheFacade> {
    let path = match config {
        Some(path) => path,
        None => {
            let path = ConfigLoader::default_path()?;
            if !path.exists() {
                tracing::info!(path = %path.display(), "No configuration file, using defaults");
                return Ok(CacheFacade::from_configuration(
                    CacheConfiguration::default(),
                    GlobalConfiguration::default(),
                )?);
            }
            path
        }
    };

    CacheFacade::from_file(&path)
        .with_context(|| format!("Failed to bootstrap from {}", path.display()))
}

fn report(facade: &CacheFacade) -> anyhow::Result<String> {
    let global = facade.container().global_configuration();
    let cache = facade.tree().cache();

    let mut out = String::new();
    writeln!(out, "cluster:  {}", global.cluster_name)?;
    writeln!(out, "node:     {}", global.node_name)?;
    writeln!(out, "cache:    {}", cache.name())?;
    writeln!(out, "mode:     {} ({})", facade.mode(), facade.cache_mode())?;
    writeln!(out, "status:   {}", cache.status())?;
    if !facade.is_local_mode() {
        let members = facade.container().cluster_members(cache.name());
        writeln!(out, "members:  {}", members.join(", "))?;
    }
    out.push_str(&facade.cache_content()?);
    Ok(out)
}
