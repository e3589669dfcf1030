//! Subcommands and the arguments they share.

pub mod bundle;
pub mod plan;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curator_core::{config, Config};
use curator_sync::{GitHubProvider, MirrorProvider, PlanScope, ReleaseProvider};

/// `--config`, defaulting to `~/.curator/config.yaml`.
#[derive(Args, Debug)]
pub struct ConfigArg {
    /// Configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub fn load(&self) -> Result<(PathBuf, Config)> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => config::default_path().context("could not locate the default config")?,
        };
        let cfg = config::load_at(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        Ok((path, cfg))
    }
}

/// Arguments shared by `plan` and `bundle`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Only this package (default: all configured packages).
    #[arg(long)]
    pub package: Option<String>,

    /// Number of newest minor lines to keep (overrides `last_n`; 0 keeps all).
    #[arg(long, value_name = "N")]
    pub last: Option<usize>,

    /// Read releases from a local mirror instead of GitHub.
    #[arg(long, value_name = "DIR")]
    pub mirror: Option<PathBuf>,
}

impl RunArgs {
    pub fn scope(&self) -> PlanScope {
        match &self.package {
            Some(name) => PlanScope::Package(name.clone()),
            None => PlanScope::All,
        }
    }

    pub fn last_n(&self, config: &Config) -> usize {
        self.last.unwrap_or(config.last_n)
    }

    pub fn provider(&self) -> Box<dyn ReleaseProvider> {
        match &self.mirror {
            Some(root) => Box::new(MirrorProvider::new(root)),
            None => Box::new(GitHubProvider::new()),
        }
    }
}
