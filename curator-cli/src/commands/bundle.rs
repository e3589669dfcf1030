//! `curator bundle` — download the planned artifacts and write the bundles.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curator_sync::{pipeline, writer, WriteResult};

use super::RunArgs;

/// Arguments for `curator bundle`.
#[derive(Args, Debug)]
pub struct BundleArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Output directory; bundles land in `<out>/<package>/<tag>/`.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl BundleArgs {
    pub fn run(self) -> Result<()> {
        let (_, cfg) = self.run.config.load()?;
        let provider = self.run.provider();
        let plans = pipeline::plan(
            &cfg,
            &self.run.scope(),
            provider.as_ref(),
            self.run.last_n(&cfg),
        )
        .context("planning failed")?;

        let results = writer::write_all(&self.out, &plans, provider.as_ref(), self.dry_run)
            .with_context(|| format!("bundling into {} failed", self.out.display()))?;
        for r in &results {
            print_results(&r.package, &r.writes, self.dry_run);
        }
        if results.is_empty() {
            println!("No packages configured.");
        }
        Ok(())
    }
}

fn print_results(package: &str, writes: &[WriteResult], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let count = |f: fn(&WriteResult) -> bool| writes.iter().filter(|w| f(w)).count();
    let written = count(|w| matches!(w, WriteResult::Written { .. } | WriteResult::WouldWrite { .. }));
    let unchanged = count(|w| matches!(w, WriteResult::Unchanged { .. }));
    let removed = count(|w| matches!(w, WriteResult::Removed { .. } | WriteResult::WouldRemove { .. }));

    if writes.is_empty() {
        println!("{prefix}✓ '{package}' — nothing to do");
        return;
    }

    println!(
        "{prefix}✓ '{package}' bundled ({written} written, {unchanged} unchanged, {removed} removed)"
    );

    for w in writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
            WriteResult::Removed { path } => println!("  ✗  {}", path.display()),
            WriteResult::WouldRemove { path } => println!("  -  {}", path.display()),
        }
    }
}
