//! `curator validate` — load and compile the configuration.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use curator_core::Package;

use super::ConfigArg;

/// Arguments for `curator validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArg,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let (path, cfg) = self.config.load()?;
        println!(
            "{} {} ({} packages, last_n = {})",
            "✓".green().bold(),
            path.display(),
            cfg.packages.len(),
            cfg.last_n
        );
        for package in &cfg.packages {
            println!("  {}", describe(package));
        }
        Ok(())
    }
}

fn describe(package: &Package) -> String {
    let mut line = format!("{}: {}", package.name.to_string().bold(), package.primary.origin);
    if !package.additional.is_empty() {
        let extra: Vec<String> = package
            .additional
            .iter()
            .map(|s| s.origin.to_string())
            .collect();
        line.push_str(&format!(" + {}", extra.join(", ")));
    }
    if package.alternatives {
        line.push_str(" (alternatives)");
    }
    line
}
