//! `curator plan` — show what `bundle` would write, without downloading.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use curator_sync::{pipeline, PackagePlan};

use super::RunArgs;

/// Arguments for `curator plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
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

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plans).context("failed to serialize plan JSON")?
            );
            return Ok(());
        }

        if plans.is_empty() {
            println!("No packages configured.");
        }
        for plan in &plans {
            print_table(plan);
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "release")]
    release: String,
    #[tabled(rename = "created")]
    created: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "tag")]
    tag: String,
    #[tabled(rename = "artifacts")]
    artifacts: String,
}

fn print_table(plan: &PackagePlan) {
    let mode = if plan.alternatives { " (alternatives)" } else { "" };
    println!("{}{mode}", plan.package.to_uppercase().bold());

    if plan.releases.is_empty() {
        println!("  {}", "no releases selected".yellow());
        return;
    }

    let rows: Vec<PlanTableRow> = plan
        .releases
        .iter()
        .flat_map(|release| {
            release.sections.iter().map(move |section| PlanTableRow {
                release: release.tag.clone(),
                created: release.created.format("%Y-%m-%d").to_string(),
                source: section.origin.clone(),
                tag: section.tag.clone(),
                artifacts: if section.assets.is_empty() {
                    "-".to_string()
                } else {
                    section
                        .assets
                        .iter()
                        .map(|a| a.name.as_str())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            })
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
