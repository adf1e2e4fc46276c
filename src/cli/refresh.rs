//! One-shot refresh command, for cron-style triggers

use colored::Colorize;

use crate::cli::{AppContext, OutputFormat, PartitionArg};
use crate::error::Result;

/// Run the selected pipelines in order, stopping at the first failure
pub async fn run(ctx: &AppContext, which: PartitionArg) -> Result<()> {
    let refreshers = ctx.refreshers()?;
    let mut reports = Vec::new();

    for &partition in which.partitions() {
        let report = refreshers.get(partition).run().await?;
        reports.push(report);
    }

    match ctx.format {
        OutputFormat::Json => {
            let json: Vec<_> = reports
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "partition": r.partition.name(),
                        "count": r.stats.count,
                        "average_days": r.stats.average_duration().map(|_| r.stats.average_days()),
                        "views_flushed": r.views_flushed,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            for r in &reports {
                println!(
                    "{} {}: {} petitions",
                    "✓".green(),
                    r.partition.name().bold(),
                    r.stats.count
                );
            }
        }
    }
    Ok(())
}
