//! Status command: stored statistics per partition

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::{AppContext, OutputFormat};
use crate::error::{Error, Result, StoreError};
use crate::refresh::Partition;
use crate::stats::Stats;

#[derive(Debug, Tabled)]
struct StatusRow {
    #[tabled(rename = "PARTITION")]
    partition: &'static str,
    #[tabled(rename = "PETITIONS")]
    count: String,
    #[tabled(rename = "AVG DAYS")]
    average_days: String,
    #[tabled(rename = "UPDATED")]
    updated: String,
}

pub fn run(ctx: &AppContext) -> Result<()> {
    let mut rows = Vec::new();
    let mut json = Vec::new();

    for partition in Partition::ALL {
        let key = partition.stats_key();
        let stats = match ctx.store.get::<Stats>(key) {
            Ok(stats) => Some(stats),
            Err(StoreError::NotFound { .. }) => None,
            Err(e) => return Err(Error::Store(e)),
        };
        let updated = ctx.store.updated_at(key)?;

        let average_days = stats
            .as_ref()
            .and_then(|s| s.average_duration().map(|_| s.average_days()));

        json.push(serde_json::json!({
            "partition": partition.name(),
            "count": stats.as_ref().map(|s| s.count),
            "average_days": average_days,
            "updated_at": updated.map(|t| t.to_rfc3339()),
        }));
        rows.push(StatusRow {
            partition: partition.name(),
            count: stats
                .as_ref()
                .map(|s| s.count.to_string())
                .unwrap_or_else(|| "-".to_string()),
            average_days: average_days
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            updated: updated
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "never".to_string()),
        });
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json)?),
        OutputFormat::Table => {
            let mut table = Table::new(&rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }
    Ok(())
}
