//! View cache management commands

use crate::cache::ViewCache;
use crate::cli::{AppContext, OutputFormat};
use crate::error::Result;

/// Show cache status/statistics
pub fn status(ctx: &AppContext) -> Result<()> {
    let stats = ctx.cache.stats()?;

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "total_entries": stats.total_entries,
                "valid_entries": stats.valid_entries,
                "expired_entries": stats.expired_entries,
                "total_size_bytes": stats.total_size_bytes,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("Valid entries:  {}", stats.valid_entries);
            println!("Expired:        {}", stats.expired_entries);
            println!("Total size:     {} bytes", stats.total_size_bytes);
        }
    }
    Ok(())
}

/// Clear all cached views
pub fn clear(ctx: &AppContext) -> Result<()> {
    let removed = ctx.cache.flush_all()?;

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "entries_removed": removed,
                "success": true,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            if removed > 0 {
                println!("Cleared {} cached views", removed);
            } else {
                println!("Cache was already empty");
            }
        }
    }
    Ok(())
}
