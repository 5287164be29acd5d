use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::db::Store;
use crate::services::export::orders_to_csv;

pub async fn cmd_export_orders(config: &Config, path: &Path) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let orders = store.list_orders().await?;
    if orders.is_empty() {
        println!("No orders to export.");
        return Ok(());
    }

    let csv = orders_to_csv(&orders);
    tokio::fs::write(path, csv)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✓ Exported {} orders to {}", orders.len(), path.display());
    Ok(())
}
