//! Schema migration command handlers

use crate::config::Config;
use crate::db::Store;

async fn open(config: &Config) -> anyhow::Result<Store> {
    Store::connect(&config.general.database_path, 1, 1).await
}

pub async fn cmd_migrate_up(config: &Config) -> anyhow::Result<()> {
    let store = open(config).await?;
    store.migrate_up().await?;
    println!("✓ All migrations applied");
    Ok(())
}

pub async fn cmd_migrate_down(config: &Config, steps: u32) -> anyhow::Result<()> {
    let store = open(config).await?;
    store.migrate_down(steps).await?;
    println!("✓ Reverted {steps} migration(s)");
    Ok(())
}

pub async fn cmd_migrate_status(config: &Config) -> anyhow::Result<()> {
    let store = open(config).await?;
    let migrations = store.migration_status().await?;

    println!("Migrations ({} total)", migrations.len());
    println!("{:-<60}", "");

    for migration in migrations {
        let mark = if migration.applied { "applied" } else { "pending" };
        println!("{:<8} {}", mark, migration.name);
    }

    Ok(())
}
