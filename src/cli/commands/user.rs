//! User management command handlers

use anyhow::Context;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_user_add(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_some() {
        anyhow::bail!("User '{username}' already exists");
    }

    let user = store
        .create_user(username)
        .await
        .context("Failed to create user")?;

    println!("✓ Created user {} (ID: {})", user.username, user.id);
    println!("  API key: {}", user.api_key);
    Ok(())
}

pub async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_users().await?;

    println!("Users ({} total)", users.len());
    println!("{:-<60}", "");

    for user in users {
        println!("{:>4}  {:<24} created {}", user.id, user.username, user.created_at);
    }

    Ok(())
}
