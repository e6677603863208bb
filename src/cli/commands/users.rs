//! List users command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_users().await?;

    if users.is_empty() {
        println!("No user accounts.");
        println!();
        println!("Create one with: gofartrack create-user --name ... --phone ... --email ... --password ...");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        println!("• {} [{}]", user.name, user.role);
        println!(
            "  ID: {} | Phone: {} | Email: {}",
            user.id, user.phone, user.email
        );
    }

    Ok(())
}
