//! Create user command handler

use crate::config::Config;
use crate::services::SignupInput;
use crate::state::SharedState;

pub async fn cmd_create_user(config: Config, input: SignupInput) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    match state.auth_service.create_user(input).await {
        Ok(user) => {
            println!("✓ Created {} account for {}", user.role, user.name);
            println!("  ID: {} | Phone: {} | Email: {}", user.id, user.phone, user.email);
            Ok(())
        }
        Err(e) => anyhow::bail!("Could not create user: {e}"),
    }
}
