use clap::Subcommand;
use serde_json::json;

use super::connect_store;
use crate::auth::Role;
use crate::cli::{utils::output_success, OutputFormat};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Give an existing principal an administrator role")]
    Grant {
        #[arg(help = "Email of the principal")]
        email: String,
        #[arg(long, help = "SUPER_ADMIN or COMPANY_ADMIN", default_value = "SUPER_ADMIN")]
        role: Role,
    },

    #[command(about = "Remove the stored role of a principal")]
    Revoke {
        #[arg(help = "Email of the principal")]
        email: String,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect_store()?;

    let (email, role) = match cmd {
        AdminCommands::Grant { email, role } => (email, Some(role)),
        AdminCommands::Revoke { email } => (email, None),
    };

    let principal = store
        .find_principal_by_email(email.trim())
        .await?
        .ok_or_else(|| anyhow::anyhow!("No principal with email {}", email))?;
    store.set_role(principal.id, role).await?;

    let message = match role {
        Some(role) => format!("{} is now {}", principal.email, role),
        None => format!("{} no longer has a role", principal.email),
    };
    output_success(
        &output_format,
        &message,
        Some(json!({ "id": principal.id, "email": principal.email, "role": role })),
    )
}
