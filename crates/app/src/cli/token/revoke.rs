use clap::Args;
use storefront_app::auth::{ApiTokenUuid, AuthService, AuthServiceError, PgAuthService};

use super::super::connect;

#[derive(Debug, Args)]
pub(crate) struct RevokeTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Token UUID to revoke
    #[arg(long)]
    token_uuid: ApiTokenUuid,
}

pub(crate) async fn run(args: RevokeTokenArgs) -> Result<(), String> {
    let db = connect(&args.database_url).await?;

    match PgAuthService::new(db).revoke_token(args.token_uuid).await {
        Ok(()) => println!("revoked token {}", args.token_uuid),
        Err(AuthServiceError::NotFound) => println!("token {} was not active", args.token_uuid),
        Err(error) => return Err(format!("failed to revoke token: {error}")),
    }

    Ok(())
}
