use clap::Args;
use storefront_app::{
    auth::{AuthService, PgAuthService},
    domain::users::records::UserUuid,
};

use super::super::connect;

#[derive(Debug, Args)]
pub(crate) struct IssueTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// User that should own the token
    #[arg(long)]
    user_uuid: UserUuid,
}

pub(crate) async fn run(args: IssueTokenArgs) -> Result<(), String> {
    let db = connect(&args.database_url).await?;

    let issued = PgAuthService::new(db)
        .issue_token(args.user_uuid)
        .await
        .map_err(|error| format!("failed to issue token: {error}"))?;

    println!("token_uuid: {}", issued.metadata.uuid);
    println!("user_uuid: {}", issued.metadata.user_uuid);
    println!("token_version: {}", issued.metadata.version.as_i16());
    println!("token_created_at: {}", issued.metadata.created_at);
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
