use clap::Args;
use storefront_app::{
    auth::{AuthService, PgAuthService},
    domain::users::{PgUsersService, UsersService, data::NewUser, records::UserUuid},
};

use super::super::connect;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Login email, unique ignoring case
    #[arg(long)]
    email: String,

    /// Grant catalog and order administration
    #[arg(long)]
    staff: bool,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let db = connect(&args.database_url).await?;

    let user = PgUsersService::new(db.clone())
        .create_user(NewUser {
            uuid: UserUuid::new(),
            name: args.name,
            email: args.email,
            is_staff: args.staff,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    let issued = PgAuthService::new(db)
        .issue_token(user.uuid)
        .await
        .map_err(|error| format!("failed to issue token: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("is_staff: {}", user.is_staff);
    println!("token_uuid: {}", issued.metadata.uuid);
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
