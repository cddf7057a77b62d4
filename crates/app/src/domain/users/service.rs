//! Users service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::users::{
        data::NewUser,
        errors::UsersServiceError,
        records::{UserRecord, UserUuid},
        repository::PgUsersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        let mut conn = self.db.acquire().await?;

        let created = self.repository.create_user(&mut conn, user).await?;

        tracing::info!(user_uuid = %created.uuid, is_staff = created.is_staff, "created user");

        Ok(created)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        let mut conn = self.db.acquire().await?;

        Ok(self.repository.get_user(&mut conn, user).await?)
    }
}

#[automock]
#[async_trait]
/// User account operations.
pub trait UsersService: Send + Sync {
    /// Creates a new user.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            uuid: UserUuid::new(),
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            is_staff: false,
        }
    }

    #[tokio::test]
    async fn create_user_returns_created_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = new_user("ada@example.com");
        let uuid = user.uuid;

        let created = ctx.users.create_user(user).await?;

        assert_eq!(created.uuid, uuid);
        assert_eq!(created.email, "ada@example.com");
        assert!(!created.is_staff);

        let fetched = ctx.users.get_user(uuid).await?;

        assert_eq!(fetched.name, "Ada Lovelace");

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.users.create_user(new_user("dup@example.com")).await?;

        let result = ctx.users.create_user(new_user("DUP@example.com")).await;

        assert!(
            matches!(result, Err(UsersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_user_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.users.get_user(UserUuid::new()).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
