//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    auth::{
        ApiTokenSecret, ApiTokenUuid, ApiTokenVersion, AuthServiceError, AuthenticatedUser,
        IssuedApiToken, NewApiToken, format_api_token, hashes_match, parse_api_token,
        repository::PgAuthRepository, token_hash,
    },
    database::Db,
    domain::users::records::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
        }
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn issue_token(&self, user: UserUuid) -> Result<IssuedApiToken, AuthServiceError> {
        let token_uuid = ApiTokenUuid::new();
        let version = ApiTokenVersion::V1;
        let secret = ApiTokenSecret::generate();

        let mut conn = self.db.acquire().await?;

        let metadata = self
            .repository
            .create_api_token(
                &mut conn,
                NewApiToken {
                    uuid: token_uuid,
                    user_uuid: user,
                    version,
                    token_hash: token_hash(token_uuid, version, user, &secret),
                },
            )
            .await?;

        info!(token_uuid = %token_uuid, user_uuid = %user, "issued api token");

        Ok(IssuedApiToken {
            token: format_api_token(token_uuid, version, &secret),
            metadata,
        })
    }

    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        let parsed = parse_api_token(bearer_token).map_err(|error| {
            debug!(%error, "rejected malformed bearer token");

            AuthServiceError::NotFound
        })?;

        let mut conn = self.db.acquire().await?;

        let token = self
            .repository
            .find_active_api_token(&mut conn, parsed.token_uuid)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if token.version != parsed.version {
            return Err(AuthServiceError::NotFound);
        }

        let presented = token_hash(
            parsed.token_uuid,
            parsed.version,
            token.user_uuid,
            &parsed.secret,
        );

        if !hashes_match(&presented, &token.token_hash) {
            return Err(AuthServiceError::NotFound);
        }

        // Usage tracking must not fail an otherwise valid request.
        if let Err(error) = self
            .repository
            .touch_api_token(&mut conn, parsed.token_uuid)
            .await
        {
            debug!(%error, "failed to record api token use");
        }

        Ok(AuthenticatedUser {
            uuid: token.user_uuid,
            is_staff: token.is_staff,
        })
    }

    async fn revoke_token(&self, token: ApiTokenUuid) -> Result<(), AuthServiceError> {
        let mut conn = self.db.acquire().await?;

        self.repository
            .revoke_api_token(&mut conn, token)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        info!(token_uuid = %token, "revoked api token");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Issue a new bearer token for `user`. The raw token is only returned here.
    async fn issue_token(&self, user: UserUuid) -> Result<IssuedApiToken, AuthServiceError>;

    /// Resolve a bearer token to the user it was issued for.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError>;

    /// Revoke an active token.
    async fn revoke_token(&self, token: ApiTokenUuid) -> Result<(), AuthServiceError>;
}
