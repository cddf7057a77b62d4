//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use storefront_app::auth::AuthenticatedUser;

/// Typed access to request-scoped values, mapped to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_user(&mut self, user: AuthenticatedUser);

    /// The caller resolved by the auth middleware, if any.
    fn current_user(&self) -> Option<AuthenticatedUser>;

    fn user_or_401(&self) -> Result<AuthenticatedUser, StatusError>;

    /// Authenticated staff only: 401 without a user, 403 for customers.
    fn staff_or_403(&self) -> Result<AuthenticatedUser, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_user(&mut self, user: AuthenticatedUser) {
        self.inject(user);
    }

    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.obtain::<AuthenticatedUser>().ok().copied()
    }

    fn user_or_401(&self) -> Result<AuthenticatedUser, StatusError> {
        self.current_user()
            .ok_or_else(|| StatusError::unauthorized().brief("Authentication required"))
    }

    fn staff_or_403(&self) -> Result<AuthenticatedUser, StatusError> {
        let user = self.user_or_401()?;

        if !user.is_staff {
            return Err(StatusError::forbidden().brief("Staff access required"));
        }

        Ok(user)
    }
}
