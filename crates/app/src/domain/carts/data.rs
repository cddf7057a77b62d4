//! Cart Data

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;

use crate::domain::{products::records::ProductUuid, users::records::UserUuid};

/// Longest accepted session token.
pub const MAX_SESSION_TOKEN_LEN: usize = 128;

/// Opaque token identifying an anonymous shopper's session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("session token is empty")]
    Empty,

    #[error("session token is longer than {MAX_SESSION_TOKEN_LEN} characters")]
    TooLong,

    #[error("session token contains whitespace or control characters")]
    InvalidCharacters,
}

impl SessionToken {
    pub fn parse(value: &str) -> Result<Self, SessionTokenError> {
        if value.is_empty() {
            return Err(SessionTokenError::Empty);
        }

        if value.chars().count() > MAX_SESSION_TOKEN_LEN {
            return Err(SessionTokenError::TooLong);
        }

        if value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(SessionTokenError::InvalidCharacters);
        }

        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Whoever a cart belongs to: an authenticated user or an anonymous session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    User(UserUuid),
    Session(SessionToken),
}

impl CartOwner {
    pub(crate) fn user_uuid(&self) -> Option<uuid::Uuid> {
        match self {
            Self::User(user) => Some(user.into_uuid()),
            Self::Session(_) => None,
        }
    }

    pub(crate) fn session_token(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(token) => Some(token.as_str()),
        }
    }
}

impl Display for CartOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::User(user) => write!(f, "user:{user}"),
            Self::Session(_) => f.write_str("session:<redacted>"),
        }
    }
}

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub quantity: u64,
}
