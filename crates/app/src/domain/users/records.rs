//! User Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub name: String,
    pub email: String,

    /// Staff users may manage the catalog and change order status.
    pub is_staff: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
