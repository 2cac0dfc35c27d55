//! Demo record decoded by the `rowbind` binary.

use chrono::NaiveDateTime;
use rowbind_core::Record;
use serde::Serialize;

/// A student row: `id,first_name,last_name,username,created_at`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Record)]
pub struct Student {
    #[csv(name = "id")]
    pub id: i64,
    #[csv(name = "first_name")]
    pub first_name: String,
    #[csv(name = "last_name")]
    pub last_name: String,
    #[csv(name = "username")]
    pub username: String,
    #[csv(name = "created_at")]
    pub created_at: NaiveDateTime,
}
