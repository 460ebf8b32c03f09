//! User records and the payload shape accepted on the wire.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type UserId = i64;

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Server-assigned identifier.
    #[schema(value_type = i64)]
    pub id: UserId,
    pub name: String,
    pub age: i64,
}

impl User {
    pub fn from_new(id: UserId, user: NewUser) -> Self {
        Self {
            id,
            name: user.name,
            age: user.age,
        }
    }
}

/// Request body for create and update.
///
/// Every field is optional at the parsing stage so that a missing field
/// surfaces as a validation failure rather than a malformed body. The `id`
/// is accepted and ignored: create assigns one and update takes it from the
/// path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i64>)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
}

impl UserPayload {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            age: Some(age),
        }
    }
}

/// A payload that passed validation, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
}

impl NewUser {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

/// The records present when the service starts, in insertion order.
pub fn seed_users() -> Vec<NewUser> {
    vec![
        NewUser::new("Agus", 15),
        NewUser::new("Bagus", 25),
        NewUser::new("Caca", 29),
    ]
}
