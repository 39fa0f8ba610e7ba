//! User identity model - read-only to the auth core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role codes carried into session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Driver => "driver",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "driver" => Some(Role::Driver),
            _ => None,
        }
    }
}

/// User entity. Created and maintained by the user-management service;
/// this crate only ever reads it.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role_code: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email,
            password_hash,
            role_code: role.as_str().to_string(),
            created_at: Utc::now(),
        }
    }
}
