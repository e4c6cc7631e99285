use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{Record, RecordFilter};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[serde(alias = "patient", alias = "Patient")]
    Patient,
    #[serde(alias = "doctor", alias = "Doctor")]
    Doctor,
    #[serde(alias = "admin", alias = "Admin")]
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Patient => write!(f, "PATIENT"),
            UserRole::Doctor => write!(f, "DOCTOR"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PATIENT" => Ok(UserRole::Patient),
            "DOCTOR" => Ok(UserRole::Doctor),
            "ADMIN" => Ok(UserRole::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Stored user record. `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub username: Option<String>,
}

impl UserFilter {
    pub fn by_username(username: impl Into<String>) -> Self {
        Self { username: Some(username.into()) }
    }
}

impl RecordFilter<User> for UserFilter {
    fn matches(&self, record: &User) -> bool {
        self.username.as_deref().map_or(true, |u| record.username == u)
    }
}

impl Record for User {
    type Filter = UserFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.username)
    }
}
