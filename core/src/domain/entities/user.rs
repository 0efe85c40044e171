//! User entity representing an account that can hold sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::token::Principal;

/// Role carried in both token kinds and checked by role guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End customer of a tenant
    Customer,
    /// Tenant manager
    Manager,
    /// Platform administrator
    Admin,
}

impl Role {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// User entity as consumed by the token lifecycle
///
/// Credentials live with the login collaborator and never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-generated identifier
    pub id: i64,

    /// Login email
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Authorization role
    pub role: Role,

    /// Owning tenant, absent for platform administrators
    pub tenant_id: Option<i64>,

    /// Inactive accounts cannot refresh their sessions
    pub is_active: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user; the id is assigned by the store
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            tenant_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the user to a tenant
    pub fn with_tenant(mut self, tenant_id: i64) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Marks the account inactive
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// The identity embedded into tokens minted for this user
    pub fn principal(&self) -> Principal {
        Principal {
            sub: self.id.to_string(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}
