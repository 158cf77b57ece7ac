//! Operator accounts, roles, and the session handed out by login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an account may do. Deletes across every collection require `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// An application operator.
///
/// Passwords are stored as Argon2id hashes; the plaintext only ever exists
/// inside a [`UserDraft`] or login request. "Deleted" accounts stay in the
/// collection with `is_active = false`, so username uniqueness keeps seeing
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    pub const ID_PREFIX: &'static str = "USR";

    /// Materializes a draft; the caller supplies the already-hashed password.
    pub fn from_draft(draft: UserDraft, password_hash: String) -> Self {
        Self {
            id: super::record_id(Self::ID_PREFIX),
            username: draft.username,
            password_hash,
            role: draft.role,
            full_name: draft.full_name,
            email: draft.email,
            created_at: Utc::now(),
            created_by: draft.created_by,
            is_active: true,
        }
    }
}

/// Caller-supplied fields of a new account. `password` is plaintext here
/// and hashed by the host before anything is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDraft {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Partial account update. The username is identity and cannot be patched.
/// A missing or blank `password` keeps the stored credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserPatch {
    /// Merges everything except the password, which the host handles
    /// separately because it must be re-hashed.
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.role {
            user.role = v;
        }
        if let Some(v) = self.full_name {
            user.full_name = v;
        }
        if let Some(v) = self.email {
            user.email = Some(v);
        }
        if let Some(v) = self.is_active {
            user.is_active = v;
        }
    }
}

/// Proof of a completed login. Callers thread this into every delete;
/// there is no ambient "current user" anywhere in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Wire payload for `USR.LOGIN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
