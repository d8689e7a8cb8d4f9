//! Admin account and session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `admin_users` table.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    /// `sha256$<rounds>$<salt hex>$<digest hex>`
    pub password_hash: String,
}

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    pub id: String,
    pub username: String,
}

/// A time-limited admin trust token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub identity: AdminIdentity,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// A session is valid iff `now < expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Request body for the login endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Where the caller was headed before being sent to log in
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
    pub redirect_to: String,
}

/// Current admin state as seen by the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
