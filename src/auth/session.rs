//! Admin session store.
//!
//! Sessions live in memory and are mirrored to a JSON file keyed by the
//! SHA-256 of each bearer token, so the raw token is never written to disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use super::password::{hash_password, verify_against_nothing, verify_password};
use crate::db::Store;
use crate::errors::AppError;
use crate::models::{AdminIdentity, AdminSession};

/// Admin state for one presented token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(AdminSession),
}

impl SessionState {
    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Process-wide admin session guard.
pub struct AdminGuard {
    store: Store,
    sessions: Mutex<HashMap<String, AdminSession>>,
    path: PathBuf,
    ttl: Duration,
}

impl AdminGuard {
    /// Load persisted sessions. A malformed file counts as a logout: it is
    /// removed and the guard starts empty. Expired sessions are dropped.
    pub async fn load(store: Store, path: &Path, ttl_hours: i64) -> Self {
        let sessions = read_sessions(path).await;
        let now = Utc::now();
        let total = sessions.len();
        let sessions: HashMap<_, _> = sessions
            .into_iter()
            .filter(|(_, session)| session.is_valid_at(now))
            .collect();

        let dropped = total - sessions.len();

        let guard = Self {
            store,
            sessions: Mutex::new(HashMap::new()),
            path: path.to_path_buf(),
            ttl: Duration::hours(ttl_hours),
        };

        if dropped > 0 {
            tracing::info!("Dropped {} expired admin sessions", dropped);
            guard.persist_quietly(&sessions).await;
        }

        *guard.sessions.lock().await = sessions;
        guard
    }

    /// Check credentials and open a session. Unknown user and wrong password
    /// fail the same way.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, AdminSession), AppError> {
        let user = self.store.find_admin(username).await?;

        let user = match user {
            Some(user) if verify_password(password, &user.password_hash) => user,
            Some(_) => {
                tracing::warn!("Failed admin login for {}", username);
                return Err(AppError::InvalidCredentials);
            }
            None => {
                verify_against_nothing(password);
                tracing::warn!("Failed admin login for {}", username);
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = hex::encode(rand::random::<[u8; 32]>());
        let session = AdminSession {
            identity: AdminIdentity {
                id: user.id,
                username: user.username,
            },
            expires_at: Utc::now() + self.ttl,
        };

        // Memory only changes once the file has been written
        let mut sessions = self.sessions.lock().await;
        let mut updated = sessions.clone();
        updated.insert(token_key(&token), session.clone());
        self.persist(&updated).await?;
        *sessions = updated;

        tracing::info!(
            "Admin {} logged in until {}",
            session.identity.username,
            session.expires_at
        );
        Ok((token, session))
    }

    /// End the session for `token`. Returns whether one existed.
    pub async fn logout(&self, token: &str) -> Result<bool, AppError> {
        let mut sessions = self.sessions.lock().await;
        let mut updated = sessions.clone();
        let Some(session) = updated.remove(&token_key(token)) else {
            return Ok(false);
        };
        self.persist(&updated).await?;
        *sessions = updated;

        tracing::info!("Admin {} logged out", session.identity.username);
        Ok(true)
    }

    /// Resolve a presented token, expiring it if its time is up.
    pub async fn state(&self, token: Option<&str>) -> SessionState {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionState::Unauthenticated;
        };

        let key = token_key(token);
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&key) {
            Some(session) if session.is_valid_at(Utc::now()) => {
                SessionState::Authenticated(session.clone())
            }
            Some(_) => {
                sessions.remove(&key);
                self.persist_quietly(&sessions).await;
                tracing::debug!("Admin session expired");
                SessionState::Unauthenticated
            }
            None => SessionState::Unauthenticated,
        }
    }

    /// Create or reset an admin account.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<(), AppError> {
        let user = self
            .store
            .upsert_admin(username, &hash_password(password))
            .await?;
        tracing::info!("Admin account {} is ready", user.username);
        Ok(())
    }

    async fn persist(&self, sessions: &HashMap<String, AdminSession>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(sessions)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn persist_quietly(&self, sessions: &HashMap<String, AdminSession>) {
        if let Err(e) = self.persist(sessions).await {
            tracing::warn!("Failed to persist admin sessions: {}", e);
        }
    }
}

async fn read_sessions(path: &Path) -> HashMap<String, AdminSession> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            tracing::warn!("Could not read session file {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::warn!(
                "Session file {} is malformed, treating as logged out: {}",
                path.display(),
                e
            );
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!("Could not remove malformed session file: {}", e);
            }
            HashMap::new()
        }
    }
}

fn token_key(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
