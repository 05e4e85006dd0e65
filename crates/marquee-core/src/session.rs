// TMDB session lifecycle: the approval handshake and the on-disk session store
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use marquee_api::media::{SessionKind, SessionResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::repository::MediaRepository;
use crate::{ErrorKind, Resource};

const SECONDS_PER_DAY: i64 = 86_400;

/// Ten years is plenty
const MAX_VALID_SECONDS: i64 = 3650 * SECONDS_PER_DAY;

/// A usable session, with the account it belongs to when there is one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    /// Guest sessions have no account
    pub account_id: Option<i64>,
}

impl SessionInfo {
    /// A session without an account is a guest session
    pub fn kind(&self) -> SessionKind {
        match self.account_id {
            Some(_) => SessionKind::User,
            None => SessionKind::Guest,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.kind() == SessionKind::Guest
    }
}

/// The step between minting a request token and exchanging it.
///
/// TMDB only hands out a session once the user has approved the token in a
/// browser; implementations decide how to wait for that.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenApprover: Send + Sync {
    async fn approve(&self, request_token: &str) -> bool;
}

/// Request token, approval, session. Stops at the first step that fails.
pub async fn open_session(
    repo: &dyn MediaRepository,
    approver: &dyn TokenApprover,
) -> Resource<String> {
    info!("Requesting TMDB request token");
    let token = match repo.create_request_token().await {
        Resource::Success(response) => response.request_token,
        other => return other.failure(),
    };

    if !approver.approve(&token).await {
        return Resource::error(ErrorKind::InvalidRequest, "Request token was not approved");
    }

    match repo.create_session(&token).await {
        Resource::Success(SessionResponse {
            session_id: Some(session_id),
            ..
        }) => {
            info!("TMDB session created");
            Resource::Success(session_id)
        }
        Resource::Success(_) => Resource::error(
            ErrorKind::EmptyBody,
            "Session response did not include a session id",
        ),
        other => other.failure(),
    }
}

/// [`open_session`] followed by the account lookup
pub async fn bootstrap_session(
    repo: &dyn MediaRepository,
    approver: &dyn TokenApprover,
) -> Resource<SessionInfo> {
    let session_id = match open_session(repo, approver).await {
        Resource::Success(id) => id,
        other => return other.failure(),
    };

    match repo.account_details(&session_id).await {
        Resource::Success(account) => {
            info!("Signed in as {}", account.username);
            Resource::Success(SessionInfo {
                session_id,
                account_id: Some(account.id),
            })
        }
        other => other.failure(),
    }
}

pub async fn open_guest_session(repo: &dyn MediaRepository) -> Resource<SessionInfo> {
    match repo.create_guest_session().await {
        Resource::Success(response) => match response.guest_session_id {
            Some(session_id) => {
                info!("TMDB guest session created");
                Resource::Success(SessionInfo {
                    session_id,
                    account_id: None,
                })
            }
            None => Resource::error(
                ErrorKind::EmptyBody,
                "Guest session response did not include a session id",
            ),
        },
        other => other.failure(),
    }
}

/// Sessions saved per profile, obfuscated and expiring
///
/// Session ids are XORed with a machine-specific key and base64 encoded. That
/// keeps them out of casual view; it is not encryption.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    sessions: HashMap<String, StoredSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    session_id: String,
    account_id: Option<i64>,
    stored_at: DateTime<Utc>,
    valid_for_seconds: i64,
}

impl StoredSession {
    fn expires_at(&self) -> DateTime<Utc> {
        self.stored_at + Duration::seconds(self.valid_for_seconds.clamp(0, MAX_VALID_SECONDS))
    }
}

impl SessionStore {
    /// The store in the default data directory
    pub fn load() -> crate::Result<Self> {
        Self::open(crate::Config::data_dir()?.join("sessions.json"))
    }

    pub fn open(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();

        let sessions = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| {
                crate::Error::SessionError(format!("Failed to parse session store: {}", e))
            })?
        } else {
            HashMap::new()
        };

        Ok(Self { path, sessions })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&self.sessions)?;
        std::fs::write(&self.path, contents)?;
        debug!("Saved {} session(s) to {}", self.sessions.len(), self.path.display());
        Ok(())
    }

    pub fn set(&mut self, profile: &str, session: &SessionInfo, valid_for_days: u64) {
        let valid_for_seconds = i64::try_from(valid_for_days)
            .unwrap_or(i64::MAX)
            .saturating_mul(SECONDS_PER_DAY)
            .min(MAX_VALID_SECONDS);

        self.sessions.insert(
            profile.to_string(),
            StoredSession {
                session_id: STANDARD.encode(xor(session.session_id.as_bytes())),
                account_id: session.account_id,
                stored_at: Utc::now(),
                valid_for_seconds,
            },
        );
    }

    /// The saved session, unless it has expired or cannot be read back
    pub fn get(&self, profile: &str) -> Option<SessionInfo> {
        let stored = self.sessions.get(profile)?;

        if Utc::now() >= stored.expires_at() {
            return None;
        }

        let bytes = STANDARD.decode(&stored.session_id).ok()?;
        let session_id = String::from_utf8(xor(&bytes)).ok()?;

        Some(SessionInfo {
            session_id,
            account_id: stored.account_id,
        })
    }

    pub fn remove(&mut self, profile: &str) -> bool {
        self.sessions.remove(profile).is_some()
    }

    /// Whole days left; 0 once expired
    pub fn days_remaining(&self, profile: &str) -> Option<i64> {
        let stored = self.sessions.get(profile)?;
        let left = stored.expires_at().signed_duration_since(Utc::now());
        Some(left.num_days().max(0))
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}

fn xor(data: &[u8]) -> Vec<u8> {
    let key = machine_key();
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

/// 32 bytes derived from hostname and user name
fn machine_key() -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    let seed = format!("marquee-{}-{}", hostname, whoami::username());

    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);

    let mut value = hasher.finish();
    let mut key = Vec::with_capacity(32);
    for _ in 0..4 {
        key.extend_from_slice(&value.to_le_bytes());
        value = value.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    }
    key
}
