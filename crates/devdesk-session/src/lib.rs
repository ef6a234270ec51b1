#![warn(missing_docs)]
//! # devdesk-session
//!
//! ## Purpose
//! Owns the bearer credential and the session state derived from it.
//!
//! ## Responsibilities
//! - Persist the credential in exactly one named storage slot.
//! - Decode identity claims from the credential without a network call.
//! - Drive the `init`/`login`/`logout` session lifecycle.
//! - Expose the permission-check seam used by call sites.
//!
//! ## Data flow
//! Login or the OAuth callback writes the credential into
//! [`CredentialStore`] -> [`decode_claims`] derives [`Claims`] ->
//! [`SessionContext`] publishes the shared snapshot read by the gateway and
//! the navigation guard.
//!
//! ## Ownership and lifetimes
//! Credential and claim values are owned (`String`) so transport, storage,
//! and session lifetimes stay decoupled. The context and store are cheap to
//! clone and share one state behind `Arc`.
//!
//! ## Error model
//! Malformed credentials return [`DecodeError`] and degrade to logged-out
//! state; persistence failures return [`SlotError`] but are swallowed by the
//! store so the in-memory value always reflects the caller's intent.
//!
//! ## Security and privacy notes
//! This crate never logs credential or claim values. Diagnostics should use
//! [`credential_fingerprint`] instead of the raw token.
//!
//! ## Example
//! ```rust
//! use devdesk_session::{CredentialStore, MemorySlot, SessionContext};
//! use std::sync::Arc;
//!
//! let store = CredentialStore::new(Arc::new(MemorySlot::default()));
//! let session = SessionContext::new(store);
//! session.init();
//! assert!(!session.is_authenticated());
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Name of the single persisted credential slot.
pub const CREDENTIAL_SLOT_NAME: &str = "token";

/// Signature schemes the platform issues; anything else is rejected.
const SUPPORTED_SCHEMES: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Identity claims decoded from a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user identifier.
    pub user_id: i64,
    /// Login username.
    pub username: String,
    /// Token subject identifier.
    pub subject: String,
    /// Granted role names; empty when the token carries none.
    pub roles: Vec<String>,
}

#[derive(Deserialize)]
struct WireHeader {
    alg: String,
}

#[derive(Deserialize)]
struct WireClaims {
    uid: i64,
    uname: String,
    sub: String,
    #[serde(default)]
    roles: Vec<String>,
}

/// Parses a compact signed token into identity claims.
///
/// This is a parsing operation only: the signature is not verified because no
/// key material exists client-side. The server remains the trust authority.
///
/// # Errors
/// Returns [`DecodeError`] for truncated structures, undecodable segments,
/// unsupported signature schemes, or claim sets missing mandatory fields.
/// Never panics on malformed input.
pub fn decode_claims(credential: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Structure(
            "expected three dot-separated segments",
        ));
    }

    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(DecodeError::Structure("token segment is empty"));
    }

    let header_bytes = URL_SAFE_NO_PAD.decode(segments[0])?;
    let header: WireHeader = serde_json::from_slice(&header_bytes)?;
    if !SUPPORTED_SCHEMES.contains(&header.alg.as_str()) {
        return Err(DecodeError::UnsupportedScheme(header.alg));
    }

    let payload_bytes = URL_SAFE_NO_PAD.decode(segments[1])?;
    let wire: WireClaims = serde_json::from_slice(&payload_bytes)?;

    Ok(Claims {
        user_id: wire.uid,
        username: wire.uname,
        subject: wire.sub,
        roles: wire.roles,
    })
}

/// Returns a short log-safe fingerprint of a credential.
///
/// The fingerprint is the hex-encoded first eight bytes of the SHA-256
/// digest; it identifies a credential in diagnostics without exposing it.
pub fn credential_fingerprint(credential: &str) -> String {
    let digest = Sha256::digest(credential.as_bytes());
    hex::encode(&digest[..8])
}

/// Errors produced by claim decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Token does not have the expected segment structure.
    #[error("invalid token structure: {0}")]
    Structure(&'static str),
    /// A token segment is not valid URL-safe base64.
    #[error("invalid token segment: {0}")]
    Segment(#[from] base64::DecodeError),
    /// Header or claim set is not JSON or misses mandatory claims.
    #[error("invalid token claims: {0}")]
    Schema(#[from] serde_json::Error),
    /// Token is signed with a scheme the platform does not issue.
    #[error("unsupported signature scheme: {0}")]
    UnsupportedScheme(String),
}

/// Abstract persistent medium holding the single credential slot.
///
/// Implementations must survive process restarts when the medium allows it;
/// the store treats every failure as non-fatal.
pub trait CredentialSlot: Send + Sync {
    /// Reads the persisted credential, `None` when the slot is absent.
    ///
    /// # Errors
    /// Returns [`SlotError`] when the medium cannot be read.
    fn load(&self) -> Result<Option<String>, SlotError>;

    /// Writes the credential into the slot.
    ///
    /// # Errors
    /// Returns [`SlotError`] when the medium rejects the write.
    fn store(&self, credential: &str) -> Result<(), SlotError>;

    /// Removes the slot; absence of the slot means logged out.
    ///
    /// # Errors
    /// Returns [`SlotError`] when the medium rejects the removal.
    fn clear(&self) -> Result<(), SlotError>;
}

/// Persistence medium failures.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Filesystem-level failure.
    #[error("slot io failure: {0}")]
    Io(#[from] std::io::Error),
    /// Medium denied access or ran out of quota.
    #[error("slot unavailable: {0}")]
    Unavailable(String),
}

/// In-memory slot used by tests and offline runs.
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl CredentialSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        Ok(self.value.lock().expect("memory slot lock").clone())
    }

    fn store(&self, credential: &str) -> Result<(), SlotError> {
        *self.value.lock().expect("memory slot lock") = Some(credential.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SlotError> {
        *self.value.lock().expect("memory slot lock") = None;
        Ok(())
    }
}

/// File-backed slot: one file, one credential line.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Creates a slot backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialSlot for FileSlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SlotError::Io(error)),
        }
    }

    fn store(&self, credential: &str) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, credential)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SlotError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SlotError::Io(error)),
        }
    }
}

/// Owner of the single bearer credential.
///
/// Writes go to memory first and are mirrored into the persistent slot on a
/// best-effort basis: when the medium fails, `get` still reflects the latest
/// `set`/`clear` for the current process lifetime.
#[derive(Clone)]
pub struct CredentialStore {
    value: Arc<Mutex<Option<String>>>,
    slot: Arc<dyn CredentialSlot>,
}

impl CredentialStore {
    /// Creates a store hydrated from the persistent slot.
    ///
    /// A slot that cannot be read behaves as an absent slot.
    pub fn new(slot: Arc<dyn CredentialSlot>) -> Self {
        let initial = slot.load().unwrap_or_default();
        Self {
            value: Arc::new(Mutex::new(initial.filter(|raw| !raw.is_empty()))),
            slot,
        }
    }

    /// Creates a store with no persistence beyond the current process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySlot::default()))
    }

    /// Returns the current credential; `None` means logged out.
    pub fn get(&self) -> Option<String> {
        self.value.lock().expect("credential store lock").clone()
    }

    /// Returns `true` when a non-empty credential is held.
    pub fn has_credential(&self) -> bool {
        self.get().is_some()
    }

    /// Replaces the credential.
    ///
    /// An empty credential is equivalent to [`CredentialStore::clear`]. The
    /// in-memory value is updated before the persistent slot is touched, so
    /// subsequent `get` calls observe the write even when persistence fails.
    pub fn set(&self, credential: &str) {
        if credential.is_empty() {
            self.clear();
            return;
        }

        *self.value.lock().expect("credential store lock") = Some(credential.to_string());
        let _ = self.slot.store(credential);
    }

    /// Removes the credential from memory and, best-effort, from the slot.
    pub fn clear(&self) {
        *self.value.lock().expect("credential store lock") = None;
        let _ = self.slot.clear();
    }
}

/// Session state snapshot derived from the current credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    /// Decoded identity; absent when logged out or undecodable.
    pub claims: Option<Claims>,
    /// `true` exactly when a decodable credential is held.
    pub authenticated: bool,
}

/// Authorization policy seam consulted by [`SessionContext::has_permission`].
pub trait AccessPolicy: Send + Sync {
    /// Decides whether the session may perform an action requiring `roles`.
    fn allows(&self, snapshot: &SessionSnapshot, required_roles: &[String]) -> bool;
}

/// Platform policy: every authenticated principal has full access.
///
/// Role lists are carried in the data model but intentionally not enforced;
/// substitute a stricter [`AccessPolicy`] to change that without touching
/// call sites.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAuthenticatedPolicy;

impl AccessPolicy for AllowAuthenticatedPolicy {
    fn allows(&self, snapshot: &SessionSnapshot, _required_roles: &[String]) -> bool {
        snapshot.authenticated
    }
}

/// Process-wide session context shared by the gateway and navigation guard.
///
/// All mutating operations update the shared snapshot synchronously before
/// returning; any reader observing the call's completion sees the new state.
#[derive(Clone)]
pub struct SessionContext {
    store: CredentialStore,
    state: Arc<Mutex<SessionSnapshot>>,
    policy: Arc<dyn AccessPolicy>,
}

impl SessionContext {
    /// Creates a context with the platform's permissive access policy.
    pub fn new(store: CredentialStore) -> Self {
        Self::with_policy(store, Arc::new(AllowAuthenticatedPolicy))
    }

    /// Creates a context with a custom access policy.
    pub fn with_policy(store: CredentialStore, policy: Arc<dyn AccessPolicy>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(SessionSnapshot::default())),
            policy,
        }
    }

    /// Hydrates session state from the credential store.
    ///
    /// Idempotent: repeated calls without an intervening credential change
    /// produce the same snapshot. An undecodable persisted credential
    /// degrades to [`SessionContext::logout`] semantics.
    pub fn init(&self) {
        match self.store.get() {
            Some(credential) => match decode_claims(&credential) {
                Ok(claims) => self.publish(SessionSnapshot {
                    claims: Some(claims),
                    authenticated: true,
                }),
                Err(_) => self.logout(),
            },
            None => self.publish(SessionSnapshot::default()),
        }
    }

    /// Stores the credential and derives session state from it.
    ///
    /// The credential is persisted before decoding. A decode failure leaves
    /// the credential in the store but applies logged-out claim semantics
    /// (no claims, not authenticated); the next [`SessionContext::init`]
    /// then degrades the stale value to a full logout.
    ///
    /// # Errors
    /// Returns the [`DecodeError`] after the fallback has been applied, so
    /// callers can surface feedback without re-checking state.
    pub fn login(&self, credential: &str) -> Result<Claims, DecodeError> {
        self.store.set(credential);
        match decode_claims(credential) {
            Ok(claims) => {
                self.publish(SessionSnapshot {
                    claims: Some(claims.clone()),
                    authenticated: true,
                });
                Ok(claims)
            }
            Err(error) => {
                self.publish(SessionSnapshot::default());
                Err(error)
            }
        }
    }

    /// Clears the credential and all derived state. Never fails.
    pub fn logout(&self) {
        self.store.clear();
        self.publish(SessionSnapshot::default());
    }

    /// Returns the current state snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().expect("session state lock").clone()
    }

    /// Returns `true` when a decodable credential is held.
    pub fn is_authenticated(&self) -> bool {
        self.snapshot().authenticated
    }

    /// Returns the current credential for request-phase attachment.
    pub fn credential(&self) -> Option<String> {
        self.store.get()
    }

    /// Returns the shared credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Consults the access policy for the given role requirement.
    pub fn has_permission(&self, required_roles: &[String]) -> bool {
        self.policy.allows(&self.snapshot(), required_roles)
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        *self.state.lock().expect("session state lock") = snapshot;
    }
}
