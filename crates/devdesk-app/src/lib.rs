#![warn(missing_docs)]
//! # devdesk-app
//!
//! ## Purpose
//! Orchestrates session, gateway, routing, and the OAuth redirect handshake
//! for the `devdesk` console.
//!
//! ## Responsibilities
//! - Hydrate session state from the persisted credential at startup.
//! - Consume a provider-delivered `#token=` URL fragment before the router's
//!   first navigation, then scrub it.
//! - Wire the gateway's notice and navigation side-channels.
//! - Project runtime state into a flat status snapshot.
//!
//! ## Data flow
//! Persisted credential or OAuth fragment -> session context -> router guard
//! and gateway request phase -> on forced logout the gateway signals the
//! router back through the navigation seam.
//!
//! ## Ownership and lifetimes
//! [`App`] owns cheap clones/`Arc` handles of every subsystem; the wiring
//! structs hold the same shared state rather than referencing the app.
//!
//! ## Error model
//! Subsystem construction failures surface as [`AppError`]; runtime failure
//! handling lives in the gateway and session crates.
//!
//! ## Security and privacy notes
//! Status projection exposes a credential fingerprint, never the credential.

use std::sync::Arc;

use devdesk_api::AuthApi;
use devdesk_core::{Notice, NoticeLevel};
use devdesk_gateway::{ApiGateway, GatewayError, HttpTransport, Navigator, NoticeSink};
use devdesk_routing::{HOME_PATH, RouteTable, Router, page_title};
use devdesk_session::{
    CREDENTIAL_SLOT_NAME, CredentialStore, FileSlot, SessionContext, credential_fingerprint,
};
use thiserror::Error;
use url::Url;

/// Build-time application version loaded from the root `VERSION` file.
pub const APP_VERSION: &str = env!("DEVDESK_VERSION");

/// Recognized URL-fragment prefix for provider-delivered credentials.
pub const OAUTH_FRAGMENT_PREFIX: &str = "token=";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Environment-derived application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend API base URL.
    pub api_base: String,
    /// File path of the persisted credential slot.
    pub credential_path: std::path::PathBuf,
}

impl AppConfig {
    /// Reads configuration from the environment.
    ///
    /// Semantics:
    /// - `DEVDESK_API_BASE` overrides the backend base URL.
    /// - `DEVDESK_STATE_DIR` overrides the directory holding the credential
    ///   slot file; the file itself is always named after the slot.
    pub fn from_env() -> Self {
        let api_base = std::env::var("DEVDESK_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8080/api".to_string());
        let state_dir = std::env::var("DEVDESK_STATE_DIR")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| std::path::PathBuf::from(".devdesk"));

        Self {
            api_base,
            credential_path: state_dir.join(CREDENTIAL_SLOT_NAME),
        }
    }
}

/// Result of consuming a provider redirect fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    /// Start URL with the credential fragment removed.
    pub scrubbed: Url,
    /// Whether the handler directs navigation to the root path.
    pub navigate_home: bool,
}

/// Consumes a provider-delivered credential fragment, if present.
///
/// Recognizes exactly `#token=<url-encoded credential>`: the credential is
/// decoded and fed into [`SessionContext::login`], the fragment is removed
/// from the returned URL, and navigation to the root path is requested when
/// the start path is the root (or a root-relative fragment path). Any other
/// fragment shape is a no-op. The scrubbed URL carries no fragment, so
/// feeding it back in cannot re-trigger the handler.
pub fn consume_oauth_fragment(current: &Url, session: &SessionContext) -> Option<CallbackOutcome> {
    let fragment = current.fragment()?;
    if !fragment.starts_with(OAUTH_FRAGMENT_PREFIX) {
        return None;
    }

    let credential = url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())?;
    if credential.is_empty() {
        return None;
    }

    // An undecodable delivered credential stays stored but unauthenticated;
    // the session context owns that fallback.
    let _ = session.login(&credential);

    let mut scrubbed = current.clone();
    scrubbed.set_fragment(None);
    // A root-relative fragment path parses to path "/" plus the fragment,
    // so the root check covers both delivery shapes.
    let navigate_home = current.path() == HOME_PATH;

    Some(CallbackOutcome {
        scrubbed,
        navigate_home,
    })
}

/// Notice sink writing to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNoticeSink;

impl NoticeSink for StderrNoticeSink {
    fn publish(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", notice.message);
    }
}

/// Navigation seam implementation backed by the shared router.
///
/// The gateway's fire-and-forget redirect becomes one regular navigation
/// attempt, so the guard still runs exactly once for it.
struct RouterNavigator {
    router: Arc<Router>,
    session: SessionContext,
}

impl Navigator for RouterNavigator {
    fn current_path(&self) -> String {
        self.router.current_path()
    }

    fn redirect(&self, path: &str) {
        self.router
            .navigate(path, self.session.store().has_credential());
    }
}

/// Assembled application subsystems.
pub struct App {
    /// Shared session context.
    pub session: SessionContext,
    /// Shared router.
    pub router: Arc<Router>,
    /// Configured gateway.
    pub gateway: ApiGateway,
    /// Authentication endpoint client.
    pub auth: AuthApi,
}

/// Builds the application and performs the startup sequence.
///
/// Order matters: the session hydrates from the persisted slot first, the
/// OAuth fragment is consumed next, and only then does the router perform
/// its first navigation.
///
/// # Errors
/// Returns [`AppError`] when the gateway configuration is invalid.
pub fn bootstrap(
    config: &AppConfig,
    transport: Arc<dyn HttpTransport>,
    notices: Arc<dyn NoticeSink>,
    start_url: &Url,
) -> Result<App, AppError> {
    let store = CredentialStore::new(Arc::new(FileSlot::new(&config.credential_path)));
    let session = SessionContext::new(store);
    session.init();

    let callback = consume_oauth_fragment(start_url, &session);

    let router = Arc::new(Router::new(RouteTable::platform_default()));
    let navigator = Arc::new(RouterNavigator {
        router: router.clone(),
        session: session.clone(),
    });
    let gateway = ApiGateway::new(&config.api_base, transport, session.clone(), notices, navigator)?;
    let auth = AuthApi::new(gateway.clone());

    let initial = match &callback {
        Some(outcome) if outcome.navigate_home => HOME_PATH,
        _ => start_url.path(),
    };
    router.navigate(initial, session.store().has_credential());

    Ok(App {
        session,
        router,
        gateway,
        auth,
    })
}

/// Flat runtime snapshot for simple status rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStatus {
    /// Application version.
    pub version: String,
    /// Whether a decodable credential is held.
    pub authenticated: bool,
    /// Current principal's username, when authenticated.
    pub username: Option<String>,
    /// Log-safe fingerprint of the held credential.
    pub credential_digest: Option<String>,
    /// Path navigation last settled on.
    pub current_path: String,
    /// Title of the settled path.
    pub page_title: String,
}

/// Projects shared state into a [`RuntimeStatus`].
pub fn project_runtime_status(app: &App) -> RuntimeStatus {
    let snapshot = app.session.snapshot();
    let current_path = app.router.current_path();
    let route = app.router.table().resolve(&current_path);

    RuntimeStatus {
        version: APP_VERSION.to_string(),
        authenticated: snapshot.authenticated,
        username: snapshot.claims.map(|claims| claims.username),
        credential_digest: app
            .session
            .credential()
            .map(|credential| credential_fingerprint(&credential)),
        current_path,
        page_title: page_title(route),
    }
}

/// App assembly error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Gateway configuration failure.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    /// Malformed start URL handed to bootstrap.
    #[error("invalid start url: {0}")]
    StartUrl(#[from] url::ParseError),
}
