#![warn(missing_docs)]
//! # devdesk-app binary
//!
//! Console entry point for devdesk: runs the startup sequence (hydrate,
//! OAuth fragment, first navigation) and prints the runtime status.

use std::sync::Arc;

use devdesk_app::{
    AppConfig, AppError, StderrNoticeSink, app_version, bootstrap, project_runtime_status,
};
use devdesk_gateway::{HttpTransport, OutboundRequest, TransportFault, TransportReply};
use url::Url;

/// Transport used when no backend is reachable from the CLI shell.
///
/// Every dispatch reports an unreachable network, which exercises the same
/// classification path a disconnected console hits.
struct OfflineTransport;

impl HttpTransport for OfflineTransport {
    fn execute(&self, _request: &OutboundRequest) -> Result<TransportReply, TransportFault> {
        Err(TransportFault::Unreachable(
            "no backend transport configured".to_string(),
        ))
    }
}

/// CLI entry point.
fn main() {
    if let Err(error) = run() {
        eprintln!("failed to start devdesk-app {}: {error}", app_version());
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env();
    let start_url = Url::parse(
        &std::env::var("DEVDESK_START_URL")
            .unwrap_or_else(|_| "http://localhost:5173/".to_string()),
    )?;

    let app = bootstrap(
        &config,
        Arc::new(OfflineTransport),
        Arc::new(StderrNoticeSink),
        &start_url,
    )?;
    let status = project_runtime_status(&app);

    println!("devdesk-app {}", status.version);
    println!("api_base={} (DEVDESK_API_BASE)", config.api_base);
    println!("credential_slot={}", config.credential_path.display());
    println!("authenticated={}", status.authenticated);
    if let Some(username) = &status.username {
        println!("user={username}");
    }
    if let Some(digest) = &status.credential_digest {
        println!("credential_digest={digest}");
    }
    println!("path={}", status.current_path);
    println!("title={}", status.page_title);

    Ok(())
}
