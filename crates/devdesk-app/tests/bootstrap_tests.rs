//! Integration tests for the startup sequence.

use std::sync::Arc;

use devdesk_app::{AppConfig, bootstrap};
use devdesk_gateway::{HttpTransport, OutboundRequest, TransportFault, TransportReply};
use devdesk_routing::HOME_PATH;
use url::Url;

mod common;

struct IdleTransport;

impl HttpTransport for IdleTransport {
    fn execute(&self, _request: &OutboundRequest) -> Result<TransportReply, TransportFault> {
        Err(TransportFault::Unreachable("not used here".to_string()))
    }
}

fn config_in(temp_name: &str) -> AppConfig {
    let state_dir = std::env::temp_dir().join(format!("{temp_name}-{}", std::process::id()));
    AppConfig {
        api_base: "http://localhost:8080/api".to_string(),
        credential_path: state_dir.join("token"),
    }
}

#[test]
fn bootstrap_tests_hydrates_persisted_credential_before_first_navigation() {
    let config = config_in("devdesk-boot-hydrate");
    let token = common::issue_token(5, "grace", &["developer"]);
    std::fs::create_dir_all(config.credential_path.parent().expect("slot parent"))
        .expect("state dir should create");
    std::fs::write(&config.credential_path, &token).expect("slot should write");

    let start = Url::parse("http://localhost:5173/").expect("start url");
    let app = bootstrap(
        &config,
        Arc::new(IdleTransport),
        Arc::new(common::RecordingSink::default()),
        &start,
    )
    .expect("bootstrap should pass");

    assert!(app.session.is_authenticated());
    assert_eq!(app.router.current_path(), HOME_PATH);

    let _ = std::fs::remove_dir_all(config.credential_path.parent().expect("slot parent"));
}

#[test]
fn bootstrap_tests_consumes_oauth_fragment_and_lands_on_root() {
    let config = config_in("devdesk-boot-oauth");
    let token = common::issue_token(6, "lin", &[]);
    let encoded: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
    let start = Url::parse(&format!("http://localhost:5173/#token={encoded}"))
        .expect("start url");

    let app = bootstrap(
        &config,
        Arc::new(IdleTransport),
        Arc::new(common::RecordingSink::default()),
        &start,
    )
    .expect("bootstrap should pass");

    assert!(app.session.is_authenticated());
    assert_eq!(app.session.store().get(), Some(token.clone()));
    assert_eq!(app.router.current_path(), HOME_PATH);
    // Delivered credential reached the persistent slot as well.
    assert_eq!(
        std::fs::read_to_string(&config.credential_path).expect("slot should exist"),
        token
    );

    let _ = std::fs::remove_dir_all(config.credential_path.parent().expect("slot parent"));
}
