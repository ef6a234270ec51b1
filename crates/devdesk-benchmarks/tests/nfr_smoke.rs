//! Benchmark smoke test for the decode-then-guard hot path.

use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use devdesk_routing::{RouteTable, Router, evaluate_guard};
use devdesk_session::decode_claims;

#[test]
fn benchmark_session_hot_path_prints_latency() {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        r#"{"uid":7,"uname":"ada","sub":"ada","roles":["developer"],"iat":1700000000,"exp":1700086400}"#,
    );
    let token = format!("{header}.{payload}.fixture-signature");

    let table = RouteTable::platform_default();
    let router = Router::new(table.clone());

    let start = Instant::now();
    let mut decoded_roles = 0_usize;
    let mut proceeds = 0_usize;

    for index in 0..10_000 {
        let claims = decode_claims(&token).expect("fixture token should decode");
        decoded_roles += claims.roles.len();

        let route = table
            .resolve("/deploy")
            .expect("platform table should resolve /deploy");
        if evaluate_guard(route, index % 2 == 0) == devdesk_routing::GuardDecision::Proceed {
            proceeds += 1;
        }
        let _ = router.navigate("/deploy", true);
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("benchmark_session_hot_path_elapsed_ms={elapsed_ms}");
    println!("benchmark_decoded_roles_total={decoded_roles}");
    println!("benchmark_guard_proceeds={proceeds}");

    // Loose bound; strict latency targets depend on the host environment.
    assert!(
        elapsed_ms < 5_000,
        "session hot path smoke benchmark should stay bounded"
    );
}
