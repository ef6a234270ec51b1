//! Shared fixtures for app integration tests.

use std::sync::Mutex;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use devdesk_core::Notice;
use devdesk_gateway::NoticeSink;

/// Issues a conforming unsigned-checkable token for fixture sessions.
#[allow(dead_code)]
pub fn issue_token(uid: i64, username: &str, roles: &[&str]) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let roles_json = serde_json::to_string(roles).expect("roles fixture should encode");
    let payload = URL_SAFE_NO_PAD.encode(format!(
        r#"{{"uid":{uid},"uname":"{username}","sub":"{username}","roles":{roles_json},"iat":1700000000,"exp":1700086400}}"#
    ));
    format!("{header}.{payload}.fixture-signature")
}

/// Notice sink recording everything published through it.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSink {
    /// Published notices in order.
    pub notices: Mutex<Vec<Notice>>,
}

impl NoticeSink for RecordingSink {
    fn publish(&self, notice: Notice) {
        self.notices.lock().expect("notice lock").push(notice);
    }
}
