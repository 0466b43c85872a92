//! Session-cookie authentication.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Cookie name carrying the session.
pub const SESSION_COOKIE: &str = "session";

/// Issues and verifies signed session cookies.
///
/// A cookie value is `<token>.<tag>`, the tag being a SHA-256 over the
/// signing secret and the token. The secret is random per process unless
/// pinned in configuration, so a restart invalidates outstanding sessions.
#[derive(Clone)]
pub struct Sessions {
    secret: String,
    username: String,
    password: String,
}

impl Sessions {
    pub fn new(secret: String, username: String, password: String) -> Self {
        Self {
            secret,
            username,
            password,
        }
    }

    pub fn check_login(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }

    /// Mint a fresh cookie value.
    pub fn issue(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let tag = self.tag(&token);
        format!("{token}.{tag}")
    }

    pub fn verify(&self, cookie: &str) -> bool {
        match cookie.split_once('.') {
            Some((token, tag)) => tag == self.tag(token),
            None => false,
        }
    }

    fn tag(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(token.as_bytes());
        hex(&hasher.finalize())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> Sessions {
        Sessions::new(
            "secret".to_string(),
            "admin".to_string(),
            "hunter2".to_string(),
        )
    }

    #[test]
    fn issued_cookies_verify() {
        let sessions = sessions();
        let cookie = sessions.issue();
        assert!(sessions.verify(&cookie));
    }

    #[test]
    fn tampered_cookies_fail() {
        let sessions = sessions();
        let cookie = sessions.issue();
        let (token, _tag) = cookie.split_once('.').expect("cookie shape");
        assert!(!sessions.verify(&format!("{token}.bogus")));
        assert!(!sessions.verify(token));
        assert!(!sessions.verify(""));
    }

    #[test]
    fn cookies_are_bound_to_the_secret() {
        let cookie = sessions().issue();
        let other = Sessions::new(
            "different".to_string(),
            "admin".to_string(),
            "hunter2".to_string(),
        );
        assert!(!other.verify(&cookie));
    }

    #[test]
    fn login_checks_both_fields() {
        let sessions = sessions();
        assert!(sessions.check_login("admin", "hunter2"));
        assert!(!sessions.check_login("admin", "wrong"));
        assert!(!sessions.check_login("root", "hunter2"));
    }
}
