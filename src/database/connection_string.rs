//! Connection string parser.
//!
//! Accepts PDO-style strings such as
//! `mysql:host=localhost;dbname=test;uid=root;pwd=secret`. Credential keys
//! are recognized through a fixed alias table and consumed; every other
//! non-empty token passes through verbatim into a driver-specific `dsn`
//! fragment, so host, port, charset, TLS flags and any other driver option
//! reach the backend without this layer having to enumerate them.

use crate::error::{AdapterError, AdapterResult};

const USER_ID_KEYS: &[&str] = &["uid", "user", "username", "userid", "user id"];
const PASSWORD_KEYS: &[&str] = &["pwd", "password"];

/// Parsed connection parameters.
///
/// Built fresh per parse call and not mutated afterwards; owned by the
/// adapter that parsed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Driver-specific passthrough fragment, `;`-joined in input order.
    pub dsn: String,
    pub user_id: String,
    pub password: String,
}

impl ConnectionInfo {
    /// Parses `raw` for the driver family identified by `prefix`.
    ///
    /// Fails with [`AdapterError::NotApplicable`] when `raw` does not
    /// contain the literal `"{prefix}:"` marker, signaling that the string
    /// is addressed to a different driver family.
    pub fn parse(raw: &str, prefix: &'static str) -> AdapterResult<Self> {
        let trimmed = raw.trim();
        let marker = format!("{prefix}:");
        let Some(pos) = trimmed.find(&marker) else {
            return Err(AdapterError::NotApplicable(prefix));
        };

        // Drop the first marker occurrence; everything around it is tokens.
        let mut remainder = String::with_capacity(trimmed.len());
        remainder.push_str(&trimmed[..pos]);
        remainder.push_str(&trimmed[pos + marker.len()..]);

        let mut info = Self::default();
        for token in remainder.split(';') {
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key.trim().to_lowercase(), value.trim()),
                None => (String::new(), token.trim()),
            };

            if USER_ID_KEYS.contains(&key.as_str()) {
                info.user_id = value.to_string();
            } else if PASSWORD_KEYS.contains(&key.as_str()) {
                info.password = value.to_string();
            } else if !token.is_empty() {
                if !info.dsn.is_empty() {
                    info.dsn.push(';');
                }
                info.dsn.push_str(token);
            }
        }

        Ok(info)
    }

    /// First non-empty value among `keys` in the dsn fragment,
    /// case-insensitive on the key side.
    pub fn param(&self, keys: &[&str]) -> Option<String> {
        let params: Vec<(String, String)> = self
            .dsn
            .split(';')
            .filter_map(|token| token.split_once('='))
            .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
            .collect();

        for key in keys {
            if let Some((_, value)) = params.iter().find(|(k, _)| k == key) {
                if !value.is_empty() {
                    return Some(value.clone());
                }
            }
        }
        None
    }
}
