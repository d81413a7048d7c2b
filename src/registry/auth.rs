//! Registry credentials from `.npmrc`.
//!
//! Credentials are keyed by the registry's "nerf dart": the URL without its
//! protocol, e.g. `//registry.npmjs.org` for `https://registry.npmjs.org/`.

use crate::registry::npmrc::{ConfigSource, RegistryResolver};
use crate::types::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use tracing::debug;
use url::Url;

/// Authorization scheme for a registry request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Bearer,
    Basic,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer => write!(f, "Bearer"),
            Self::Basic => write!(f, "Basic"),
        }
    }
}

/// A credential to send with registry requests.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthInfo {
    pub token: String,
    pub auth_type: AuthType,
}

impl AuthInfo {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            auth_type: AuthType::Bearer,
        }
    }

    pub fn basic(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            auth_type: AuthType::Basic,
        }
    }

    /// Value for the `authorization` header.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.auth_type, self.token)
    }
}

impl fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInfo")
            .field("auth_type", &self.auth_type)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Key prefix for credentials of `registry_url`: `//host[:port]/path`
/// without a trailing slash.
pub fn nerf_dart(registry_url: &str) -> Result<String> {
    let url = Url::parse(registry_url)?;
    let host = url.host_str().unwrap_or_default();
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let path = url.path().trim_end_matches('/');
    Ok(format!("//{authority}{path}"))
}

/// Look up credentials for `registry_url` in `config`.
///
/// Checked in order: a bearer `_authToken`, a `username`/`_password` pair
/// (password stored base64-encoded), then the legacy global `_auth`.
pub fn auth_from_config(config: &impl ConfigSource, registry_url: &str) -> Option<AuthInfo> {
    let key = match nerf_dart(registry_url) {
        Ok(key) => key,
        Err(e) => {
            debug!("Cannot derive auth key for {}: {}", registry_url, e);
            return None;
        }
    };

    let token = config
        .get(&format!("{key}/:_authToken"))
        .or_else(|| config.get(&format!("{key}:_authToken")));
    if let Some(token) = token {
        debug!("Using bearer token for {}", key);
        return Some(AuthInfo::bearer(token));
    }

    let username = config.get(&format!("{key}/:username"));
    let password = config.get(&format!("{key}/:_password"));
    if let (Some(username), Some(password)) = (username, password) {
        debug!("Using basic auth for {}", key);
        let password = decode_password(password);
        return Some(AuthInfo::basic(STANDARD.encode(format!("{username}:{password}"))));
    }

    config.get("_auth").map(|auth| {
        debug!("Using legacy _auth for {}", key);
        AuthInfo::basic(auth)
    })
}

/// Credentials for `registry_url` using the process environment.
pub fn get_auth_token(registry_url: &str) -> Option<AuthInfo> {
    RegistryResolver::from_environment().auth_token(registry_url)
}

/// Decode a base64 `.npmrc` password; anything undecodable counts as empty.
fn decode_password(encoded: &str) -> String {
    STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::npmrc::{EnvSnapshot, NpmrcConfig};

    fn config(content: &str) -> NpmrcConfig {
        NpmrcConfig::parse(content, &EnvSnapshot::default())
    }

    #[test]
    fn test_nerf_dart() {
        assert_eq!(nerf_dart("https://registry.npmjs.org/").unwrap(), "//registry.npmjs.org");
        assert_eq!(
            nerf_dart("https://npm.pkg.github.com/owner/").unwrap(),
            "//npm.pkg.github.com/owner"
        );
        assert_eq!(nerf_dart("http://127.0.0.1:4873/").unwrap(), "//127.0.0.1:4873");
        assert!(nerf_dart("not a url").is_err());
    }

    #[test]
    fn test_bearer_token() {
        let cfg = config("//registry.example/:_authToken=abc123");
        let auth = auth_from_config(&cfg, "https://registry.example/").unwrap();
        assert_eq!(auth, AuthInfo::bearer("abc123"));
        assert_eq!(auth.header_value(), "Bearer abc123");

        let cfg = config("//registry.example:_authToken=noslash");
        let auth = auth_from_config(&cfg, "https://registry.example/").unwrap();
        assert_eq!(auth.token, "noslash");
    }

    #[test]
    fn test_basic_auth_pair() {
        // "hunter2" base64-encoded
        let cfg = config("//registry.example/:username=alice\n//registry.example/:_password=aHVudGVyMg==");
        let auth = auth_from_config(&cfg, "https://registry.example").unwrap();
        assert_eq!(auth.auth_type, AuthType::Basic);
        assert_eq!(auth.token, STANDARD.encode("alice:hunter2"));
    }

    #[test]
    fn test_malformed_password_is_empty() {
        let cfg = config("//registry.example/:username=alice\n//registry.example/:_password=!!!notbase64");
        let auth = auth_from_config(&cfg, "https://registry.example/").unwrap();
        assert_eq!(auth.token, STANDARD.encode("alice:"));
    }

    #[test]
    fn test_token_wins_over_basic_and_legacy() {
        let cfg = config(
            "_auth=bGVnYWN5\n//registry.example/:username=alice\n//registry.example/:_password=eA==\n//registry.example/:_authToken=tok",
        );
        let auth = auth_from_config(&cfg, "https://registry.example/").unwrap();
        assert_eq!(auth, AuthInfo::bearer("tok"));
    }

    #[test]
    fn test_legacy_auth() {
        let cfg = config("_auth=bGVnYWN5");
        let auth = auth_from_config(&cfg, "https://anything.example/").unwrap();
        assert_eq!(auth, AuthInfo::basic("bGVnYWN5"));
    }

    #[test]
    fn test_no_credentials() {
        let cfg = config("//other.example/:_authToken=abc");
        assert!(auth_from_config(&cfg, "https://registry.example/").is_none());
        assert!(auth_from_config(&cfg, "::bad::").is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", AuthInfo::bearer("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
