//! Package name parsing.
//!
//! This module handles:
//! - Splitting a raw name into scope and package segments
//! - Recognizing scoped packages (`@scope/pkg`) and organization handles (`@org`)
//! - Validating names against the registry naming rules (see [`validate`])

pub mod builtins;
pub mod validate;

pub use validate::{validate, NameInput, ValidationResult};

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static SCOPED_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@([^/]+?)/)?([^/]+?)$").expect("scoped package pattern is valid")
});

static ORGANIZATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("organization pattern is valid")
});

/// A package name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedName {
    /// The name exactly as given.
    pub full: String,
    /// Scope without the `@`, e.g. `babel` for `@babel/core`.
    pub scope: Option<String>,
    /// The package segment, or the whole input for unscoped names.
    pub name: String,
    pub is_scoped: bool,
}

/// Parse a raw name. Never fails: input that is not `@scope/name` shaped is
/// treated as a plain unscoped name.
pub fn parse(name: &str) -> ParsedName {
    if let Some(caps) = SCOPED_PACKAGE.captures(name) {
        if let (Some(scope), Some(pkg)) = (caps.get(1), caps.get(2)) {
            return ParsedName {
                full: name.to_string(),
                scope: Some(scope.as_str().to_string()),
                name: pkg.as_str().to_string(),
                is_scoped: true,
            };
        }
    }

    ParsedName {
        full: name.to_string(),
        scope: None,
        name: name.to_string(),
        is_scoped: false,
    }
}

/// True when the name starts with `@` and contains a `/`.
pub fn is_scoped(name: &str) -> bool {
    name.starts_with('@') && name.contains('/')
}

/// True for a standalone scope handle such as `@acme`.
pub fn is_organization(name: &str) -> bool {
    ORGANIZATION.is_match(name)
}

/// The name that gets validated and looked up: organization handles lose their
/// `@` and any `/`, everything else is used as is.
pub fn availability_name(name: &str) -> String {
    if is_organization(name) {
        name.replace(['@', '/'], "")
    } else {
        name.to_string()
    }
}
