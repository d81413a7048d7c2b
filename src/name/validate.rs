//! Package name validation against the registry naming rules.
//!
//! Every rule is evaluated independently so a single call reports all
//! problems at once. Errors make a name unusable for any package; warnings
//! only block new packages (old packages published under looser rules stay
//! valid).

use super::builtins::{is_blocked, is_core_module};
use super::parse;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Longest name accepted for new packages.
pub const MAX_NAME_LENGTH: usize = 214;

/// Characters left alone when encoding a URL component.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const SPECIAL_CHARS: &[char] = &['~', '\'', '!', '(', ')', '*'];

/// A value handed to the validator before it is known to be a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameInput<'a> {
    Str(&'a str),
    Null,
    Undefined,
    /// Any other non-string value (number, object, ...).
    Other,
}

impl<'a> From<&'a str> for NameInput<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(s)
    }
}

impl<'a> From<&'a String> for NameInput<'a> {
    fn from(s: &'a String) -> Self {
        Self::Str(s)
    }
}

impl<'a> From<Option<&'a str>> for NameInput<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map_or(Self::Undefined, Self::Str)
    }
}

impl<'a> From<&'a serde_json::Value> for NameInput<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::String(s) => Self::Str(s),
            _ => Self::Other,
        }
    }
}

/// Outcome of validating one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub valid_for_new_packages: bool,
    pub valid_for_old_packages: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Only present when at least one suggestion was generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ValidationResult {
    fn new(errors: Vec<String>, warnings: Vec<String>, suggestions: Vec<String>) -> Self {
        let clean = errors.is_empty() && warnings.is_empty();
        Self {
            valid: clean,
            valid_for_new_packages: clean,
            valid_for_old_packages: errors.is_empty(),
            errors,
            warnings,
            suggestions: (!suggestions.is_empty()).then_some(suggestions),
        }
    }

    fn type_error(message: &str) -> Self {
        Self::new(vec![message.to_string()], Vec::new(), Vec::new())
    }
}

/// Validate a package name.
///
/// ```
/// use npm_avail::name::validate;
///
/// let result = validate("my-package");
/// assert!(result.valid_for_new_packages);
///
/// let result = validate("UPPERCASE");
/// assert!(!result.valid_for_new_packages);
/// assert!(result.valid_for_old_packages);
/// ```
pub fn validate<'a>(input: impl Into<NameInput<'a>>) -> ValidationResult {
    match input.into() {
        NameInput::Str(name) => validate_str(name),
        NameInput::Null => ValidationResult::type_error("name cannot be null"),
        NameInput::Undefined => ValidationResult::type_error("name cannot be undefined"),
        NameInput::Other => ValidationResult::type_error("name must be a string"),
    }
}

fn validate_str(name: &str) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if name.is_empty() {
        errors.push("name length must be greater than zero".to_string());
    }
    if name.starts_with('.') {
        errors.push("name cannot start with a period".to_string());
    }
    if name.starts_with('-') {
        errors.push("name cannot start with a hyphen".to_string());
    }
    if name.starts_with('_') {
        errors.push("name cannot start with an underscore".to_string());
    }
    if trim_js(name) != name {
        errors.push("name cannot contain leading or trailing spaces".to_string());
    }

    let lower = name.to_lowercase();
    if is_blocked(&lower) {
        errors.push(format!("{lower} is not a valid package name"));
    }

    let parsed = parse(name);
    let last_segment = name.rsplit('/').next().unwrap_or(name);

    // Scoped names may reuse core module names (`@scope/http`).
    if !parsed.is_scoped && is_core_module(last_segment) {
        warnings.push(format!("{name} is a core module name"));
    }
    if name.encode_utf16().count() > MAX_NAME_LENGTH {
        warnings.push(format!(
            "name can no longer contain more than {MAX_NAME_LENGTH} characters"
        ));
    }
    if lower != name {
        warnings.push("name can no longer contain capital letters".to_string());
    }
    if last_segment.contains(SPECIAL_CHARS) {
        warnings.push(r#"name can no longer contain special characters ("~'!()*")"#.to_string());
    }

    let mut url_unsafe = false;
    if !is_url_safe(name) {
        let scoped_shape_ok = match parsed.scope.as_deref() {
            Some(scope) => {
                if parsed.name.starts_with('.') {
                    errors.push("name cannot start with a period".to_string());
                }
                is_url_safe(scope) && is_url_safe(&parsed.name)
            }
            None => false,
        };
        if !scoped_shape_ok {
            errors.push("name can only contain URL-friendly characters".to_string());
            url_unsafe = true;
        }
    }

    let mut suggestions: Vec<String> = Vec::new();
    if lower != name {
        suggestions.push(lower);
    }
    if url_unsafe {
        let slug = slugify(name);
        if !slug.is_empty() && slug != name && !suggestions.contains(&slug) {
            suggestions.push(slug);
        }
    }

    ValidationResult::new(errors, warnings, suggestions)
}

/// Strip whitespace the way a JavaScript `trim()` does, including the BOM.
fn trim_js(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Percent-encode a string for use as a single URL component.
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// True if encoding `s` as a URL component leaves it unchanged.
pub fn is_url_safe(s: &str) -> bool {
    encode_uri_component(s) == s
}

/// Turn arbitrary text into a lowercase, hyphen-separated ASCII slug.
pub fn slugify(s: &str) -> String {
    let ascii = deunicode::deunicode(s).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
