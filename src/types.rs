//! Core types and errors for name validation and availability checks.

use crate::name::validate::ValidationResult;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout for registry requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default number of in-flight requests for batch checks.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Errors that can occur while checking package names.
#[derive(Error, Debug)]
pub enum NpmAvailError {
    #[error("Package name required")]
    NameRequired,

    /// The name failed validation for new packages.
    #[error("{message}")]
    InvalidName {
        message: String,
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(u16),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Request was aborted")]
    Aborted,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A failure for one name inside a batch.
    #[error("{name}: {source}")]
    NameCheck {
        name: String,
        #[source]
        source: Box<NpmAvailError>,
    },

    #[error("{} of the package names could not be checked", .0.len())]
    Aggregate(Vec<NpmAvailError>),
}

impl NpmAvailError {
    /// Build an invalid-name error from a failed validation.
    pub fn invalid_name(validation: &ValidationResult) -> Self {
        let message = validation
            .warnings
            .iter()
            .chain(validation.errors.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        Self::InvalidName {
            message,
            errors: validation.errors.clone(),
            warnings: validation.warnings.clone(),
        }
    }

    /// Per-name errors carried by an aggregate, or an empty slice.
    pub fn errors(&self) -> &[NpmAvailError] {
        match self {
            Self::Aggregate(errors) => errors,
            _ => &[],
        }
    }

    /// The name a per-name error belongs to.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::NameCheck { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Unwrap a per-name wrapper down to the underlying cause.
    pub fn root(&self) -> &NpmAvailError {
        match self {
            Self::NameCheck { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, NpmAvailError>;

/// Outcome of a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// Nothing is published under the name.
    Available,
    /// The name is already taken.
    Taken,
    /// The registry refused to answer (auth-gated scope or org lookup).
    Unknown,
}

impl Availability {
    /// `Some(true)` for available, `Some(false)` for taken, `None` when unknown.
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Available => Some(true),
            Self::Taken => Some(false),
            Self::Unknown => None,
        }
    }

    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Taken => write!(f, "taken"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<Availability> for Option<bool> {
    fn from(availability: Availability) -> Self {
        availability.as_option()
    }
}

impl Serialize for Availability {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// Options for a single availability check.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityOptions {
    /// Registry to query instead of the configured one.
    pub registry_url: Option<String>,
    /// Per-request timeout, [`DEFAULT_TIMEOUT`] when unset.
    pub timeout: Option<Duration>,
}

impl AvailabilityOptions {
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Effective timeout, rejecting a zero duration.
    pub fn resolved_timeout(&self) -> Result<Duration> {
        match self.timeout {
            Some(t) if t.is_zero() => Err(NpmAvailError::InvalidArgument(
                "timeout must be a positive number of milliseconds".to_string(),
            )),
            Some(t) => Ok(t),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }
}

/// Options for batch checks.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub availability: AvailabilityOptions,
    /// Maximum in-flight requests, [`DEFAULT_CONCURRENCY`] when unset.
    pub concurrency: Option<usize>,
}

impl BatchOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Effective batch size, rejecting zero.
    pub fn resolved_concurrency(&self) -> Result<usize> {
        match self.concurrency {
            Some(0) => Err(NpmAvailError::InvalidArgument(
                "concurrency must be a positive integer".to_string(),
            )),
            Some(n) => Ok(n),
            None => Ok(DEFAULT_CONCURRENCY),
        }
    }
}

impl From<AvailabilityOptions> for BatchOptions {
    fn from(availability: AvailabilityOptions) -> Self {
        Self {
            availability,
            concurrency: None,
        }
    }
}

/// Result of the full check flow for one name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    /// `null` when the name is invalid or the lookup was indeterminate or failed.
    pub available: Option<bool>,
    pub validation: ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// True when the name is valid for new packages and free on the registry.
    pub fn is_ok(&self) -> bool {
        self.validation.valid_for_new_packages && self.available == Some(true)
    }
}
