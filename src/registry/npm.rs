//! npm registry checker for name availability.

use crate::name::{availability_name, is_organization, is_scoped, parse, validate};
use crate::registry::npmrc::{normalize_registry_url, RegistryResolver};
use crate::types::{Availability, AvailabilityOptions, BatchOptions, NpmAvailError, Result};
use futures::future::join_all;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Web origin that answers for organization handles.
pub const ORG_URL: &str = "https://www.npmjs.com/org/";

/// Checker for name availability against an npm registry.
#[derive(Debug, Clone)]
pub struct NpmChecker {
    client: Client,
    resolver: Arc<RegistryResolver>,
    org_url: String,
}

impl NpmChecker {
    /// Create a checker that resolves registries from the process environment.
    pub fn new() -> Result<Self> {
        Self::with_resolver(RegistryResolver::from_environment())
    }

    /// Create a checker with explicit registry configuration.
    pub fn with_resolver(resolver: RegistryResolver) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .http1_only()
            .build()?;

        Ok(Self {
            client,
            resolver: Arc::new(resolver),
            org_url: ORG_URL.to_string(),
        })
    }

    /// Look up organization handles somewhere other than [`ORG_URL`].
    pub fn with_org_url(mut self, url: impl Into<String>) -> Self {
        self.org_url = normalize_registry_url(&url.into());
        self
    }

    pub fn resolver(&self) -> &RegistryResolver {
        &self.resolver
    }

    /// Check whether `name` is free on the registry.
    ///
    /// Organization handles (`@acme`) are checked against the npm website.
    /// Returns [`Availability::Unknown`] when a scoped or organization lookup
    /// is refused with 401/403.
    ///
    /// # Errors
    ///
    /// [`NpmAvailError::NameRequired`] for an empty name,
    /// [`NpmAvailError::InvalidName`] when the name is not valid for new
    /// packages, [`NpmAvailError::UnexpectedStatus`] for any other failure
    /// status, and [`NpmAvailError::Timeout`] / [`NpmAvailError::Http`] for
    /// transport failures.
    pub async fn check_availability(
        &self,
        name: &str,
        options: &AvailabilityOptions,
    ) -> Result<Availability> {
        if name.is_empty() {
            return Err(NpmAvailError::NameRequired);
        }

        let is_org = is_organization(name);
        let check_name = availability_name(name);

        let validation = validate(check_name.as_str());
        if !validation.valid_for_new_packages {
            return Err(NpmAvailError::invalid_name(&validation));
        }

        let timeout = options.resolved_timeout()?;
        let scoped = is_scoped(&check_name);

        let registry_url = match options.registry_url {
            Some(ref url) => normalize_registry_url(url),
            None => {
                let scope = parse(&check_name).scope.map(|s| format!("@{s}"));
                self.resolver.registry_url(scope.as_deref())
            }
        };

        let url = if is_org {
            format!("{}{}", self.org_url, check_name.to_lowercase())
        } else {
            format!("{}{}", registry_url, encode_package_path(&check_name))
        };
        trace!("Checking npm: {}", url);

        let mut request = self.client.head(&url).timeout(timeout);
        if !is_org {
            if let Some(auth) = self.resolver.auth_token(&registry_url) {
                request = request.header(AUTHORIZATION, auth.header_value());
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NpmAvailError::Timeout(timeout)
            } else {
                NpmAvailError::Http(e)
            }
        })?;

        let status = response.status();
        debug!("{} -> {}", check_name, status);

        if status.is_success() {
            Ok(Availability::Taken)
        } else if status == StatusCode::NOT_FOUND {
            Ok(Availability::Available)
        } else if (scoped || is_org)
            && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        {
            Ok(Availability::Unknown)
        } else {
            Err(NpmAvailError::UnexpectedStatus(status.as_u16()))
        }
    }

    /// Check many names, at most `concurrency` requests in flight.
    ///
    /// Names are checked in consecutive batches in input order; a batch must
    /// settle completely before the next starts.
    ///
    /// # Errors
    ///
    /// If any name fails, every failure is returned together as
    /// [`NpmAvailError::Aggregate`] of [`NpmAvailError::NameCheck`] and the
    /// successful results are dropped.
    pub async fn check_availability_many<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &BatchOptions,
    ) -> Result<HashMap<String, Availability>> {
        let concurrency = options.resolved_concurrency()?;
        let mut results = HashMap::with_capacity(names.len());
        let mut errors = Vec::new();

        for batch in names.chunks(concurrency) {
            let tasks: Vec<_> = batch
                .iter()
                .map(|name| {
                    let checker = self.clone();
                    let name = name.as_ref().to_string();
                    let opts = options.availability.clone();
                    tokio::spawn(async move { checker.check_availability(&name, &opts).await })
                })
                .collect();

            for (name, joined) in batch.iter().zip(join_all(tasks).await) {
                let name = name.as_ref();
                match joined.map_err(join_error).and_then(|outcome| outcome) {
                    Ok(availability) => {
                        results.insert(name.to_string(), availability);
                    }
                    Err(e) => {
                        debug!("Check failed for {}: {}", name, e);
                        errors.push(NpmAvailError::NameCheck {
                            name: name.to_string(),
                            source: Box::new(e),
                        });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(results)
        } else {
            Err(NpmAvailError::Aggregate(errors))
        }
    }
}

/// Map a failed lookup task to an error, re-raising panics.
pub(crate) fn join_error(e: tokio::task::JoinError) -> NpmAvailError {
    if e.is_panic() {
        std::panic::resume_unwind(e.into_panic());
    }
    NpmAvailError::Aborted
}

/// Registry path for a package: the scope slash is percent-encoded and the
/// whole name lowercased.
pub fn encode_package_path(name: &str) -> String {
    let path = if is_scoped(name) {
        name.replace('/', "%2f")
    } else {
        name.to_string()
    };
    path.to_lowercase()
}
