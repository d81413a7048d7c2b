//! Full name check: validation followed by an availability lookup.
//!
//! Unlike [`NpmChecker::check_availability_many`], failures here never fail
//! the call. An invalid name or a failed lookup degrades that one entry to
//! `available: None` with the validation (and error message) attached.

use crate::name::{availability_name, validate};
use crate::registry::npm::join_error;
use crate::registry::NpmChecker;
use crate::types::{AvailabilityOptions, BatchOptions, CheckResult, Result};
use futures::future::join_all;
use tracing::debug;

/// Validate `name` and, when it is usable for a new package, query the registry.
pub async fn check(checker: &NpmChecker, name: &str, options: &AvailabilityOptions) -> CheckResult {
    let validation = validate(availability_name(name).as_str());
    if !validation.valid_for_new_packages {
        debug!("Skipping registry lookup for invalid name {:?}", name);
        return CheckResult {
            name: name.to_string(),
            available: None,
            validation,
            error: None,
        };
    }

    let (available, error) = match checker.check_availability(name, options).await {
        Ok(availability) => (availability.as_option(), None),
        Err(e) => {
            debug!("Check failed for {}: {}", name, e);
            (None, Some(e.to_string()))
        }
    };

    CheckResult {
        name: name.to_string(),
        available,
        validation,
        error,
    }
}

/// Run [`check`] for every name, in batches of `concurrency`, keeping input order.
///
/// # Errors
///
/// Only invalid options fail the call.
pub async fn check_many<S: AsRef<str>>(
    checker: &NpmChecker,
    names: &[S],
    options: &BatchOptions,
) -> Result<Vec<CheckResult>> {
    let concurrency = options.resolved_concurrency()?;
    options.availability.resolved_timeout()?;

    let mut results = Vec::with_capacity(names.len());

    for batch in names.chunks(concurrency) {
        let tasks: Vec<_> = batch
            .iter()
            .map(|name| {
                let checker = checker.clone();
                let name = name.as_ref().to_string();
                let opts = options.availability.clone();
                tokio::spawn(async move { check(&checker, &name, &opts).await })
            })
            .collect();

        for (name, joined) in batch.iter().zip(join_all(tasks).await) {
            let result = match joined {
                Ok(result) => result,
                Err(e) => CheckResult {
                    name: name.as_ref().to_string(),
                    available: None,
                    validation: validate(availability_name(name.as_ref()).as_str()),
                    error: Some(join_error(e).to_string()),
                },
            };
            results.push(result);
        }
    }

    Ok(results)
}
