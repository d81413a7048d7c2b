//! npm-avail - npm package name validation and availability checking.
//!
//! This library provides tools for:
//! - Parsing package names into scope and package segments
//! - Validating names against the npm registry naming rules
//! - Resolving the registry and credentials from the environment and `.npmrc`
//! - Checking whether names are free on a registry, one at a time or in batches
//!
//! # Example
//!
//! ```no_run
//! use npm_avail::{validate, AvailabilityOptions, NpmChecker};
//!
//! #[tokio::main]
//! async fn main() {
//!     assert!(validate("my-package").valid_for_new_packages);
//!
//!     let checker = NpmChecker::new().unwrap();
//!     let availability = checker
//!         .check_availability("my-package", &AvailabilityOptions::default())
//!         .await
//!         .unwrap();
//!     println!("my-package is {}", availability);
//! }
//! ```

pub mod check;
pub mod config;
pub mod name;
pub mod notify;
pub mod registry;
pub mod types;

pub use check::{check, check_many};
pub use config::Config;
pub use name::{is_organization, is_scoped, parse, validate, NameInput, ParsedName, ValidationResult};
pub use registry::{get_auth_token, get_registry_url, AuthInfo, AuthType, NpmChecker, RegistryResolver};
pub use types::{
    Availability, AvailabilityOptions, BatchOptions, CheckResult, NpmAvailError, Result,
};
