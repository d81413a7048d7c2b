//! npm registry access.
//!
//! Resolves which registry to talk to (environment and `.npmrc`), which
//! credentials to send, and queries the registry for name availability.

pub mod auth;
pub mod npm;
pub mod npmrc;

pub use auth::{get_auth_token, AuthInfo, AuthType};
pub use npm::NpmChecker;
pub use npmrc::{
    get_registry_url, ConfigSource, EnvSnapshot, NpmrcConfig, NpmrcLocator, NpmrcSource, RegistryResolver,
    DEFAULT_REGISTRY,
};
