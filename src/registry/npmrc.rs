//! Registry configuration from the environment and `.npmrc` files.
//!
//! Configuration is passed in explicitly: an [`EnvSnapshot`] stands in for
//! the process environment and an [`NpmrcSource`] (normally an
//! [`NpmrcLocator`]) decides where the config file comes from. The file is re-read on every resolution, nothing is
//! cached between calls.

use crate::registry::auth::{auth_from_config, AuthInfo};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

/// Registry used when nothing else is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

const REGISTRY_ENV: &str = "npm_config_registry";
const REGISTRY_ENV_UPPER: &str = "NPM_CONFIG_REGISTRY";
const NPMRC_FILE: &str = ".npmrc";

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("env reference pattern is valid")
});

/// A read-only key/value configuration source.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<&str>;
}

/// A captured set of environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Build a snapshot from raw OS pairs, skipping any that are not UTF-8.
    pub fn from_os_vars<I: IntoIterator<Item = (OsString, OsString)>>(vars: I) -> Self {
        vars.into_iter()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    trace!("Skipping non UTF-8 environment variable {:?}", key);
                    None
                }
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for EnvSnapshot {
    fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Parsed `key=value` entries of an `.npmrc` file.
#[derive(Debug, Clone, Default)]
pub struct NpmrcConfig {
    entries: HashMap<String, String>,
}

impl NpmrcConfig {
    /// Parse file content, expanding `${VAR}` and `$VAR` references from `env`.
    ///
    /// Blank lines, `#`/`;` comments and lines without `=` are skipped.
    pub fn parse(content: &str, env: &impl ConfigSource) -> Self {
        let mut entries = HashMap::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                trace!("Skipping malformed .npmrc line: {}", trimmed);
                continue;
            };

            entries.insert(key.trim().to_string(), expand_env_vars(value.trim(), env));
        }

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl ConfigSource for NpmrcConfig {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Replace `${VAR}` and `$VAR` with values from `env`; unknown variables become empty.
pub fn expand_env_vars(value: &str, env: &impl ConfigSource) -> String {
    ENV_REFERENCE
        .replace_all(value, |caps: &Captures| {
            let var = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            env.get(var).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Somewhere an `.npmrc` configuration can be loaded from.
pub trait NpmrcSource {
    /// Load the configuration, expanding variables from `env`.
    fn load_config(&self, env: &EnvSnapshot) -> NpmrcConfig;
}

/// Finds the `.npmrc` file to use.
///
/// The project file is searched from `start_dir` up to the filesystem root;
/// the one in `home_dir` is the fallback.
#[derive(Debug, Clone, Default)]
pub struct NpmrcLocator {
    start_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl NpmrcLocator {
    pub fn new(start_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            start_dir,
            home_dir,
        }
    }

    /// Search from the working directory, fall back to the user's home.
    pub fn from_environment() -> Self {
        Self::new(std::env::current_dir().ok(), dirs::home_dir())
    }

    /// Path of the config file that applies, if any exists.
    pub fn discover(&self) -> Option<PathBuf> {
        if let Some(ref start) = self.start_dir {
            for dir in start.ancestors() {
                let candidate = dir.join(NPMRC_FILE);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        self.home_dir
            .as_deref()
            .map(|home| home.join(NPMRC_FILE))
            .filter(|candidate| candidate.is_file())
    }

    /// Read and parse the applicable config file. Missing or unreadable files
    /// yield an empty config.
    pub fn load(&self, env: &impl ConfigSource) -> NpmrcConfig {
        match self.discover() {
            Some(path) => read_config(&path, env),
            None => {
                trace!("No .npmrc found");
                NpmrcConfig::default()
            }
        }
    }
}

impl NpmrcSource for NpmrcLocator {
    fn load_config(&self, env: &EnvSnapshot) -> NpmrcConfig {
        self.load(env)
    }
}

fn read_config(path: &Path, env: &impl ConfigSource) -> NpmrcConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config = NpmrcConfig::parse(&content, env);
            debug!("Loaded {} entries from {}", config.len(), path.display());
            config
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            NpmrcConfig::default()
        }
    }
}

/// Resolves registry URLs and credentials.
#[derive(Debug, Clone, Default)]
pub struct RegistryResolver<S = NpmrcLocator> {
    env: EnvSnapshot,
    npmrc: S,
}

impl RegistryResolver {
    /// Resolver over the real process environment and filesystem.
    pub fn from_environment() -> Self {
        Self::new(EnvSnapshot::capture(), NpmrcLocator::from_environment())
    }
}

impl<S: NpmrcSource> RegistryResolver<S> {
    pub fn new(env: EnvSnapshot, npmrc: S) -> Self {
        Self { env, npmrc }
    }

    /// Registry URL for an optional scope, always ending with `/`.
    ///
    /// Order: `npm_config_registry`, `NPM_CONFIG_REGISTRY`, the `.npmrc`
    /// `<scope>:registry` entry, the `.npmrc` `registry` entry, then
    /// [`DEFAULT_REGISTRY`]. The config file is not read when the
    /// environment decides.
    pub fn registry_url(&self, scope: Option<&str>) -> String {
        if let Some(url) = self.env_registry() {
            debug!("Registry from environment: {}", url);
            return normalize_registry_url(url);
        }

        let config = self.load_config();

        let scoped = scope.and_then(|scope| {
            let key = if scope.starts_with('@') {
                format!("{scope}:registry")
            } else {
                format!("@{scope}:registry")
            };
            non_empty(config.get(&key))
        });

        match scoped.or_else(|| non_empty(config.get("registry"))) {
            Some(url) => {
                debug!("Registry from .npmrc: {}", url);
                normalize_registry_url(url)
            }
            None => DEFAULT_REGISTRY.to_string(),
        }
    }

    /// Credentials configured for `registry_url`, if any.
    pub fn auth_token(&self, registry_url: &str) -> Option<AuthInfo> {
        auth_from_config(&self.load_config(), registry_url)
    }

    /// Fresh read of the applicable `.npmrc`.
    pub fn load_config(&self) -> NpmrcConfig {
        self.npmrc.load_config(&self.env)
    }

    fn env_registry(&self) -> Option<&str> {
        non_empty(self.env.get(REGISTRY_ENV)).or_else(|| non_empty(self.env.get(REGISTRY_ENV_UPPER)))
    }
}

/// Registry URL for an optional scope using the process environment.
///
/// ```no_run
/// let url = npm_avail::registry::get_registry_url(None);
/// assert!(url.ends_with('/'));
/// ```
pub fn get_registry_url(scope: Option<&str>) -> String {
    RegistryResolver::from_environment().registry_url(scope)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Append the trailing slash registry URLs are expected to carry.
pub fn normalize_registry_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    /// In-memory config that counts how often it is loaded.
    #[derive(Default)]
    struct CountingNpmrc {
        content: &'static str,
        loads: Cell<usize>,
    }

    impl NpmrcSource for CountingNpmrc {
        fn load_config(&self, env: &EnvSnapshot) -> NpmrcConfig {
            self.loads.set(self.loads.get() + 1);
            NpmrcConfig::parse(self.content, env)
        }
    }

    fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
        pairs.iter().copied().collect()
    }

    fn resolver_in(dir: &TempDir, vars: &[(&str, &str)]) -> RegistryResolver {
        RegistryResolver::new(
            env(vars),
            NpmrcLocator::new(Some(dir.path().to_path_buf()), None),
        )
    }

    #[test]
    fn test_default_registry() {
        let resolver = RegistryResolver::new(EnvSnapshot::default(), NpmrcLocator::default());
        assert_eq!(resolver.registry_url(None), "https://registry.npmjs.org/");
    }

    #[test]
    fn test_env_precedence() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".npmrc"), "registry=https://file.example/\n").unwrap();

        let resolver = resolver_in(
            &dir,
            &[
                ("npm_config_registry", "https://lower.example"),
                ("NPM_CONFIG_REGISTRY", "https://upper.example"),
            ],
        );
        assert_eq!(resolver.registry_url(None), "https://lower.example/");
        assert_eq!(resolver.registry_url(Some("@acme")), "https://lower.example/");

        let resolver = resolver_in(&dir, &[("NPM_CONFIG_REGISTRY", "https://upper.example/")]);
        assert_eq!(resolver.registry_url(None), "https://upper.example/");

        let resolver = resolver_in(&dir, &[("npm_config_registry", "")]);
        assert_eq!(resolver.registry_url(None), "https://file.example/");
    }

    #[test]
    fn test_env_registry_skips_config_load() {
        let npmrc = CountingNpmrc {
            content: "registry=https://file.example/\n@acme:registry=https://acme.example/\n",
            ..Default::default()
        };
        let resolver = RegistryResolver::new(env(&[("npm_config_registry", "https://env.example")]), npmrc);

        assert_eq!(resolver.registry_url(None), "https://env.example/");
        assert_eq!(resolver.registry_url(Some("@acme")), "https://env.example/");
        assert_eq!(resolver.npmrc.loads.get(), 0);

        let resolver = RegistryResolver::new(
            EnvSnapshot::default(),
            CountingNpmrc {
                content: "registry=https://file.example/",
                ..Default::default()
            },
        );
        assert_eq!(resolver.registry_url(None), "https://file.example/");
        assert_eq!(resolver.registry_url(None), "https://file.example/");
        assert_eq!(resolver.npmrc.loads.get(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_skips_non_utf8_vars() {
        use std::os::unix::ffi::OsStringExt;

        let snapshot = EnvSnapshot::from_os_vars(vec![
            (OsString::from("GOOD"), OsString::from("value")),
            (OsString::from("BAD"), OsString::from_vec(b"f\xffo".to_vec())),
            (OsString::from_vec(b"K\xffY".to_vec()), OsString::from("x")),
        ]);
        assert_eq!(snapshot.get("GOOD"), Some("value"));
        assert_eq!(snapshot.get("BAD"), None);
        assert_eq!(snapshot.vars.len(), 1);
    }

    #[test]
    fn test_scoped_and_global_registry_from_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".npmrc"),
            "# comment\n; another\n\nregistry = https://global.example\n@acme:registry=https://acme.example/npm\n",
        )
        .unwrap();

        let resolver = resolver_in(&dir, &[]);
        assert_eq!(resolver.registry_url(None), "https://global.example/");
        assert_eq!(resolver.registry_url(Some("@acme")), "https://acme.example/npm/");
        assert_eq!(resolver.registry_url(Some("acme")), "https://acme.example/npm/");
        assert_eq!(resolver.registry_url(Some("@other")), "https://global.example/");
    }

    #[test]
    fn test_file_is_reread_on_every_call() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".npmrc");
        let resolver = resolver_in(&dir, &[]);

        assert_eq!(resolver.registry_url(None), DEFAULT_REGISTRY);
        fs::write(&path, "registry=https://later.example/").unwrap();
        assert_eq!(resolver.registry_url(None), "https://later.example/");
    }

    #[test]
    fn test_discovery_walks_up_then_falls_back_to_home() {
        let project = TempDir::new().unwrap();
        let nested = project.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(".npmrc"), "registry=https://home.example/").unwrap();

        let locator = NpmrcLocator::new(Some(nested.clone()), Some(home.path().to_path_buf()));
        assert_eq!(locator.discover(), Some(home.path().join(".npmrc")));

        fs::write(project.path().join(".npmrc"), "registry=https://project.example/").unwrap();
        assert_eq!(locator.discover(), Some(project.path().join(".npmrc")));

        let resolver = RegistryResolver::new(EnvSnapshot::default(), locator);
        assert_eq!(resolver.registry_url(None), "https://project.example/");
    }

    #[test]
    fn test_parse_skips_malformed_and_splits_on_first_equals() {
        let config = NpmrcConfig::parse(
            "no-equals-here\nkey = a=b \n  # indented comment\n",
            &EnvSnapshot::default(),
        );
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("key"), Some("a=b"));
    }

    #[test]
    fn test_env_expansion() {
        let vars = env(&[("TOKEN", "s3cret"), ("HOST", "npm.example")]);
        assert_eq!(expand_env_vars("${TOKEN}", &vars), "s3cret");
        assert_eq!(expand_env_vars("$TOKEN", &vars), "s3cret");
        assert_eq!(expand_env_vars("https://$HOST/${MISSING}x", &vars), "https://npm.example/x");
        assert_eq!(expand_env_vars("plain", &vars), "plain");

        let config = NpmrcConfig::parse("//npm.example/:_authToken=${TOKEN}", &vars);
        assert_eq!(config.get("//npm.example/:_authToken"), Some("s3cret"));
    }

    #[test]
    fn test_normalize_registry_url() {
        assert_eq!(normalize_registry_url("https://a.example"), "https://a.example/");
        assert_eq!(normalize_registry_url("https://a.example/"), "https://a.example/");
    }
}
