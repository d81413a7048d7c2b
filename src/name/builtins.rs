//! Reserved name sets consulted by the validator.

/// Node.js built-in module names. Publishing under one of these is discouraged.
const CORE_MODULES: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Names the registry refuses outright.
const BLOCKED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Check if a name is a Node.js core module, ignoring case.
pub fn is_core_module(name: &str) -> bool {
    let lower = name.to_lowercase();
    CORE_MODULES.contains(&lower.as_str())
}

/// Check if the lowercased name is one the registry blocks.
pub fn is_blocked(lowercased: &str) -> bool {
    BLOCKED_NAMES.contains(&lowercased)
}
