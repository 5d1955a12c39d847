//! Runtime settings and the feed descriptor file.
//!
//! Settings come from the environment (optionally seeded from a `.env` file).
//! The descriptor file is a JSON object listing the feeds to digest:
//!
//! ```json
//! {
//!   "quantum_feeds": [
//!     { "name": "Quantum Weekly", "url": "https://example.com/feed.xml" }
//!   ]
//! }
//! ```
//!
//! ## For contributors
//!
//! [`load_feed_sources`] must never fail: any problem with the file is logged
//! and treated as "no feeds", which the handler turns into a 404 response.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, warn};

use crate::error::ConfigError;

/// Descriptor file looked up next to the executable when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "feed_sources.json";

/// Entries kept per feed unless `FEED_MAX_ITEMS` says otherwise.
pub const DEFAULT_MAX_ITEMS: usize = 5;

/// One configured feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedDescriptor {
    /// Display name, used in the digest header and the object key.
    pub name: String,
    /// Feed address: an http(s) URL, a `file://` URL or a local path.
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct FeedSources {
    #[serde(default)]
    quantum_feeds: Vec<FeedDescriptor>,
}

/// Everything a single invocation needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub bucket: Option<String>,
    pub max_items: usize,
    /// Write digests here instead of S3 when set.
    pub output_dir: Option<PathBuf>,
}

/// Raw environment values, before defaults and precedence are applied.
#[derive(Debug, Default)]
struct RawEnv {
    config_path: Option<OsString>,
    bucket: Option<String>,
    max_items: Option<String>,
    output_dir: Option<OsString>,
}

impl RawEnv {
    fn read() -> Self {
        Self {
            config_path: env::var_os("FEED_CONFIG_PATH"),
            bucket: env::var("S3_BUCKET_NAME").ok(),
            max_items: env::var("FEED_MAX_ITEMS").ok(),
            output_dir: env::var_os("DIGEST_OUTPUT_DIR"),
        }
    }
}

impl Settings {
    /// Read settings from the environment.
    ///
    /// `config_override` (the first CLI argument) wins over
    /// `FEED_CONFIG_PATH`, which wins over [`default_config_path`].
    pub fn from_env(config_override: Option<PathBuf>) -> Self {
        dotenvy::dotenv().ok();
        Self::resolve(config_override, RawEnv::read())
    }

    /// Empty variables count as unset.
    fn resolve(config_override: Option<PathBuf>, raw: RawEnv) -> Self {
        let config_path = config_override
            .or_else(|| non_empty_path(raw.config_path))
            .unwrap_or_else(default_config_path);

        Self {
            config_path,
            bucket: raw.bucket.filter(|b| !b.trim().is_empty()),
            max_items: parse_max_items(raw.max_items.as_deref()),
            output_dir: non_empty_path(raw.output_dir),
        }
    }
}

fn non_empty_path(raw: Option<OsString>) -> Option<PathBuf> {
    raw.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// `feed_sources.json` in the directory holding the running executable,
/// falling back to the working directory.
pub fn default_config_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn parse_max_items(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_MAX_ITEMS;
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!("Ignoring invalid FEED_MAX_ITEMS={raw:?}, using {DEFAULT_MAX_ITEMS}");
            DEFAULT_MAX_ITEMS
        }
    }
}

/// Load the feed descriptors in file order.
///
/// Returns an empty list (and logs an error) if the file is missing,
/// unreadable or malformed.
pub fn load_feed_sources(path: &Path) -> Vec<FeedDescriptor> {
    match read_feed_sources(path) {
        Ok(feeds) => feeds,
        Err(e) => {
            error!("Failed to load {}: {e}", path.display());
            Vec::new()
        }
    }
}

fn read_feed_sources(path: &Path) -> Result<Vec<FeedDescriptor>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let sources: FeedSources = serde_json::from_str(&raw)?;
    Ok(sources.quantum_feeds)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
