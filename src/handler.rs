//! The invocation entry point.
//!
//! One call to [`handle`] is one complete run: load the descriptors, then for
//! each feed fetch, format and store its digest.  Every per-feed failure has
//! already been logged and absorbed by the stage that hit it, so the only
//! outcomes are "nothing configured" (404) and "done" (200).

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{self, Settings};
use crate::digest;
use crate::source;
use crate::storage::{self, ObjectStore};

/// HTTP-style result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    /// JSON-encoded `{"message": ..}` or `{"error": ..}`.
    pub body: String,
}

impl Response {
    fn ok(message: &str) -> Self {
        Self {
            status_code: 200,
            body: json!({ "message": message }).to_string(),
        }
    }

    fn not_found(error: &str) -> Self {
        Self {
            status_code: 404,
            body: json!({ "error": error }).to_string(),
        }
    }
}

/// Run the whole pipeline once.  `_event` is the trigger payload, which
/// carries nothing this job uses.
pub fn handle(
    _event: &serde_json::Value,
    settings: &Settings,
    store: &dyn ObjectStore,
) -> Response {
    let feeds = config::load_feed_sources(&settings.config_path);
    if feeds.is_empty() {
        warn!("No feeds found in {}", settings.config_path.display());
        return Response::not_found("No feed sources configured.");
    }

    for feed in &feeds {
        info!("Fetching feed: {}", feed.name);

        let articles = source::fetch_articles(&feed.url, settings.max_items);
        if articles.is_empty() {
            debug!("No articles for {}, skipping", feed.name);
            continue;
        }

        let content = digest::format_digest(&feed.name, &articles);
        storage::save_digest(store, &digest::object_key(&feed.name), &content);
    }

    Response::ok("Feeds processed and digests stored.")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
