//! feed-digest: turn a list of RSS/Atom feeds into plain-text digests in S3.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ descriptors ┌────────────┐ articles ┌───────────┐ text ┌────────────┐
//! │ config.rs │ ──────────► │ source/    │ ───────► │ digest.rs │ ───► │ storage.rs │
//! └───────────┘             └────────────┘          └───────────┘      └────────────┘
//!       ▲                                                                     │
//!       └──────────────────────── handler.rs (one pass) ─────────────────────┘
//! ```
//!
//! * **`config`** - environment settings and the feed descriptor file.
//! * **`source/`** - fetches one feed and maps its entries to `Article`s.
//! * **`digest`** - renders articles into text and names the object.
//! * **`storage`** - the `ObjectStore` trait with S3 and local-directory
//!   backends.
//! * **`handler`** - drives one complete run and builds the response.
//! * **`main`** - wires everything together: logging, settings, store,
//!   and prints the response as JSON.
//!
//! Each run is independent and strictly sequential; a scheduler is expected
//! to start the binary.
//!
//! ## Running locally
//!
//! The descriptor file defaults to `feed_sources.json` next to the
//! executable, which under `cargo run` is `target/debug/`.  Point at the
//! repository copy instead:
//!
//! ```text
//! cargo run -- feed_sources.json
//! FEED_CONFIG_PATH=feed_sources.json DIGEST_OUTPUT_DIR=out cargo run
//! ```
//!
//! The only way the binary exits without printing a response is a failure to
//! serialize that response.

mod config;
mod digest;
mod error;
mod handler;
mod source;
mod storage;

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Settings;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feed_digest=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // -- settings ------------------------------------------------------------
    // An optional first argument overrides the descriptor file location.
    let settings = Settings::from_env(std::env::args_os().nth(1).map(PathBuf::from));

    // -- destination ---------------------------------------------------------
    let store = storage::open_store(&settings);

    // A scheduled trigger carries no payload.
    let response = handler::handle(&serde_json::Value::Null, &settings, store.as_ref());

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
