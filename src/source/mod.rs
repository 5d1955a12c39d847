//! Feed reading.
//!
//! This module turns a feed address into a short list of [`Article`]s.  The
//! record type lives in [`article`]; fetching and RSS/Atom parsing live in
//! [`feed`].
//!
//! ## For contributors: supporting another feed format
//!
//! 1. Add a `parse_<format>` function in `feed.rs` that maps the parsed
//!    document to `Article`s via [`Article::from_fields`], honouring
//!    `max_items`.
//! 2. Try it in `parse_feed` after the existing formats.
//!
//! Callers only ever see `fetch_articles`, which never fails.

pub mod article;
mod feed;

// Re-export the public API of this module so callers can write
// `use crate::source::{fetch_articles, Article};`
pub use article::Article;
pub use feed::fetch_articles;
