//! Plain-text digest rendering.
//!
//! Pure functions only: given the same feed name and articles, the output is
//! always byte-for-byte identical.

use crate::source::Article;

/// Width of the dashed line closing each article stanza.
const SEPARATOR_WIDTH: usize = 40;

/// Render one feed's digest: a header line, a blank line, then one stanza per
/// article in the order given.
pub fn format_digest(feed_name: &str, articles: &[Article]) -> String {
    let mut out = format!("===== {feed_name} =====\n\n");
    for article in articles {
        out.push_str(&format!("Title: {}\n", article.title));
        out.push_str(&format!("Date: {}\n", article.published));
        out.push_str(&format!("Link: {}\n", article.link));
        out.push_str(&format!("Summary: {}\n", article.summary));
        out.push_str(&"-".repeat(SEPARATOR_WIDTH));
        out.push('\n');
    }
    out
}

/// Object key for a feed's digest: lowercased, spaces to underscores, `.txt`.
pub fn object_key(feed_name: &str) -> String {
    format!("{}.txt", feed_name.to_lowercase().replace(' ', "_"))
}
