//! The normalised record every feed entry is mapped to.
//!
//! `Article` is deliberately flat: four strings, all always present.  Feed
//! parsers hand over whatever optional fields they found via
//! [`Article::from_fields`], which fills the gaps with placeholders.

/// Placeholder for an entry without a title.
pub const NO_TITLE: &str = "No Title";
/// Placeholder for an entry without a link.
pub const NO_LINK: &str = "No Link";
/// Placeholder for an entry without a publication date.
pub const NO_DATE: &str = "No Date";
/// Placeholder for an entry without a summary.
pub const NO_SUMMARY: &str = "No Summary";

/// A single feed entry, reduced to what the digest prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Publication date as the feed wrote it; not parsed or reformatted
    /// for RSS, RFC 3339 for Atom.
    pub published: String,
    pub summary: String,
}

impl Article {
    /// Build an article from optional fields, substituting placeholders for
    /// anything absent or blank.
    pub fn from_fields(
        title: Option<&str>,
        link: Option<&str>,
        published: Option<&str>,
        summary: Option<&str>,
    ) -> Self {
        Self {
            title: or_placeholder(title, NO_TITLE),
            link: or_placeholder(link, NO_LINK),
            published: or_placeholder(published, NO_DATE),
            summary: or_placeholder(summary, NO_SUMMARY),
        }
    }
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
