//! Fetching and parsing a single feed.
//!
//! An address is either an `http(s)://` URL, fetched with a blocking
//! [`reqwest`] client, or a `file://` URL / bare path read from disk.
//! Schemes are matched case-insensitively and `file://` URLs are
//! percent-decoded.  The body is parsed as RSS 2.0 first and as Atom if
//! that fails.
//!
//! Only the first `max_items` entries are mapped, in document order.

use std::time::Duration;

use tracing::{debug, warn};

use super::Article;
use crate::error::FeedError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("feed-digest/", env!("CARGO_PKG_VERSION"));

/// Fetch up to `max_items` articles from `address`.
///
/// Any failure is logged as a warning and yields an empty list, so one bad
/// feed never stops the others.
pub fn fetch_articles(address: &str, max_items: usize) -> Vec<Article> {
    match try_fetch_articles(address, max_items) {
        Ok(articles) => articles,
        Err(e) => {
            warn!("Error fetching or parsing feed {address}: {e}");
            Vec::new()
        }
    }
}

fn try_fetch_articles(address: &str, max_items: usize) -> Result<Vec<Article>, FeedError> {
    let body = read_address(address)?;
    parse_feed(&body, max_items)
}

fn read_address(address: &str) -> Result<Vec<u8>, FeedError> {
    // Anything that is not a URL with a known scheme is a plain path.  This
    // also covers Windows drive letters, which parse as one-letter schemes.
    let url = match reqwest::Url::parse(address) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => url,
        _ => return Ok(std::fs::read(address)?),
    };

    if url.scheme() == "file" {
        let path = url
            .to_file_path()
            .map_err(|()| FeedError::InvalidAddress(address.to_string()))?;
        return Ok(std::fs::read(path)?);
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }
    Ok(response.bytes()?.to_vec())
}

/// Parse a feed document, trying RSS then Atom.
pub fn parse_feed(body: &[u8], max_items: usize) -> Result<Vec<Article>, FeedError> {
    let rss_err = match rss::Channel::read_from(body) {
        Ok(channel) => {
            debug!("Parsed as RSS, {} items", channel.items().len());
            return Ok(parse_channel(&channel, max_items));
        }
        Err(e) => e,
    };

    match atom_syndication::Feed::read_from(body) {
        Ok(feed) => {
            debug!("Parsed as Atom, {} entries", feed.entries().len());
            Ok(parse_atom(&feed, max_items))
        }
        Err(atom_err) => Err(FeedError::Parse {
            rss: rss_err.to_string(),
            atom: atom_err.to_string(),
        }),
    }
}

/// Map the first `max_items` RSS items.  `<pubDate>` is kept verbatim.
pub fn parse_channel(channel: &rss::Channel, max_items: usize) -> Vec<Article> {
    channel
        .items()
        .iter()
        .take(max_items)
        .map(|item| {
            Article::from_fields(
                item.title(),
                item.link(),
                item.pub_date(),
                item.description(),
            )
        })
        .collect()
}

/// Map the first `max_items` Atom entries.
pub fn parse_atom(feed: &atom_syndication::Feed, max_items: usize) -> Vec<Article> {
    feed.entries()
        .iter()
        .take(max_items)
        .map(|entry| {
            // Prefer the alternate link; otherwise whatever comes first.
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|l| l.href());

            let published = entry.published().map(|dt| dt.to_rfc3339());

            let summary = entry
                .summary()
                .map(|s| s.as_str())
                .or_else(|| entry.content().and_then(|c| c.value()));

            Article::from_fields(
                Some(entry.title().as_str()),
                link,
                published.as_deref(),
                summary,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::article::{NO_DATE, NO_LINK, NO_SUMMARY, NO_TITLE};
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serve `status` with `body` at `/feed.xml` and return the feed URL.
    async fn serve_feed(server: &MockServer, status: u16, body: String) -> String {
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
        format!("{}/feed.xml", server.uri())
    }

    fn rss_with_items(n: usize) -> String {
        let items: String = (1..=n)
            .map(|i| {
                format!(
                    "<item><title>Post {i}</title><link>https://example.com/{i}</link></item>"
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>T</title><link>https://example.com</link><description>d</description>{items}</channel></rss>"#
        )
    }

    #[test]
    fn rss_fields_are_mapped() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item>
      <title>First Post</title>
      <link>https://example.com/1</link>
      <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
      <description>First description</description>
    </item>
  </channel>
</rss>"#;

        let articles = parse_feed(xml.as_bytes(), 5).unwrap();

        assert_eq!(
            articles,
            vec![Article {
                title: "First Post".into(),
                link: "https://example.com/1".into(),
                published: "Mon, 01 Jan 2024 00:00:00 +0000".into(),
                summary: "First description".into(),
            }]
        );
    }

    #[test]
    fn truncates_to_max_items_in_source_order() {
        let xml = rss_with_items(8);
        let articles = parse_feed(xml.as_bytes(), 5).unwrap();

        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Post 1", "Post 2", "Post 3", "Post 4", "Post 5"]);
    }

    #[test]
    fn fewer_items_than_max_are_all_kept() {
        let xml = rss_with_items(2);
        assert_eq!(parse_feed(xml.as_bytes(), 5).unwrap().len(), 2);
    }

    #[test]
    fn missing_rss_fields_get_placeholders() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <guid>g1</guid>
    </item>
  </channel>
</rss>"#;

        let articles = parse_feed(xml.as_bytes(), 5).unwrap();

        assert_eq!(articles[0].title, NO_TITLE);
        assert_eq!(articles[0].link, NO_LINK);
        assert_eq!(articles[0].published, NO_DATE);
        assert_eq!(articles[0].summary, NO_SUMMARY);
    }

    #[test]
    fn unparseable_date_is_kept_verbatim() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <title>Bad Date</title>
      <pubDate>sometime last week</pubDate>
    </item>
  </channel>
</rss>"#;

        let articles = parse_feed(xml.as_bytes(), 5).unwrap();
        assert_eq!(articles[0].published, "sometime last week");
    }

    #[test]
    fn atom_entries_are_mapped() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test</title>
  <id>urn:feed</id>
  <updated>2024-01-02T00:00:00Z</updated>
  <entry>
    <title>Entangled</title>
    <id>urn:1</id>
    <updated>2024-01-02T00:00:00Z</updated>
    <published>2024-01-01T12:00:00+00:00</published>
    <link rel="related" href="https://example.com/related"/>
    <link rel="alternate" href="https://example.com/entangled"/>
    <summary>Spooky action</summary>
  </entry>
  <entry>
    <title>Content only</title>
    <id>urn:2</id>
    <updated>2024-01-02T00:00:00Z</updated>
    <content type="text">Body text</content>
  </entry>
</feed>"#;

        let articles = parse_feed(xml.as_bytes(), 5).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Entangled");
        assert_eq!(articles[0].link, "https://example.com/entangled");
        assert_eq!(articles[0].published, "2024-01-01T12:00:00+00:00");
        assert_eq!(articles[0].summary, "Spooky action");

        assert_eq!(articles[1].link, NO_LINK);
        assert_eq!(articles[1].published, NO_DATE);
        assert_eq!(articles[1].summary, "Body text");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_feed(b"this is not xml", 5).unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }));
    }

    #[test]
    fn reads_feed_from_local_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(rss_with_items(3).as_bytes()).unwrap();
        let path = file.path().to_str().unwrap();

        assert_eq!(fetch_articles(path, 5).len(), 3);
        assert_eq!(fetch_articles(&format!("file://{path}"), 2).len(), 2);
    }

    #[test]
    fn unreachable_feed_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xml");
        assert!(fetch_articles(missing.to_str().unwrap(), 5).is_empty());
    }

    #[test]
    fn malformed_feed_yields_empty_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<html><body>not a feed</body></html>").unwrap();
        assert!(fetch_articles(file.path().to_str().unwrap(), 5).is_empty());
    }

    #[test]
    fn file_url_is_percent_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quantum feed.xml");
        std::fs::write(&path, rss_with_items(2)).unwrap();

        let url = reqwest::Url::from_file_path(&path).unwrap();
        assert!(url.as_str().contains("quantum%20feed.xml"));
        assert_eq!(fetch_articles(url.as_str(), 5).len(), 2);

        let localhost = format!("file://localhost{}", url.path());
        assert_eq!(fetch_articles(&localhost, 5).len(), 2);
    }

    // The blocking client must not run on the async test runtime, so each
    // fetch goes through `spawn_blocking`.

    #[tokio::test]
    async fn http_feed_is_fetched_and_truncated() {
        let server = MockServer::start().await;
        let url = serve_feed(&server, 200, rss_with_items(8)).await;

        let articles = tokio::task::spawn_blocking(move || fetch_articles(&url, 5))
            .await
            .unwrap();

        assert_eq!(articles.len(), 5);
        assert_eq!(articles[0].title, "Post 1");
        assert_eq!(articles[4].link, "https://example.com/5");
    }

    #[tokio::test]
    async fn http_scheme_is_case_insensitive() {
        let server = MockServer::start().await;
        let url = serve_feed(&server, 200, rss_with_items(1)).await;
        let shouting = url.replacen("http://", "HTTP://", 1);

        let articles = tokio::task::spawn_blocking(move || fetch_articles(&shouting, 5))
            .await
            .unwrap();

        assert_eq!(articles.len(), 1);
    }

    #[tokio::test]
    async fn http_error_status_is_a_failure() {
        let server = MockServer::start().await;
        let url = serve_feed(&server, 500, rss_with_items(3)).await;

        let (result, articles) = tokio::task::spawn_blocking(move || {
            (try_fetch_articles(&url, 5), fetch_articles(&url, 5))
        })
        .await
        .unwrap();

        assert!(matches!(result, Err(FeedError::Status(500))));
        assert!(articles.is_empty());
    }
}
