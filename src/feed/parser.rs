use anyhow::Result;
use feed_rs::parser;

use crate::article::Article;
use crate::util::{strip_control_chars, validate_url};

/// Articles parsed from one feed document.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub articles: Vec<Article>,
    /// Entries dropped because their link was missing or not a public http(s) URL.
    pub skipped: usize,
}

/// Parse RSS or Atom bytes into unread articles, in document order.
///
/// The publication date is rendered as RFC 2822 text so it sorts through the
/// same path as dates typed by hand. Entries with no date keep an empty date.
pub fn parse_feed(bytes: &[u8]) -> Result<ParseResult> {
    let feed = parser::parse(bytes)?;
    let mut result = ParseResult::default();

    for entry in feed.entries {
        let Some(url) = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .filter(|href| validate_url(href).is_ok())
        else {
            result.skipped += 1;
            continue;
        };

        let title = entry
            .title
            .map(|t| strip_control_chars(t.content.trim()).into_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());
        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|d| strip_control_chars(d.trim()).into_owned())
            .unwrap_or_default();
        let date = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc2822())
            .unwrap_or_default();

        result.articles.push(Article {
            title,
            description,
            date,
            url,
            read: false,
        });
    }

    Ok(result)
}
