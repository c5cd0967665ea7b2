//! Article record and its natural ordering.
//!
//! Articles arrive from the fetch service as plain records. The publication
//! date is kept as the text the feed published; ordering parses it lazily.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

/// One feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    /// Publication date as published by the feed.
    pub date: String,
    pub url: String,
    #[serde(default)]
    pub read: bool,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date: date.into(),
            url: url.into(),
            read: false,
        }
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }

    pub fn toggle_read(&mut self) {
        self.read = !self.read;
    }

    /// Publication time parsed from `date`, if it is in a recognised format.
    ///
    /// Accepts RFC 2822 (RSS), RFC 3339 (Atom) and bare `YYYY-MM-DD`.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }
}

pub(crate) fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Natural ordering of the article list: newest first.
///
/// Articles without a parseable date go after every dated article. Ties
/// (including two undated articles) fall back to title order.
pub fn natural_order(a: &Article, b: &Article) -> Ordering {
    match (a.published(), b.published()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.title.cmp(&b.title))
}

/// Stable sort by [`natural_order`].
pub fn sort_articles(articles: &mut [Article]) {
    // Same order as natural_order, but each date is parsed once.
    articles.sort_by_cached_key(|a| {
        let published = a.published();
        (published.is_none(), Reverse(published), a.title.clone())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dated(title: &str, date: &str) -> Article {
        Article::new(title, "", date, format!("https://example.com/{}", title))
    }

    #[test]
    fn parses_rss_atom_and_plain_dates() {
        assert!(parse_date("Tue, 02 Jan 2024 10:00:00 +0000").is_some());
        assert!(parse_date("2024-01-02T10:00:00Z").is_some());
        assert!(parse_date("2024-01-02").is_some());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("   ").is_none());
    }

    #[test]
    fn newest_first() {
        let mut list = vec![dated("A", "2024-01-01"), dated("B", "2024-01-02")];
        sort_articles(&mut list);
        let titles: Vec<_> = list.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
    }

    #[test]
    fn mixed_formats_compare_by_instant() {
        let mut list = vec![
            dated("rfc3339", "2024-01-01T12:00:00Z"),
            dated("rfc2822", "Mon, 01 Jan 2024 13:00:00 +0000"),
        ];
        sort_articles(&mut list);
        assert_eq!(list[0].title, "rfc2822");
    }

    #[test]
    fn undated_articles_sink_to_bottom_in_title_order() {
        let mut list = vec![
            dated("zeta", "not a date"),
            dated("alpha", ""),
            dated("dated", "2020-05-05"),
        ];
        sort_articles(&mut list);
        let titles: Vec<_> = list.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["dated", "alpha", "zeta"]);
    }

    #[test]
    fn toggle_read_flips_state() {
        let mut a = dated("A", "2024-01-01");
        assert!(!a.is_read());
        a.toggle_read();
        assert!(a.is_read());
        a.toggle_read();
        assert!(!a.is_read());
        a.mark_read();
        a.mark_read();
        assert!(a.is_read());
    }

    fn arb_article() -> impl Strategy<Value = Article> {
        (
            "[a-z]{1,6}",
            prop_oneof![
                (2000i32..2030, 1u32..13, 1u32..29)
                    .prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d)),
                Just(String::new()),
                Just("garbage".to_string()),
            ],
            any::<bool>(),
        )
            .prop_map(|(title, date, read)| {
                let mut a = dated(&title, &date);
                a.read = read;
                a
            })
    }

    proptest! {
        #[test]
        fn sort_preserves_length_and_orders_pairwise(mut list in prop::collection::vec(arb_article(), 0..30)) {
            let before = list.len();
            sort_articles(&mut list);
            prop_assert_eq!(list.len(), before);
            for pair in list.windows(2) {
                prop_assert_ne!(natural_order(&pair[0], &pair[1]), Ordering::Greater);
            }
        }
    }
}
