//! The in-memory article collection and its suspend/resume hooks.
//!
//! The store is owned by the UI task and mutated only there. Every
//! fetch-complete notification replaces the whole collection; nothing is
//! merged or deduplicated across fetches.

use anyhow::Result;

use crate::article::{sort_articles, Article};
use crate::feed::{FetchNotification, NotificationBus, NotificationError, Subscription};
use crate::scheduler::WakeScheduler;
use crate::settings::Settings;

/// Durable home for the collection while the reader is not in front.
#[allow(async_fn_in_trait)]
pub trait ArticleArchive {
    /// Replace the archived collection. Returns how many articles were written.
    async fn archive(&self, articles: &[Article]) -> Result<usize>;
}

#[derive(Debug, Default, Clone)]
pub struct ArticleStore {
    articles: Vec<Article>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. from the archive at startup.
    pub fn from_articles(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    // ========================================================================
    // Notification Handling
    // ========================================================================

    /// Replace the collection with `batch`, in the order given.
    pub fn on_fetch_complete(&mut self, batch: Vec<Article>) {
        tracing::debug!(
            previous = self.articles.len(),
            incoming = batch.len(),
            "Replacing article collection"
        );
        self.articles = batch;
    }

    /// Decode a notification and replace the collection with its batch.
    ///
    /// A notification that cannot be decoded leaves the store untouched.
    pub fn apply(&mut self, notification: FetchNotification) -> Result<usize, NotificationError> {
        let batch = notification.into_batch()?;
        let count = batch.len();
        self.on_fetch_complete(batch);
        Ok(count)
    }

    // ========================================================================
    // Lifecycle Hooks
    // ========================================================================

    /// Archive the collection and, if any widgets are placed, arm the
    /// recurring wake-up. Returns whether the wake-up was armed.
    ///
    /// A failed archive write is logged; it does not stop the wake-up from
    /// being armed.
    pub async fn on_suspend<A, W>(&self, archive: &A, settings: &Settings, scheduler: &mut W) -> bool
    where
        A: ArticleArchive + ?Sized,
        W: WakeScheduler + ?Sized,
    {
        match archive.archive(&self.articles).await {
            Ok(count) => tracing::debug!(count, "Collection archived on suspend"),
            Err(e) => tracing::error!(error = %e, "Failed to archive collection on suspend"),
        }

        if settings.widget_count() > 0 {
            scheduler.start();
            true
        } else {
            false
        }
    }

    /// Start listening for fetch-complete notifications. Dropping the returned
    /// subscription stops delivery.
    pub fn on_resume(&self, bus: &NotificationBus) -> Subscription {
        bus.subscribe()
    }

    // ========================================================================
    // Read Access
    // ========================================================================

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Article> {
        self.articles.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Sort into natural order (newest first).
    pub fn sort(&mut self) {
        sort_articles(&mut self.articles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingKey;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryArchive {
        saved: Mutex<Vec<Article>>,
        fail: bool,
    }

    impl ArticleArchive for MemoryArchive {
        async fn archive(&self, articles: &[Article]) -> Result<usize> {
            if self.fail {
                anyhow::bail!("disk full");
            }
            *self.saved.lock().unwrap() = articles.to_vec();
            Ok(articles.len())
        }
    }

    #[derive(Default)]
    struct CountingScheduler {
        starts: usize,
        armed: bool,
    }

    impl WakeScheduler for CountingScheduler {
        fn start(&mut self) {
            self.starts += 1;
            self.armed = true;
        }

        fn stop(&mut self) {
            self.armed = false;
        }

        fn is_armed(&self) -> bool {
            self.armed
        }
    }

    fn article(title: &str, date: &str) -> Article {
        Article::new(title, "", date, format!("https://example.com/{}", title))
    }

    #[test]
    fn fetch_complete_replaces_wholesale() {
        let mut store = ArticleStore::from_articles(vec![article("old", "2023-01-01")]);
        store.on_fetch_complete(vec![article("a", ""), article("a", "")]);
        assert_eq!(store.len(), 2);
        assert!(store.articles().iter().all(|a| a.title == "a"));

        store.on_fetch_complete(Vec::new());
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_notification_leaves_store_unchanged() {
        let mut store = ArticleStore::from_articles(vec![article("kept", "2024-01-01")]);
        let mut notification = FetchNotification::finished(vec![article("new", "")], false);
        notification.articles.titles.push("ghost".into());

        assert!(matches!(
            store.apply(notification),
            Err(NotificationError::MissingRecord { .. })
        ));
        assert_eq!(store.articles()[0].title, "kept");
    }

    #[test]
    fn apply_keeps_title_list_order() {
        let mut store = ArticleStore::new();
        let batch = vec![article("z", ""), article("m", ""), article("a", "")];
        let count = store
            .apply(FetchNotification::finished(batch.clone(), false))
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.articles(), batch.as_slice());
    }

    #[test]
    fn sort_puts_newest_first() {
        let mut store = ArticleStore::from_articles(vec![
            article("A", "2024-01-01"),
            article("B", "2024-01-02"),
        ]);
        store.sort();
        assert_eq!(store.get(0).unwrap().title, "B");
        assert_eq!(store.get(1).unwrap().title, "A");
        assert!(store.get(2).is_none());
    }

    #[tokio::test]
    async fn suspend_archives_and_arms_with_widgets() {
        let store = ArticleStore::from_articles(vec![article("x", "")]);
        let archive = MemoryArchive::default();
        let settings = Settings::new().with(SettingKey::WidgetCount, 2);
        let mut scheduler = CountingScheduler::default();

        assert!(store.on_suspend(&archive, &settings, &mut scheduler).await);
        assert_eq!(scheduler.starts, 1);
        assert_eq!(archive.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn suspend_without_widgets_only_archives() {
        let store = ArticleStore::from_articles(vec![article("x", "")]);
        let archive = MemoryArchive::default();
        let mut scheduler = CountingScheduler::default();

        assert!(!store.on_suspend(&archive, &Settings::new(), &mut scheduler).await);
        assert_eq!(scheduler.starts, 0);
        assert_eq!(archive.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn suspend_arms_even_if_archive_fails() {
        let store = ArticleStore::new();
        let archive = MemoryArchive {
            fail: true,
            ..Default::default()
        };
        let settings = Settings::new().with(SettingKey::WidgetCount, 1);
        let mut scheduler = CountingScheduler::default();

        assert!(store.on_suspend(&archive, &settings, &mut scheduler).await);
        assert!(scheduler.is_armed());
    }

    #[tokio::test]
    async fn resume_subscribes_until_dropped() {
        let store = ArticleStore::new();
        let bus = NotificationBus::new();
        let sub = store.on_resume(&bus);
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
