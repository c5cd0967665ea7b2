//! Fetch-complete notifications and the bus that carries them.
//!
//! The fetch service publishes one [`FetchNotification`] per finished fetch.
//! Consumers hold a [`Subscription`] only while they are active; dropping it
//! unsubscribes. A notification published while nobody is subscribed is lost,
//! which is the expected outcome for a paused consumer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::article::Article;

/// Action name carried by every fetch-complete notification.
pub const FINISH_ACTION: &str = "rss.finish";

/// Pending notifications a slow subscriber may fall behind by.
const BUS_CAPACITY: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// The title list names a record the bundle does not carry.
    #[error("Notification is missing the record for \"{title}\"")]
    MissingRecord { title: String },
    /// The notification was addressed to a different action.
    #[error("Unexpected notification action: {0}")]
    UnexpectedAction(String),
}

// ============================================================================
// Article Bundle
// ============================================================================

/// Serialized batch: records keyed by title plus the title list that fixes
/// iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleBundle {
    pub titles: Vec<String>,
    pub records: HashMap<String, Article>,
}

impl ArticleBundle {
    /// Pack a batch. Articles sharing a title share one record (the last one
    /// wins) while the title list keeps every occurrence.
    pub fn from_batch(batch: Vec<Article>) -> Self {
        let mut titles = Vec::with_capacity(batch.len());
        let mut records = HashMap::with_capacity(batch.len());
        for article in batch {
            titles.push(article.title.clone());
            records.insert(article.title.clone(), article);
        }
        Self { titles, records }
    }

    /// Unpack by walking the title list and looking up each record.
    pub fn into_batch(self) -> Result<Vec<Article>, NotificationError> {
        let Self { titles, records } = self;
        titles
            .into_iter()
            .map(|title| match records.get(&title) {
                Some(article) => Ok(article.clone()),
                None => Err(NotificationError::MissingRecord { title }),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

// ============================================================================
// Notification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchNotification {
    pub action: String,
    pub articles: ArticleBundle,
    /// True when the fetch was triggered by the background wake-up.
    #[serde(default)]
    pub background: bool,
}

impl FetchNotification {
    pub fn finished(batch: Vec<Article>, background: bool) -> Self {
        Self {
            action: FINISH_ACTION.to_string(),
            articles: ArticleBundle::from_batch(batch),
            background,
        }
    }

    /// Decode the carried batch in title-list order.
    pub fn into_batch(self) -> Result<Vec<Article>, NotificationError> {
        if self.action != FINISH_ACTION {
            return Err(NotificationError::UnexpectedAction(self.action));
        }
        self.articles.into_batch()
    }
}

// ============================================================================
// Bus
// ============================================================================

/// One-to-many channel between the fetch service and its consumers.
#[derive(Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<FetchNotification>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Deliver to every current subscriber. Returns how many received it.
    pub fn publish(&self, notification: FetchNotification) -> usize {
        match self.tx.send(notification) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!("Fetch notification dropped: no active subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Active registration on the bus. Dropping it unsubscribes.
pub struct Subscription {
    rx: broadcast::Receiver<FetchNotification>,
}

impl Subscription {
    /// Wait for the next notification. `None` once the bus is gone.
    ///
    /// If this subscriber fell behind, the skipped notifications are logged
    /// and the next retained one is returned; only the newest batch matters
    /// because each one replaces the collection.
    pub async fn recv(&mut self) -> Option<FetchNotification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged, skipping stale notifications");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll used when draining between frames.
    pub fn try_recv(&mut self) -> Option<FetchNotification> {
        loop {
            match self.rx.try_recv() {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged, skipping stale notifications");
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(title: &str) -> Article {
        Article::new(title, "desc", "2024-01-01", "https://example.com")
    }

    #[test]
    fn bundle_preserves_title_order() {
        let batch = vec![article("b"), article("a"), article("c")];
        let bundle = ArticleBundle::from_batch(batch.clone());
        assert_eq!(bundle.titles, ["b", "a", "c"]);
        assert_eq!(bundle.into_batch().unwrap(), batch);
    }

    #[test]
    fn duplicate_titles_resolve_to_last_record() {
        let mut first = article("same");
        first.description = "first".into();
        let mut second = article("same");
        second.description = "second".into();

        let bundle = ArticleBundle::from_batch(vec![first, second]);
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.records.len(), 1);

        let batch = bundle.into_batch().unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|a| a.description == "second"));
    }

    #[test]
    fn missing_record_is_an_error() {
        let mut bundle = ArticleBundle::from_batch(vec![article("kept")]);
        bundle.titles.push("ghost".into());
        assert_eq!(
            bundle.into_batch(),
            Err(NotificationError::MissingRecord {
                title: "ghost".into()
            })
        );
    }

    #[test]
    fn wrong_action_is_rejected() {
        let mut n = FetchNotification::finished(vec![article("x")], false);
        n.action = "something.else".into();
        assert!(matches!(
            n.into_batch(),
            Err(NotificationError::UnexpectedAction(_))
        ));
    }

    #[test]
    fn notification_survives_json() {
        let n = FetchNotification::finished(vec![article("x"), article("y")], true);
        let json = serde_json::to_string(&n).unwrap();
        let back: FetchNotification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped() {
        let bus = NotificationBus::new();
        assert_eq!(bus.publish(FetchNotification::finished(vec![], false)), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_and_drop_unsubscribes() {
        let bus = NotificationBus::new();
        let mut sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        assert_eq!(
            bus.publish(FetchNotification::finished(vec![article("x")], false)),
            1
        );
        let got = sub.recv().await.unwrap();
        assert_eq!(got.articles.titles, ["x"]);
        assert!(sub.try_recv().is_none());

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_gets_newest_retained() {
        let bus = NotificationBus::new();
        let mut sub = bus.subscribe();
        for i in 0..(BUS_CAPACITY + 3) {
            bus.publish(FetchNotification::finished(
                vec![article(&i.to_string())],
                false,
            ));
        }
        let first = sub.try_recv().unwrap();
        assert_eq!(first.articles.titles, ["3"]);
    }
}
