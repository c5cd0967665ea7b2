use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::fetcher::{fetch_articles, FetchError, RetryPolicy};
use super::notification::{FetchNotification, NotificationBus};
use crate::storage::Database;

/// Queued requests beyond the one being served. Extra requests are dropped
/// because a later fetch returns the same feed.
const REQUEST_QUEUE: usize = 4;

/// Request for one fetch of the configured feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchRequest {
    /// Set by the recurring wake-up rather than by the user.
    pub background: bool,
}

impl FetchRequest {
    pub fn foreground() -> Self {
        Self { background: false }
    }

    pub fn background() -> Self {
        Self { background: true }
    }
}

/// Anything that can start a fetch. The result arrives later on the
/// notification bus, never through this call.
pub trait FetchTrigger {
    fn request(&self, request: FetchRequest) -> Result<(), FetchError>;
}

/// Cloneable sender side of the fetch service's request queue.
#[derive(Clone)]
pub struct FetchHandle {
    tx: mpsc::Sender<FetchRequest>,
}

impl FetchTrigger for FetchHandle {
    fn request(&self, request: FetchRequest) -> Result<(), FetchError> {
        match self.tx.try_send(request) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(
                    background = request.background,
                    "Fetch queue full, request dropped"
                );
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(FetchError::ServiceUnavailable),
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Fetches the feed on its own task and publishes each finished batch.
///
/// Failed fetches are logged and publish nothing. Background fetches also
/// write their batch to the archive, since no consumer may be listening.
pub struct FetchService {
    client: reqwest::Client,
    feed_url: String,
    policy: RetryPolicy,
    bus: NotificationBus,
    archive: Option<Database>,
    rx: mpsc::Receiver<FetchRequest>,
}

impl FetchService {
    /// Start the service task. It runs until every [`FetchHandle`] is dropped.
    pub fn spawn(
        client: reqwest::Client,
        feed_url: impl Into<String>,
        policy: RetryPolicy,
        bus: NotificationBus,
        archive: Option<Database>,
    ) -> (FetchHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE);
        let service = Self {
            client,
            feed_url: feed_url.into(),
            policy,
            bus,
            archive,
            rx,
        };
        (FetchHandle { tx }, tokio::spawn(service.run()))
    }

    async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            self.serve(request).await;
        }
        tracing::debug!("Fetch service stopped");
    }

    async fn serve(&self, request: FetchRequest) {
        let started = std::time::Instant::now();
        let batch = match fetch_articles(&self.client, &self.feed_url, self.policy).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(
                    feed = %self.feed_url,
                    background = request.background,
                    error = %e,
                    "Feed fetch failed"
                );
                return;
            }
        };

        tracing::info!(
            feed = %self.feed_url,
            count = batch.len(),
            background = request.background,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Feed fetched"
        );

        if request.background {
            if let Some(db) = &self.archive {
                if let Err(e) = db.write_articles(&batch).await {
                    tracing::error!(error = %e, "Failed to archive background fetch");
                }
            }
        }

        self.bus
            .publish(FetchNotification::finished(batch, request.background));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>One</title><link>https://example.com/1</link></item>
    <item><title>Two</title><link>https://example.com/2</link></item>
</channel></rss>"#;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(5),
            max_retries: 0,
            base_delay: Duration::from_millis(1),
        }
    }

    async fn feed_server(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string(RSS))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn foreground_fetch_publishes_batch() {
        let server = feed_server(200).await;
        let bus = NotificationBus::new();
        let mut sub = bus.subscribe();
        let (handle, _task) = FetchService::spawn(
            reqwest::Client::new(),
            format!("{}/rss", server.uri()),
            policy(),
            bus.clone(),
            None,
        );

        handle.request(FetchRequest::foreground()).unwrap();
        let notification = tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .unwrap()
            .unwrap();

        assert!(!notification.background);
        let batch = notification.into_batch().unwrap();
        let titles: Vec<_> = batch.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two"]);
    }

    #[tokio::test]
    async fn background_fetch_is_archived() {
        let server = feed_server(200).await;
        let db = Database::open(":memory:").await.unwrap();
        let bus = NotificationBus::new();
        let mut sub = bus.subscribe();
        let (handle, _task) = FetchService::spawn(
            reqwest::Client::new(),
            format!("{}/rss", server.uri()),
            policy(),
            bus.clone(),
            Some(db.clone()),
        );

        handle.request(FetchRequest::background()).unwrap();
        let notification = tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(notification.background);
        assert_eq!(db.load_articles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_publishes_nothing() {
        let server = feed_server(404).await;
        let bus = NotificationBus::new();
        let mut sub = bus.subscribe();
        let (handle, task) = FetchService::spawn(
            reqwest::Client::new(),
            format!("{}/rss", server.uri()),
            policy(),
            bus.clone(),
            None,
        );

        handle.request(FetchRequest::foreground()).unwrap();
        drop(handle);
        task.await.unwrap();
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn request_after_shutdown_is_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = FetchHandle { tx };
        assert!(matches!(
            handle.request(FetchRequest::foreground()),
            Err(FetchError::ServiceUnavailable)
        ));
    }
}
