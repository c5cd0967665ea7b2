//! Feed retrieval and the fetch-complete notification path.
//!
//! - [`parser`] turns RSS/Atom bytes into [`Article`](crate::article::Article)s via `feed-rs`
//! - [`fetcher`] does the HTTP side with timeout, retry and a size cap
//! - [`service`] runs fetches on a background task, fed by [`FetchRequest`]s
//! - [`notification`] carries each finished batch to whoever is subscribed
//!
//! ```ignore
//! let bus = NotificationBus::new();
//! let mut sub = bus.subscribe();
//! let (fetch, _task) = FetchService::spawn(client, url, RetryPolicy::default(), bus, None);
//! fetch.request(FetchRequest::foreground())?;
//! let batch = sub.recv().await.unwrap().into_batch()?;
//! ```

mod fetcher;
pub mod notification;
mod parser;
mod service;

pub use fetcher::{fetch_articles, FetchError, RetryPolicy};
pub use notification::{
    ArticleBundle, FetchNotification, NotificationBus, NotificationError, Subscription,
    FINISH_ACTION,
};
pub use parser::{parse_feed, ParseResult};
pub use service::{FetchHandle, FetchRequest, FetchService, FetchTrigger};
