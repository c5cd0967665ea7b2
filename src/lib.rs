//! newsdesk: a single-feed terminal news reader.
//!
//! The fetch service downloads the feed in the background and publishes each
//! finished batch on a notification bus. The article store takes the latest
//! batch, the list presenter renders it with read/unread colours from the
//! settings store, and the lifecycle hooks archive the collection and arm a
//! periodic background refresh while the reader is out of focus.

pub mod app;
pub mod article;
pub mod config;
pub mod feed;
pub mod intent;
pub mod lifecycle;
pub mod presenter;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod store;
pub mod theme;
pub mod ui;
pub mod util;
