//! Outbound requests: view an article in a browser, or share it.
//!
//! The presenter builds the request and hands it to a collaborator. The
//! shipped browser launcher goes through the desktop's URL handler; the
//! share chooser is the UI's share sheet.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::article::Article;
use crate::util::{validate_url, UrlValidationError};

pub const SHARE_MIME_TYPE: &str = "text/plain";
pub const SHARE_SUBJECT: &str = "Check this article out";
pub const SHARE_CHOOSER_TITLE: &str = "How do you want to share?";

#[derive(Debug, Error)]
pub enum IntentError {
    #[error("Refusing to open link: {0}")]
    UnsafeUrl(#[from] UrlValidationError),
    #[error("Failed to launch browser: {0}")]
    Launch(#[source] std::io::Error),
    #[error("Failed to write shared article: {0}")]
    Write(#[source] std::io::Error),
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

// ============================================================================
// Browse
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseIntent {
    pub url: String,
}

pub trait BrowserLauncher {
    fn browse(&mut self, intent: BrowseIntent) -> Result<(), IntentError>;
}

/// Opens links with the desktop's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn browse(&mut self, intent: BrowseIntent) -> Result<(), IntentError> {
        // The URL is passed to a platform command; only public http(s) gets through.
        let url = validate_url(&intent.url)?;
        open::that(url.as_str()).map_err(IntentError::Launch)?;
        tracing::info!(url = %url, "Opened article in browser");
        Ok(())
    }
}

// ============================================================================
// Share
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareIntent {
    pub mime_type: String,
    pub subject: String,
    pub text: String,
    pub chooser_title: String,
}

impl ShareIntent {
    /// Compose the plain-text share for `article`. The link is passed through
    /// as-is.
    pub fn for_article(article: &Article, attribution: &str) -> Self {
        Self {
            mime_type: SHARE_MIME_TYPE.to_string(),
            subject: SHARE_SUBJECT.to_string(),
            text: format!(
                "{} from {}\n{}\nTo read more, click this link(or copy it into URL bar): {}",
                article.title, attribution, article.description, article.url
            ),
            chooser_title: SHARE_CHOOSER_TITLE.to_string(),
        }
    }
}

/// Presents a share request to the user, who picks where it goes.
pub trait ShareChooser {
    fn choose(&mut self, intent: ShareIntent) -> Result<(), IntentError>;
}

/// Where a share can be delivered from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Clipboard,
    File,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 2] = [ShareTarget::Clipboard, ShareTarget::File];

    pub fn label(self) -> &'static str {
        match self {
            ShareTarget::Clipboard => "Copy to clipboard",
            ShareTarget::File => "Append to shared.txt",
        }
    }
}

/// Append the share as one block to `path`, creating the file if needed.
pub fn append_share(path: &Path, intent: &ShareIntent) -> Result<(), IntentError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(IntentError::Write)?;
    writeln!(file, "Subject: {}\n{}\n", intent.subject, intent.text).map_err(IntentError::Write)
}

/// Put the share body on the system clipboard.
pub fn copy_share(clipboard: &mut arboard::Clipboard, intent: &ShareIntent) -> Result<(), IntentError> {
    clipboard
        .set_text(intent.text.clone())
        .map_err(|e| IntentError::Clipboard(e.to_string()))
}
