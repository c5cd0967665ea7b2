use crate::article::Article;
use crate::feed::{FetchNotification, FetchRequest, FetchTrigger, NotificationBus, Subscription};
use crate::intent::{
    append_share, copy_share, BrowserLauncher, IntentError, ShareChooser, ShareIntent, ShareTarget,
};
use crate::lifecycle::{ActivityState, Lifecycle};
use crate::presenter::{ListPresenter, MenuAction, MenuEntry};
use crate::scheduler::WakeScheduler;
use crate::settings::Settings;
use crate::storage::Database;
use crate::store::ArticleStore;
use anyhow::Result;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy: at most 3 hops, loops rejected.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        if attempt.previous().iter().any(|prev| prev == attempt.url()) {
            return attempt.error("Redirect loop detected");
        }
        tracing::debug!(to = %attempt.url(), hop = attempt.previous().len() + 1, "Following redirect");
        attempt.follow()
    })
}

/// HTTP client shared by every fetch.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(timeout)
        .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

// ============================================================================
// Overlay State
// ============================================================================

/// Long-press menu for one article.
pub struct ContextMenuState {
    /// Store index of the article the menu was opened on.
    pub index: usize,
    pub entries: Vec<MenuEntry>,
    pub selected: usize,
}

/// Share chooser shown as an overlay. A share request opens it; the user
/// then picks a [`ShareTarget`] or dismisses it.
pub struct ShareSheet {
    pending: Option<ShareIntent>,
    pub selected: usize,
    save_path: PathBuf,
    clipboard: Option<arboard::Clipboard>,
}

impl ShareSheet {
    pub fn new(save_path: PathBuf) -> Self {
        Self {
            pending: None,
            selected: 0,
            save_path,
            clipboard: None,
        }
    }

    pub fn pending(&self) -> Option<&ShareIntent> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % ShareTarget::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + ShareTarget::ALL.len() - 1) % ShareTarget::ALL.len();
    }

    /// Send the pending share to the selected target and close the sheet.
    ///
    /// On failure the sheet stays open with the share still pending, so
    /// another target can be picked.
    pub fn deliver(&mut self) -> Result<Option<ShareTarget>, IntentError> {
        let Some(intent) = self.pending.as_ref() else {
            return Ok(None);
        };
        let target = ShareTarget::ALL[self.selected];
        match target {
            ShareTarget::File => append_share(&self.save_path, intent)?,
            ShareTarget::Clipboard => {
                // Kept alive: on X11 the selection vanishes with its owner.
                if self.clipboard.is_none() {
                    let clipboard = arboard::Clipboard::new()
                        .map_err(|e| IntentError::Clipboard(e.to_string()))?;
                    self.clipboard = Some(clipboard);
                }
                if let Some(clipboard) = self.clipboard.as_mut() {
                    copy_share(clipboard, intent)?;
                }
            }
        }
        self.pending = None;
        tracing::info!(target = ?target, "Article shared");
        Ok(Some(target))
    }
}

impl ShareChooser for ShareSheet {
    fn choose(&mut self, intent: ShareIntent) -> Result<(), IntentError> {
        self.pending = Some(intent);
        self.selected = 0;
        Ok(())
    }
}

// ============================================================================
// Application State
// ============================================================================

/// The collaborators the reader drives but does not own the behaviour of.
pub struct Collaborators {
    pub fetch: Box<dyn FetchTrigger>,
    pub alarm: Box<dyn WakeScheduler>,
    pub browser: Box<dyn BrowserLauncher>,
}

/// Central application state
pub struct App {
    pub db: Database,
    bus: NotificationBus,
    fetch: Box<dyn FetchTrigger>,
    alarm: Box<dyn WakeScheduler>,
    browser: Box<dyn BrowserLauncher>,

    // Core
    pub store: ArticleStore,
    pub presenter: ListPresenter,
    pub settings: Settings,
    pub lifecycle: Lifecycle,
    /// Present only while resumed (or between create and first resume).
    subscription: Option<Subscription>,
    pub attribution: String,

    // UI State
    pub selected: usize,
    pub show_progress: bool,
    pub spinner_frame: usize,
    pub context_menu: Option<ContextMenuState>,
    pub share_sheet: ShareSheet,
    pub show_help: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(
        db: Database,
        bus: NotificationBus,
        collaborators: Collaborators,
        settings: Settings,
        attribution: impl Into<String>,
        share_path: PathBuf,
    ) -> Self {
        let Collaborators {
            fetch,
            alarm,
            browser,
        } = collaborators;
        Self {
            db,
            bus,
            fetch,
            alarm,
            browser,
            store: ArticleStore::new(),
            presenter: ListPresenter::new(),
            settings,
            lifecycle: Lifecycle::new(),
            subscription: None,
            attribution: attribution.into(),
            selected: 0,
            show_progress: false,
            spinner_frame: 0,
            context_menu: None,
            share_sheet: ShareSheet::new(share_path),
            show_help: false,
            status_message: None,
            needs_redraw: true,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// First start: cancel any background wake-up left armed, show the last
    /// archived articles, subscribe and start a foreground fetch.
    pub fn create(&mut self, archived: Vec<Article>) {
        self.alarm.stop();
        self.store = ArticleStore::from_articles(archived);
        self.presenter.refresh(&mut self.store, &self.settings);
        self.subscription = Some(self.store.on_resume(&self.bus));
        self.request_fetch();
    }

    /// Back in front: listen again, pick up settings changed while away and
    /// redisplay what is already in memory.
    pub async fn resume(&mut self) -> Result<()> {
        self.lifecycle.transition(ActivityState::Resumed)?;
        if self.subscription.is_none() {
            self.subscription = Some(self.store.on_resume(&self.bus));
        }
        match Settings::load(&self.db).await {
            Ok(settings) => self.settings = settings,
            Err(e) => tracing::warn!(error = %e, "Keeping previous settings"),
        }
        self.presenter.refresh(&mut self.store, &self.settings);
        self.clamp_selection();
        self.needs_redraw = true;
        Ok(())
    }

    /// Leaving the front: stop listening, archive, and arm the background
    /// wake-up if widgets need it. Returns whether it was armed.
    pub async fn pause(&mut self) -> Result<bool> {
        self.lifecycle.transition(ActivityState::Paused)?;
        self.subscription = None;
        let armed = self
            .store
            .on_suspend(&self.db, &self.settings, &mut *self.alarm)
            .await;
        tracing::info!(armed, "Reader paused");
        Ok(armed)
    }

    /// Shut down, pausing first if still in front.
    pub async fn destroy(&mut self) -> Result<()> {
        if self.lifecycle.is_resumed() {
            self.pause().await?;
        }
        self.lifecycle.transition(ActivityState::Destroyed)?;
        Ok(())
    }

    pub fn subscription_mut(&mut self) -> Option<&mut Subscription> {
        self.subscription.as_mut()
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Ask for a foreground fetch and show the progress indicator.
    pub fn request_fetch(&mut self) {
        match self.fetch.request(FetchRequest::foreground()) {
            Ok(()) => {
                self.show_progress = true;
                self.spinner_frame = 0;
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not start fetch");
                self.set_status(format!("Refresh failed: {}", e));
            }
        }
        self.needs_redraw = true;
    }

    /// Hide the progress indicator. The fetch itself keeps running.
    pub fn dismiss_progress(&mut self) {
        self.show_progress = false;
        self.needs_redraw = true;
    }

    /// Replace the collection with a finished fetch and redisplay it.
    pub fn handle_notification(&mut self, notification: FetchNotification) {
        self.show_progress = false;
        self.needs_redraw = true;

        match self.store.apply(notification) {
            Ok(count) => {
                self.presenter.refresh(&mut self.store, &self.settings);
                self.context_menu = None;
                self.clamp_selection();
                self.set_status(format!("Loaded {} articles", count));
            }
            Err(e) => {
                tracing::error!(error = %e, "Discarding malformed fetch notification");
                self.set_status(format!("Bad feed update: {}", e));
            }
        }
    }

    // ========================================================================
    // Row Actions
    // ========================================================================

    pub fn selected_article(&self) -> Option<&Article> {
        self.store.get(self.selected)
    }

    pub fn open_selected(&mut self) {
        let index = self.selected;
        match self
            .presenter
            .open(&mut self.store, index, &self.settings, &mut *self.browser)
        {
            Ok(true) => {}
            Ok(false) => self.set_status("No article selected"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open article");
                self.set_status(format!("{}", e));
            }
        }
        self.needs_redraw = true;
    }

    pub fn toggle_selected(&mut self) {
        let index = self.selected;
        if self
            .presenter
            .toggle_read(&mut self.store, index, &self.settings)
            .is_some()
        {
            self.needs_redraw = true;
        }
    }

    pub fn share_selected(&mut self) {
        let Some(article) = self.store.get(self.selected) else {
            self.set_status("No article selected");
            return;
        };
        if let Err(e) = ListPresenter::share(article, &self.attribution, &mut self.share_sheet) {
            self.set_status(format!("{}", e));
        }
        self.needs_redraw = true;
    }

    pub fn finish_share(&mut self) {
        match self.share_sheet.deliver() {
            Ok(Some(ShareTarget::Clipboard)) => self.set_status("Copied to clipboard"),
            Ok(Some(ShareTarget::File)) => self.set_status("Saved to shared.txt"),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Share failed");
                self.set_status(format!("{}", e));
            }
        }
        self.needs_redraw = true;
    }

    pub fn open_context_menu(&mut self) {
        if let Some(article) = self.store.get(self.selected) {
            self.context_menu = Some(ContextMenuState {
                index: self.selected,
                entries: ListPresenter::context_menu(article),
                selected: 0,
            });
            self.needs_redraw = true;
        }
    }

    /// Run the highlighted context menu entry and close the menu.
    pub fn activate_context_menu(&mut self) {
        let Some(menu) = self.context_menu.take() else {
            return;
        };
        let Some(entry) = menu.entries.get(menu.selected) else {
            return;
        };
        self.selected = menu.index;
        match entry.action {
            MenuAction::Open => self.open_selected(),
            MenuAction::Share => self.share_selected(),
            MenuAction::ToggleRead => self.toggle_selected(),
        }
        self.needs_redraw = true;
    }

    // ========================================================================
    // Navigation & Status
    // ========================================================================

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        if self.selected + 1 < self.store.len() {
            self.selected += 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.store.len().saturating_sub(1));
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it has been shown long enough.
    /// Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
