//! View-model over the article store: sorting, row styles, and the actions a
//! user can take on one row.
//!
//! Rows are rebuilt wholesale by [`ListPresenter::refresh`] and patched one
//! at a time by the row actions. Row `i` always describes store article `i`.

use crate::article::Article;
use crate::intent::{BrowseIntent, BrowserLauncher, IntentError, ShareChooser, ShareIntent};
use crate::settings::{SettingKey, Settings};
use crate::store::ArticleStore;
use crate::theme::RowStyle;

/// Display state of one list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    pub date: String,
    pub description: String,
    pub read: bool,
    pub style: RowStyle,
}

impl Row {
    fn build(article: &Article, settings: &Settings) -> Self {
        Self {
            title: article.title.clone(),
            date: article.date.clone(),
            description: article.description.clone(),
            read: article.read,
            style: ListPresenter::render(article.read, settings),
        }
    }
}

/// Entries offered by the per-article context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Open,
    Share,
    ToggleRead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub action: MenuAction,
}

#[derive(Debug, Default)]
pub struct ListPresenter {
    rows: Vec<Row>,
}

impl ListPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Sort the store into natural order and rebuild every row.
    pub fn refresh(&mut self, store: &mut ArticleStore, settings: &Settings) {
        store.sort();
        self.rows = store
            .articles()
            .iter()
            .map(|article| Row::build(article, settings))
            .collect();
    }

    /// Colour pair for a row in the given read state. Unset keys fall back to
    /// white on black for unread and black on white for read.
    pub fn render(read: bool, settings: &Settings) -> RowStyle {
        let (bg_key, text_key, fallback) = if read {
            (SettingKey::ColorRead, SettingKey::TxtRead, RowStyle::READ_DEFAULT)
        } else {
            (
                SettingKey::ColorUnread,
                SettingKey::TxtUnread,
                RowStyle::UNREAD_DEFAULT,
            )
        };

        RowStyle {
            background: settings.get_color(bg_key, fallback.background),
            text: settings.get_color(text_key, fallback.text),
        }
    }

    fn rerender_row(&mut self, store: &ArticleStore, index: usize, settings: &Settings) {
        if let (Some(article), Some(row)) = (store.get(index), self.rows.get_mut(index)) {
            *row = Row::build(article, settings);
        }
    }

    // ========================================================================
    // Row Actions
    // ========================================================================

    /// Flip the read state of article `index` and restyle only its row.
    /// Nothing is re-sorted or persisted. Returns the new state.
    pub fn toggle_read(
        &mut self,
        store: &mut ArticleStore,
        index: usize,
        settings: &Settings,
    ) -> Option<bool> {
        let article = store.get_mut(index)?;
        article.toggle_read();
        let read = article.read;
        self.rerender_row(store, index, settings);
        Some(read)
    }

    /// Mark article `index` read and ask `launcher` to show it.
    ///
    /// The article stays read even if the launch fails. Returns `Ok(false)`
    /// when there is no such article.
    pub fn open<L>(
        &mut self,
        store: &mut ArticleStore,
        index: usize,
        settings: &Settings,
        launcher: &mut L,
    ) -> Result<bool, IntentError>
    where
        L: BrowserLauncher + ?Sized,
    {
        let Some(article) = store.get_mut(index) else {
            return Ok(false);
        };
        article.mark_read();
        let url = article.url.clone();
        self.rerender_row(store, index, settings);

        launcher.browse(BrowseIntent { url })?;
        Ok(true)
    }

    /// Compose the share text for `article` and hand it to `chooser`.
    pub fn share<C>(article: &Article, attribution: &str, chooser: &mut C) -> Result<(), IntentError>
    where
        C: ShareChooser + ?Sized,
    {
        chooser.choose(ShareIntent::for_article(article, attribution))
    }

    /// Long-press menu for `article`; the read entry names the state it
    /// would switch to.
    pub fn context_menu(article: &Article) -> Vec<MenuEntry> {
        vec![
            MenuEntry {
                label: "Open",
                action: MenuAction::Open,
            },
            MenuEntry {
                label: "Share",
                action: MenuAction::Share,
            },
            MenuEntry {
                label: if article.read {
                    "Mark as unread"
                } else {
                    "Mark as read"
                },
                action: MenuAction::ToggleRead,
            },
        ]
    }
}
