//! Input handling for the TUI.
//!
//! Terminal focus drives the reader's lifecycle: losing focus pauses a
//! resumed reader, regaining it resumes a paused one. Overlays capture every
//! key while visible, in the order help, share sheet, context menu.
//! Otherwise keys act on the selected article.

use crate::app::App;
use crate::lifecycle::ActivityState;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

use super::Action;

/// Dispatch one terminal event.
pub(super) async fn handle_event(app: &mut App, event: Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            return handle_input(app, key.code, key.modifiers);
        }
        Event::FocusLost => {
            if app.lifecycle.state() == ActivityState::Resumed {
                if let Err(e) = app.pause().await {
                    tracing::error!(error = %e, "Pause failed");
                }
            }
        }
        Event::FocusGained => {
            if app.lifecycle.state() == ActivityState::Paused {
                if let Err(e) = app.resume().await {
                    tracing::error!(error = %e, "Resume failed");
                }
            }
        }
        Event::Resize(_, _) => app.needs_redraw = true,
        _ => {}
    }
    Action::Continue
}

/// Main input dispatch function.
fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    app.needs_redraw = true;

    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }
    if app.share_sheet.is_open() {
        handle_share_input(app, code);
        return Action::Continue;
    }
    if app.context_menu.is_some() {
        handle_context_menu_input(app, code);
        return Action::Continue;
    }

    handle_list_input(app, code)
}

fn handle_help_input(app: &mut App, code: KeyCode) {
    if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
        app.show_help = false;
    }
}

fn handle_share_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => app.share_sheet.dismiss(),
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => app.share_sheet.select_next(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => app.share_sheet.select_prev(),
        KeyCode::Enter => app.finish_share(),
        _ => {}
    }
}

fn handle_context_menu_input(app: &mut App, code: KeyCode) {
    let Some(menu) = app.context_menu.as_mut() else {
        return;
    };
    match code {
        KeyCode::Esc | KeyCode::Char('q') => app.context_menu = None,
        KeyCode::Char('j') | KeyCode::Down => {
            if menu.selected + 1 < menu.entries.len() {
                menu.selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            menu.selected = menu.selected.saturating_sub(1);
        }
        KeyCode::Enter => app.activate_context_menu(),
        _ => {}
    }
}

fn handle_list_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Esc => {
            if app.show_progress {
                app.dismiss_progress();
            }
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('g') | KeyCode::Home => app.selected = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.selected = app.store.len().saturating_sub(1);
        }
        KeyCode::Char('r') => app.request_fetch(),
        KeyCode::Enter | KeyCode::Char('o') => app.open_selected(),
        KeyCode::Char('m') => app.toggle_selected(),
        KeyCode::Char('s') => app.share_selected(),
        KeyCode::Char('c') => app.open_context_menu(),
        _ => app.needs_redraw = false,
    }
    Action::Continue
}
