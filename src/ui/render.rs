//! Render functions for the TUI.
//!
//! The list and status bar are always drawn; overlays (progress, context
//! menu, share sheet, help) stack on top in that order.

use crate::app::App;
use crate::intent::ShareTarget;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{articles, help, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) const SPINNER_FRAMES: usize = SPINNER.len();

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    articles::render(f, app, chunks[0]);
    status::render(f, app, chunks[1]);

    if app.show_progress {
        render_progress_overlay(f, app);
    }
    if app.context_menu.is_some() {
        render_context_menu_overlay(f, app);
    }
    if app.share_sheet.is_open() {
        render_share_overlay(f, app);
    }
    if app.show_help {
        help::render(f);
    }
}

/// Fixed-size box centered in `area`, or `None` if it would not fit.
fn dialog_rect(area: Rect, width: u16, height: u16) -> Option<Rect> {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    if width < 20 || height < 3 {
        return None;
    }
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Some(Rect::new(x, y, width, height))
}

fn dialog(title: String, text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
}

fn render_progress_overlay(f: &mut Frame, app: &App) {
    let Some(overlay) = dialog_rect(f.area(), 40, 5) else {
        return;
    };
    f.render_widget(Clear, overlay);
    let text = format!(
        "{} Loading News. Please Wait...\n(Esc) Hide",
        SPINNER[app.spinner_frame % SPINNER_FRAMES]
    );
    f.render_widget(dialog(String::new(), text), overlay);
}

fn render_context_menu_overlay(f: &mut Frame, app: &App) {
    let Some(menu) = &app.context_menu else {
        return;
    };
    let title = app
        .store
        .get(menu.index)
        .map(|a| format!(" {} ", a.title))
        .unwrap_or_default();

    let items: Vec<String> = menu
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if i == menu.selected { ">" } else { " " };
            format!("{} {}", marker, entry.label)
        })
        .collect();
    let text = format!("{}\n\n(Enter) Select  (Esc) Cancel", items.join("\n"));

    let height = text.lines().count() as u16 + 2;
    let Some(overlay) = dialog_rect(f.area(), 45, height) else {
        return;
    };
    f.render_widget(Clear, overlay);
    f.render_widget(dialog(title, text), overlay);
}

fn render_share_overlay(f: &mut Frame, app: &App) {
    let Some(intent) = app.share_sheet.pending() else {
        return;
    };

    let targets: Vec<String> = ShareTarget::ALL
        .iter()
        .enumerate()
        .map(|(i, target)| {
            let marker = if i == app.share_sheet.selected { ">" } else { " " };
            format!("{} {}", marker, target.label())
        })
        .collect();
    let text = format!(
        "Subject: {}\n\n{}\n\n(Enter) Share  (Esc) Cancel",
        intent.subject,
        targets.join("\n")
    );

    let height = text.lines().count() as u16 + 2;
    let Some(overlay) = dialog_rect(f.area(), 50, height) else {
        return;
    };
    f.render_widget(Clear, overlay);
    f.render_widget(dialog(format!(" {} ", intent.chooser_title), text), overlay);
}
