//! Help overlay: keybinding table.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const BINDINGS: [(&str, &str); 11] = [
    ("j / Down", "Next article"),
    ("k / Up", "Previous article"),
    ("Enter / o", "Open in browser (marks read)"),
    ("m", "Toggle read / unread"),
    ("s", "Share article"),
    ("c", "Article menu"),
    ("r", "Refresh feed"),
    ("Esc", "Hide progress / close overlay"),
    ("g / G", "First / last article"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

pub fn render(f: &mut Frame) {
    let overlay = centered_rect(60, 70, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let rows = BINDINGS
        .iter()
        .map(|(key, action)| Row::new(vec![format!("  {}", key), action.to_string()]));

    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (? to close) "),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
                .bottom_margin(1),
        );

    f.render_widget(table, overlay);
}

/// Centered rectangle covering the given percentage of `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |len: u16, percent: u16| (u32::from(len) * u32::from(percent.min(100)) / 100) as u16;
    let width = scale(area.width, percent_x);
    let height = scale(area.height, percent_y);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        assert_eq!(centered_rect(60, 70, area), Rect::new(20, 7, 60, 35));
    }

    #[test]
    fn centered_rect_handles_very_wide_terminals() {
        let area = Rect::new(0, 0, 2000, 20);
        let rect = centered_rect(60, 70, area);
        assert_eq!(rect, Rect::new(400, 3, 1200, 14));
    }
}
