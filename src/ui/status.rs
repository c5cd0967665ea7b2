use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

const HINTS: &str = "[r]efresh [Enter]open [m]ark [s]hare [c]menu [?]help [q]uit";

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: &str = if let Some((msg, _)) = &app.status_message {
        msg
    } else if app.show_progress {
        "Loading news... [Esc] hide"
    } else {
        HINTS
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
