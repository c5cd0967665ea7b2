use crate::app::App;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the article list. Each row is title, date and a one-line excerpt,
/// coloured by the row's read/unread style.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let rows = app.presenter.rows();
    // -2 borders, -2 highlight symbol
    let text_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = if rows.is_empty() {
        vec![ListItem::new("No articles. Press r to refresh.")]
    } else {
        rows.iter()
            .map(|row| {
                let style = row.style.to_style();
                let excerpt = row.description.lines().next().unwrap_or_default();
                let title_style = if row.read {
                    style
                } else {
                    style.add_modifier(Modifier::BOLD)
                };

                ListItem::new(vec![
                    Line::from(Span::styled(
                        truncate_to_width(&row.title, text_width).into_owned(),
                        title_style,
                    )),
                    Line::from(Span::styled(
                        truncate_to_width(&row.date, text_width).into_owned(),
                        style.add_modifier(Modifier::ITALIC),
                    )),
                    Line::from(Span::styled(
                        truncate_to_width(excerpt, text_width).into_owned(),
                        style,
                    )),
                ])
                .style(style)
            })
            .collect()
    };

    let unread = rows.iter().filter(|r| !r.read).count();
    let title = format!(" Articles ({} unread / {}) ", unread, rows.len());

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .highlight_symbol("▌ ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
