use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render keybindings help popup
pub fn render_keybindings_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 85, area);
    frame.render_widget(Clear, popup_area);

    let help_text = Paragraph::new(keybindings())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keybindings ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Left);
    frame.render_widget(help_text, popup_area);

    if popup_area.height < 3 || popup_area.width < 3 {
        return;
    }
    let footer_area = Rect {
        x: popup_area.x + 1,
        y: popup_area.y + popup_area.height - 1,
        width: popup_area.width - 2,
        height: 1,
    };
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("? ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled("or ", Style::default().fg(Color::DarkGray)),
        Span::styled("ESC ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled("to close", Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, footer_area);
}

fn keybindings() -> Vec<Line<'static>> {
    let section = |title: &str| -> Line<'static> {
        Line::from(vec![Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )])
    };
    let key = |keys: &str, what: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("  {:<14}", keys),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(what.to_string()),
        ])
    };

    vec![
        section("Everywhere"),
        key("1-5 / TAB", "Switch tab"),
        key("j / k", "Move selection"),
        key("?", "Toggle this help"),
        key("ESC", "Dismiss notice / leave input"),
        key("q", "Quit"),
        Line::from(""),
        section("News"),
        key("h / l", "Previous / next category"),
        key("/", "Search (results follow as you type)"),
        key("ENTER", "Open article in browser"),
        key("r", "Reload headlines"),
        Line::from(""),
        section("Movies"),
        key("/", "Search movies"),
        key("p", "Back to popular"),
        key("ENTER", "Load details"),
        key("s", "Rate (0.5 to 10)"),
        key("x", "Delete your rating"),
        key("w", "Add to watchlist"),
        key("f / F", "Favorite / unfavorite"),
        Line::from(""),
        section("TV"),
        key("ENTER", "Load details"),
        key("s", "Rate (0.5 to 10)"),
        key("w", "Add to watchlist"),
        key("f / F", "Favorite / unfavorite"),
        key("r", "Reload popular shows"),
        Line::from(""),
        section("Account"),
        key("l", "Log in to TMDB"),
        key("a", "Account details"),
        key("f", "Favorite movies"),
        key("w", "Movie watchlist"),
        Line::from(""),
        section("Upload"),
        key("i / ENTER", "Pick an image file to upload"),
    ]
}

/// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
