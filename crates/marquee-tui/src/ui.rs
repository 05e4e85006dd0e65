// UI rendering logic
use crate::app::{AccountList, App, InputMode, MovieSource, Tab};
use crate::help_ui::{centered_rect, render_keybindings_help};
use marquee_api::media::ResponseStatus;
use marquee_core::dates::format_published;
use marquee_core::viewmodel::NewsCategory;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Tab content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.tab {
        Tab::News => render_news(frame, app, chunks[1]),
        Tab::Movies => render_movies(frame, app, chunks[1]),
        Tab::Tv => render_tv(frame, app, chunks[1]),
        Tab::Account => render_account(frame, app, chunks[1]),
        Tab::Upload => render_upload(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    if let Some(url) = &app.pending_approval {
        render_approval_popup(frame, url, frame.area());
    } else if app.show_help {
        render_keybindings_help(frame, frame.area());
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(14), Constraint::Min(0)])
        .split(area);

    let logo = Paragraph::new(Line::from(Span::styled(
        "Marquee",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(logo, header_chunks[0]);

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();

    let session = if app.media.has_session() {
        Span::styled(" logged in ", Style::default().fg(Color::Black).bg(Color::Green))
    } else {
        Span::styled(" no session ", Style::default().fg(Color::White).bg(Color::DarkGray))
    };

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title_bottom(Line::from(session).right_aligned()),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled("│", Style::default().fg(Color::DarkGray)));
    frame.render_widget(tabs, header_chunks[1]);
}

/// List on the left, preview on the right
fn split_content(area: Rect) -> (Rect, Rect) {
    let pct = if area.width < 100 { 50 } else { 45 };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(pct), Constraint::Percentage(100 - pct)])
        .split(area);
    (chunks[0], chunks[1])
}

fn list_title(label: &str, count: usize, loading: bool) -> String {
    if loading {
        format!(" {} (Loading...) ", label)
    } else {
        format!(" {} ({}) ", label, count)
    }
}

fn render_list(
    frame: &mut Frame,
    items: Vec<ListItem>,
    title: String,
    area: Rect,
    state: &mut ListState,
) {
    let empty = items.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(40, 40, 60))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    if empty {
        frame.render_widget(list, area);
    } else {
        frame.render_stateful_widget(list, area, state);
    }
}

fn render_preview(frame: &mut Frame, lines: Vec<Line<'static>>, area: Rect) {
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn muted(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(Color::DarkGray)))
}

fn status_line(label: &str, status: &Option<ResponseStatus>) -> Option<Line<'static>> {
    status.as_ref().map(|s| {
        Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
            Span::styled(s.status_message.clone(), Style::default().fg(Color::Green)),
        ])
    })
}

fn year(date: &str) -> &str {
    date.get(..4).unwrap_or("")
}

fn render_news(frame: &mut Frame, app: &mut App, area: Rect) {
    let mut constraints = vec![Constraint::Length(3)];
    if app.news.is_search_bar_visible {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(3));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    // Category chips
    let categories: Vec<Line> = NewsCategory::ALL.iter().map(|c| Line::from(c.label())).collect();
    let chips = Tabs::new(categories)
        .select(app.news.category.position())
        .block(Block::default().borders(Borders::ALL).title(" Category (h/l) "))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow));
    frame.render_widget(chips, chunks[0]);

    if app.news.is_search_bar_visible {
        let typing = app.input_mode == InputMode::NewsSearch;
        let mut spans = vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(app.news.search_query.clone()),
        ];
        if typing {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }
        let border = if typing { Color::Yellow } else { Color::DarkGray };
        let bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(bar, chunks[1]);
    }

    let (list_area, preview_area) = split_content(chunks[chunks.len() - 1]);

    let items: Vec<ListItem> = app
        .news
        .articles
        .iter()
        .map(|a| {
            ListItem::new(vec![
                Line::from(Span::styled(a.title.clone(), Style::default().fg(Color::White))),
                Line::from(Span::styled(
                    format!(
                        "  {} · {}",
                        a.source.name,
                        format_published(a.published_at.as_deref())
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();
    let title = list_title("Headlines", items.len(), app.news.is_loading);
    render_list(frame, items, title, list_area, &mut app.news_list);

    let lines = match app.selected_article() {
        Some(article) => {
            let mut lines = vec![heading(&article.title), Line::from("")];
            lines.push(field("Source", article.source.name.clone()));
            if let Some(author) = &article.author {
                lines.push(field("Author", author.clone()));
            }
            lines.push(field(
                "Published",
                format_published(article.published_at.as_deref()),
            ));
            lines.push(Line::from(""));
            if let Some(description) = &article.description {
                lines.push(Line::from(description.clone()));
                lines.push(Line::from(""));
            }
            if let Some(content) = &article.content {
                lines.push(muted(content));
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                article.url.clone(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            )));
            lines
        }
        None if app.news.is_loading => vec![muted("Fetching headlines...")],
        None => vec![muted("No articles")],
    };
    render_preview(frame, lines, preview_area);
}

fn render_movies(frame: &mut Frame, app: &mut App, area: Rect) {
    let (list_area, preview_area) = split_content(area);

    let items: Vec<ListItem> = app
        .visible_movies()
        .iter()
        .map(|m| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("★ {:>4.1}  ", m.vote_average),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(m.title.clone()),
                Span::styled(
                    format!(" ({})", year(&m.release_date)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let label = match app.movie_source {
        MovieSource::Popular => "Popular movies",
        MovieSource::Search => "Search results",
    };
    let title = list_title(label, items.len(), app.media.is_loading);
    render_list(frame, items, title, list_area, &mut app.movie_list);

    let mut lines = Vec::new();
    if let Some(movie) = app.selected_movie() {
        match app.media.movie_detail.as_ref().filter(|d| d.id == movie.id) {
            Some(detail) => {
                lines.push(heading(&detail.title));
                if let Some(tagline) = detail.tagline.as_ref().filter(|t| !t.is_empty()) {
                    lines.push(muted(tagline));
                }
                lines.push(Line::from(""));
                lines.push(field("Released", detail.release_date.clone()));
                if let Some(runtime) = detail.runtime {
                    lines.push(field("Runtime", format!("{} min", runtime)));
                }
                let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
                lines.push(field("Genres", genres.join(", ")));
                lines.push(field(
                    "Rating",
                    format!("{:.1} ({} votes)", detail.vote_average, detail.vote_count),
                ));
                if let Some(homepage) = detail.homepage.as_ref().filter(|h| !h.is_empty()) {
                    lines.push(field("Homepage", homepage.clone()));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(detail.overview.clone()));
            }
            None => {
                lines.push(heading(&movie.title));
                lines.push(Line::from(""));
                lines.push(field("Released", movie.release_date.clone()));
                lines.push(field(
                    "Rating",
                    format!("{:.1} ({} votes)", movie.vote_average, movie.vote_count),
                ));
                if let Some(rating) = movie.rating {
                    lines.push(field("Your rating", format!("{:.1}", rating)));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(movie.overview.clone()));
                lines.push(Line::from(""));
                lines.push(muted("ENTER for full details"));
            }
        }
    } else {
        lines.push(muted("No movies"));
    }

    lines.push(Line::from(""));
    lines.extend(status_line("Rating", &app.media.movie_rating_status));
    lines.extend(status_line("Watchlist", &app.media.movie_watchlist_status));
    lines.extend(status_line("Favorite", &app.media.favorite_status));
    render_preview(frame, lines, preview_area);
}

fn render_tv(frame: &mut Frame, app: &mut App, area: Rect) {
    let (list_area, preview_area) = split_content(area);

    let items: Vec<ListItem> = app
        .tv_shows()
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("★ {:>4.1}  ", s.vote_average),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(s.name.clone()),
                Span::styled(
                    format!(" ({})", year(&s.first_air_date)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let title = list_title("Popular TV", items.len(), app.media.is_loading);
    render_list(frame, items, title, list_area, &mut app.tv_list);

    let mut lines = Vec::new();
    if let Some(show) = app.selected_tv() {
        match app.media.tv_detail.as_ref().filter(|d| d.id == show.id) {
            Some(detail) => {
                lines.push(heading(&detail.name));
                lines.push(Line::from(""));
                lines.push(field("First aired", detail.first_air_date.clone()));
                lines.push(field(
                    "Seasons",
                    format!(
                        "{} ({} episodes)",
                        detail.number_of_seasons, detail.number_of_episodes
                    ),
                ));
                let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
                lines.push(field("Genres", genres.join(", ")));
                lines.push(field(
                    "Rating",
                    format!("{:.1} ({} votes)", detail.vote_average, detail.vote_count),
                ));
                lines.push(Line::from(""));
                lines.push(Line::from(detail.overview.clone()));
            }
            None => {
                lines.push(heading(&show.name));
                lines.push(Line::from(""));
                lines.push(field("First aired", show.first_air_date.clone()));
                lines.push(field(
                    "Rating",
                    format!("{:.1} ({} votes)", show.vote_average, show.vote_count),
                ));
                lines.push(Line::from(""));
                lines.push(Line::from(show.overview.clone()));
                lines.push(Line::from(""));
                lines.push(muted("ENTER for full details"));
            }
        }
    } else {
        lines.push(muted("No shows"));
    }

    lines.push(Line::from(""));
    lines.extend(status_line("Rating", &app.media.tv_rating_status));
    lines.extend(status_line("Watchlist", &app.media.tv_watchlist_status));
    lines.extend(status_line("Favorite", &app.media.favorite_status));
    render_preview(frame, lines, preview_area);
}

fn render_account(frame: &mut Frame, app: &mut App, area: Rect) {
    let (info_area, list_area) = split_content(area);

    let mut lines = Vec::new();
    match (&app.media.session_id, &app.media.account_details) {
        (None, _) => {
            lines.push(heading("Not logged in"));
            lines.push(Line::from(""));
            lines.push(Line::from("Press l to log in to TMDB."));
            lines.push(muted("A browser tab opens for approving the request."));
        }
        (Some(_), Some(account)) => {
            lines.push(heading(&account.username));
            lines.push(Line::from(""));
            if !account.name.is_empty() {
                lines.push(field("Name", account.name.clone()));
            }
            lines.push(field("Account id", account.id.to_string()));
            lines.push(field("Language", account.iso_639_1.clone()));
            lines.push(field("Country", account.iso_3166_1.clone()));
            lines.push(field(
                "Adult",
                if account.include_adult { "shown" } else { "hidden" }.to_string(),
            ));
        }
        (Some(_), None) if app.media.is_guest => {
            lines.push(heading("Guest session"));
            lines.push(Line::from(""));
            lines.push(Line::from("Guests can rate titles and nothing else."));
            lines.push(muted("Press l to log in with a TMDB account"));
        }
        (Some(_), None) => {
            lines.push(heading("Logged in"));
            lines.push(Line::from(""));
            if let Some(id) = app.media.account_id {
                lines.push(field("Account id", id.to_string()));
            }
            lines.push(muted("Press a to load account details"));
        }
    }
    let info = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Account "))
        .wrap(Wrap { trim: true });
    frame.render_widget(info, info_area);

    let items: Vec<ListItem> = app
        .account_movies()
        .iter()
        .map(|m| {
            ListItem::new(Line::from(vec![
                Span::raw(m.title.clone()),
                Span::styled(
                    format!(" ({})", year(&m.release_date)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let label = match app.account_view {
        AccountList::Favorites => "Favorite movies (f)",
        AccountList::Watchlist => "Watchlist (w)",
    };
    let title = list_title(label, items.len(), app.media.is_loading);
    render_list(frame, items, title, list_area, &mut app.account_list);
}

fn render_upload(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        heading("Image upload"),
        Line::from(""),
        Line::from("Press i to choose a file. JPEG, PNG, GIF and WebP are accepted."),
        Line::from(""),
    ];

    if !app.upload_path.is_empty() {
        lines.push(field("File", app.upload_path.clone()));
    }
    if app.media.is_loading {
        lines.push(muted("Uploading..."));
    }
    if let Some(response) = &app.media.upload_response {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            response.message.clone(),
            Style::default().fg(Color::Green),
        )));
        lines.push(field("URL", response.file_url.clone()));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Upload "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_approval_popup(frame: &mut Frame, url: &str, area: Rect) {
    let popup_area = centered_rect(70, 40, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from("Approve the request token in your browser:"),
        Line::from(""),
        Line::from(Span::styled(
            url.to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("ENTER", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" once approved   "),
            Span::styled("ESC", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" to cancel"),
        ]),
    ];

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" TMDB login ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let prompt = |label: &str| {
        vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::Yellow)),
            Span::raw(app.input.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
            Span::styled("  ENTER: submit | ESC: cancel", Style::default().fg(Color::DarkGray)),
        ]
    };

    let status = match app.input_mode {
        InputMode::MovieSearch => prompt("Search movies"),
        InputMode::Rating => prompt("Rating (0.5-10)"),
        InputMode::UploadPath => prompt("Image path"),
        InputMode::NewsSearch => vec![Span::styled(
            "SEARCH | type to search | ENTER: done | ESC: close search",
            Style::default().fg(Color::Yellow),
        )],
        InputMode::Normal => {
            if let Some(error) = app.status_error() {
                vec![Span::styled(error.to_string(), Style::default().fg(Color::Red))]
            } else if let Some(notice) = &app.notice {
                vec![Span::styled(notice.clone(), Style::default().fg(Color::Cyan))]
            } else {
                let hints = match app.tab {
                    Tab::News => "h/l: category | j/k: navigate | /: search | ENTER: open | ?: help | q: quit",
                    Tab::Movies => "j/k: navigate | /: search | ENTER: details | s: rate | w: watchlist | f: favorite | ?: help",
                    Tab::Tv => "j/k: navigate | ENTER: details | s: rate | w: watchlist | f: favorite | ?: help",
                    Tab::Account => "l: log in | a: details | f: favorites | w: watchlist | ?: help",
                    Tab::Upload => "i: choose file | ?: help | q: quit",
                };
                vec![Span::raw(hints)]
            }
        }
    };

    frame.render_widget(Paragraph::new(Line::from(status)), area);
}
