use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Widget, Wrap},
};

use crate::app::App;
use crate::locale::{format_duration, Locale};
use crate::menu::TrainingMenuItem;
use crate::session::{SessionPhase, SessionRunner};
use crate::storage::KeyValueStore;
use crate::timer::{format_mmss, CountdownTimer, TimerState};

use super::truncate_to_width;

/// Status glyph of one item timer
fn state_symbol(timer: &CountdownTimer) -> (&'static str, Color) {
    match timer.state() {
        TimerState::Completed => ("✓", Color::Green),
        TimerState::Running => ("▶", Color::Yellow),
        TimerState::Paused => ("‖", Color::Magenta),
        TimerState::Idle => (" ", Color::Reset),
    }
}

/// Pure presenter for a single item row
pub fn present_row(
    position: usize,
    item: &TrainingMenuItem,
    timer: Option<&CountdownTimer>,
    active: bool,
    name_width: usize,
) -> Row<'static> {
    let (symbol, color) = timer.map_or((" ", Color::Reset), state_symbol);
    let time = timer.map_or_else(|| format_mmss(item.duration_in_seconds), CountdownTimer::format);

    let row = Row::new(vec![
        Cell::from(format!("{position}.")),
        Cell::from(truncate_to_width(&item.name, name_width)),
        Cell::from(time),
        Cell::from(Span::styled(symbol, Style::default().fg(color))),
    ]);

    if active {
        row.style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        row
    }
}

pub fn render_runner<S: KeyValueStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.session.as_ref() else {
        Paragraph::new(app.t("noMenuSelected"))
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Length(1), // settings
            Constraint::Length(1), // padding
            Constraint::Min(3),    // body
            Constraint::Length(1), // progress
        ])
        .split(area);

    render_header(app, session, chunks[0], buf);
    render_settings(app, session, chunks[1], buf);

    match session.phase() {
        SessionPhase::Item => render_items(app.locale, session, chunks[3], buf),
        SessionPhase::Interval => render_interval(app.locale, session, chunks[3], buf),
        SessionPhase::Completed => render_completed(app.locale, chunks[3], buf),
    }

    render_progress(session, chunks[4], buf);
}

fn render_header<S: KeyValueStore>(
    app: &App<S>,
    session: &SessionRunner,
    area: Rect,
    buf: &mut Buffer,
) {
    let menu = session.menu();
    let width = usize::from(area.width);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let label = Style::default().fg(Color::Gray);

    let lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&menu.title, width),
            bold.fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            truncate_to_width(&menu.description, width),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(vec![
            Span::styled(format!("{}: ", app.t("totalMenuItems")), label),
            Span::styled(menu.items.len().to_string(), bold),
            Span::raw("   "),
            Span::styled(format!("{}: ", app.t("totalTime")), label),
            Span::styled(format_duration(session.total_duration(), app.locale), bold),
        ]),
    ];

    Paragraph::new(lines).render(area, buf);
}

fn render_settings<S: KeyValueStore>(
    app: &App<S>,
    session: &SessionRunner,
    area: Rect,
    buf: &mut Buffer,
) {
    let config = session.config();
    let label = Style::default().fg(Color::Gray);
    let (toggle, color) = if config.auto_start {
        (app.t("on"), Color::Green)
    } else {
        (app.t("off"), Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(format!("(a) {}: ", app.t("autoStart")), label),
        Span::styled(toggle, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ];
    // the interval length only applies with auto start
    if config.auto_start {
        spans.push(Span::styled(format!("   (+/-) {}: ", app.t("interval")), label));
        spans.push(Span::styled(
            config.interval_secs.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    Paragraph::new(Line::from(spans)).render(area, buf);
}

fn render_items(locale: Locale, session: &SessionRunner, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    if let (Some(item), Some(timer)) = (
        session.active_item(),
        session.item_timer(session.active_index()),
    ) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let (action, hint) = if timer.is_running() {
            (locale.t("pause"), Color::Magenta)
        } else {
            (locale.t("start"), Color::Green)
        };
        let inner_width = usize::from(chunks[0].width.saturating_sub(2));

        let pending = if session.has_pending_start() { " …" } else { "" };
        let lines = vec![
            Line::from(vec![
                Span::styled(timer.format(), bold.fg(Color::Yellow)),
                Span::raw(pending),
                Span::raw("   "),
                Span::styled(format!("(space) {action}"), Style::default().fg(hint)),
                Span::raw("  "),
                Span::styled(
                    format!("(c) {}", locale.t("complete")),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(Span::styled(
                truncate_to_width(&item.description, inner_width),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(
                        format!(" {} ", truncate_to_width(&item.name, inner_width)),
                        bold,
                    )),
            )
            .render(chunks[0], buf);
    }

    let name_width = usize::from(chunks[1].width.saturating_sub(16));
    let rows: Vec<Row> = session
        .menu()
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            present_row(
                idx + 1,
                item,
                session.item_timer(idx),
                idx == session.active_index(),
                name_width,
            )
        })
        .collect();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from(locale.t("items")),
        Cell::from(locale.t("time")),
        Cell::from(""),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

    Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(2),
        ],
    )
    .header(header)
    .render(chunks[1], buf);
}

fn render_interval(locale: Locale, session: &SessionRunner, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let width = usize::from(area.width);

    let mut lines = vec![
        Line::from(Span::styled(locale.t("intervalTitle"), bold.fg(Color::Cyan))),
        Line::from(Span::styled(
            session.interval_timer().format(),
            bold.fg(Color::Yellow),
        )),
        Line::from(locale.t("prepareNextMenu")),
        Line::default(),
    ];

    if let Some(next) = session.next_item() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", locale.t("nextMenu")), Style::default().fg(Color::Gray)),
            Span::styled(truncate_to_width(&next.name, width), bold),
        ]));
        if !next.description.is_empty() {
            lines.push(Line::from(Span::styled(
                truncate_to_width(&next.description, width),
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", locale.t("time")), Style::default().fg(Color::Gray)),
            Span::raw(format_mmss(next.duration_in_seconds)),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("(s) {}", locale.t("skip")),
        Style::default().fg(Color::Cyan),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_completed(locale: Locale, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            locale.t("completed"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(locale.t("congratsMessage")),
        Line::default(),
        Line::from(Span::styled(
            format!("(enter) {}", locale.t("trainAgain")),
            Style::default().fg(Color::Cyan),
        )),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_progress(session: &SessionRunner, area: Rect, buf: &mut Buffer) {
    let (position, total) = session.progress();
    let done = if session.state().completed {
        total
    } else {
        session.active_index()
    };
    let ratio = if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    };

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{position} / {total}"))
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, secs: u32) -> TrainingMenuItem {
        TrainingMenuItem {
            id: name.into(),
            name: name.into(),
            description: String::new(),
            duration_in_seconds: secs,
        }
    }

    #[test]
    fn rows_fall_back_to_item_duration() {
        let rows = vec![
            present_row(1, &item("Tracking", 90), None, true, 20),
            present_row(2, &item("Flicks", 600), None, false, 20),
        ];
        let area = Rect::new(0, 0, 40, 3);
        let mut buffer = Buffer::empty(area);
        Table::new(rows, [Constraint::Length(4), Constraint::Min(8), Constraint::Length(6)])
            .render(area, &mut buffer);

        let rendered = buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(rendered.contains("Tracking"));
        assert!(rendered.contains("1:30"));
        assert!(rendered.contains("10:00"));
    }

    #[test]
    fn state_symbols_follow_timer_state() {
        let mut timer = CountdownTimer::new(3);
        assert_eq!(state_symbol(&timer).0, " ");
        timer.start();
        assert_eq!(state_symbol(&timer).0, "▶");
        timer.pause();
        assert_eq!(state_symbol(&timer).0, "‖");
        timer.finish();
        assert_eq!(state_symbol(&timer).0, "✓");
    }
}
