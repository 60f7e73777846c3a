pub mod runner;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Overlay, StatusKind, View};
use crate::editor::FormField;
use crate::locale::format_duration;
use crate::storage::KeyValueStore;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

impl<S: KeyValueStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title bar
                Constraint::Length(1), // padding
                Constraint::Min(1),    // body
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        render_title_bar(self, chunks[0], buf);

        match self.view {
            View::List => render_list(self, chunks[2], buf),
            View::Form => render_form(self, chunks[2], buf),
            View::Runner => runner::render_runner(self, chunks[2], buf),
        }

        if let Some(status) = &self.status {
            let color = match status.kind {
                StatusKind::Info => Color::Green,
                StatusKind::Error => Color::Red,
            };
            Paragraph::new(Span::styled(
                status.text.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .render(chunks[3], buf);
        }

        Paragraph::new(Span::styled(
            legend(self),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[4], buf);

        if let Some(overlay) = &self.overlay {
            render_overlay(self, overlay, area, buf);
        }
    }
}

/// Cut `text` to at most `max` terminal columns, marking the cut with `…`.
/// Wide (CJK) characters count as two columns.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// A `width` x `height` box centered in `area`, shrunk to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_title_bar<S: KeyValueStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    Paragraph::new(Span::styled(app.t("appTitle"), bold.fg(Color::Cyan))).render(area, buf);

    Paragraph::new(Line::from(vec![
        Span::styled(format!("{}: ", app.t("language")), Style::default().fg(Color::Gray)),
        Span::styled(app.t(app.locale.name_key()), bold),
    ]))
    .alignment(Alignment::Right)
    .render(area, buf);
}

fn legend<S: KeyValueStore>(app: &App<S>) -> String {
    match app.view {
        View::List => format!(
            "(enter) {} / (n) {} / (e) {} / (d) {} / (J/K) {}/{} / (x) {} / (i) {} / (l) {} / (q) {}",
            app.t("run"),
            app.t("newMenu"),
            app.t("edit"),
            app.t("delete"),
            app.t("moveDown"),
            app.t("moveUp"),
            app.t("exportMenu"),
            app.t("importMenu"),
            app.t("language"),
            app.t("quit"),
        ),
        View::Form => format!(
            "(tab) {} / (ctrl+n) {} / (ctrl+d) {} / (ctrl+↑/↓) {}/{} / (ctrl+s) {} / (esc) {}",
            app.t("next"),
            app.t("addItem"),
            app.t("delete"),
            app.t("moveUp"),
            app.t("moveDown"),
            app.t("save"),
            app.t("cancelDelete"),
        ),
        View::Runner => format!(
            "(space) {}/{} / (c) {} / (s) {} / (a) {} / (+/-) {} / (r) {} / (e) {} / (esc) {}",
            app.t("start"),
            app.t("pause"),
            app.t("complete"),
            app.t("skip"),
            app.t("autoStart"),
            app.t("interval"),
            app.t("reset"),
            app.t("edit"),
            app.t("backToList"),
        ),
    }
}

fn render_list<S: KeyValueStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    Paragraph::new(Span::styled(app.t("menuTitle"), bold.add_modifier(Modifier::UNDERLINED)))
        .render(chunks[0], buf);

    let menus = app.store.menus();
    if menus.is_empty() {
        Paragraph::new(Span::styled(app.t("noMenus"), dim.add_modifier(Modifier::ITALIC)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);
        return;
    }

    let width = usize::from(chunks[1].width);
    let visible = usize::from(chunks[1].height).max(1);
    let offset = app.list_cursor.saturating_sub(visible - 1);

    let lines: Vec<Line> = menus
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, menu)| {
            let selected = idx == app.list_cursor;
            let current = app.store.current_id() == Some(menu.id.as_str());

            let marker = if selected { "▶ " } else { "  " };
            let summary = format!(
                "  {} {} · {}",
                menu.items.len(),
                app.t("items"),
                format_duration(menu.total_duration(), app.locale)
            );
            let title_width = width.saturating_sub(marker.width() + summary.width() + 2);

            let title_style = if selected {
                bold.fg(Color::Yellow)
            } else {
                Style::default()
            };

            Line::from(vec![
                Span::styled(marker, title_style),
                Span::styled(truncate_to_width(&menu.title, title_width), title_style),
                Span::styled(if current { " *" } else { "" }, Style::default().fg(Color::Cyan)),
                Span::styled(summary, dim),
            ])
        })
        .collect();

    Paragraph::new(lines).render(chunks[1], buf);
}

fn render_form<S: KeyValueStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(Color::Gray);
    let focus_style = bold.fg(Color::Yellow);
    let placeholder_style = Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC);
    let width = usize::from(area.width);

    let mut lines = Vec::new();
    let mut focused_line = 0;

    let heading = if form.draft.is_editing() {
        app.t("edit")
    } else {
        app.t("registerMenu")
    };
    lines.push(Line::from(Span::styled(
        heading,
        bold.add_modifier(Modifier::UNDERLINED),
    )));
    lines.push(Line::default());

    let field_line = |field: FormField, label: &str, placeholder: &str, indent: &str| {
        let focused = form.is_focused(field);
        let prefix = format!("{indent}{label}: ");
        let room = width.saturating_sub(prefix.width() + 1);
        let text = form.text(field);

        let value = if focused {
            Span::styled(format!("{}_", truncate_to_width(text, room)), focus_style)
        } else if text.is_empty() {
            Span::styled(truncate_to_width(placeholder, room), placeholder_style)
        } else {
            Span::raw(truncate_to_width(text, room))
        };

        Line::from(vec![
            Span::styled(prefix, if focused { focus_style } else { label_style }),
            value,
        ])
    };

    for (field, label, placeholder) in [
        (FormField::Title, "menuTitleLabel", "menuTitlePlaceholder"),
        (FormField::Description, "menuDescription", "menuDescriptionPlaceholder"),
    ] {
        if form.is_focused(field) {
            focused_line = lines.len();
        }
        lines.push(field_line(field, app.t(label), app.t(placeholder), ""));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(app.t("menuItems"), bold)));

    for idx in 0..form.draft.items.len() {
        lines.push(Line::from(Span::styled(
            format!("{} {}", app.t("item"), idx + 1),
            bold.fg(Color::Cyan),
        )));
        for (field, label, placeholder) in [
            (FormField::ItemName(idx), "itemName", "itemNamePlaceholder"),
            (
                FormField::ItemDescription(idx),
                "itemDescription",
                "itemDescriptionPlaceholder",
            ),
            (FormField::ItemMinutes(idx), "itemDuration", ""),
        ] {
            if form.is_focused(field) {
                focused_line = lines.len();
            }
            lines.push(field_line(field, app.t(label), app.t(placeholder), "  "));
        }
    }

    // keep the focused field on screen
    let height = usize::from(area.height).max(1);
    let scroll = focused_line.saturating_sub(height - 1);
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

    Paragraph::new(lines).scroll((scroll, 0)).render(area, buf);
}

fn render_overlay<S: KeyValueStore>(app: &App<S>, overlay: &Overlay, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let popup = centered_rect(area.width.saturating_sub(8).min(60), 7, area);

    let (title, lines) = match overlay {
        Overlay::ConfirmDelete { menu_id } => {
            let menu_title = app
                .store
                .get(menu_id)
                .map(|m| m.title.as_str())
                .unwrap_or_default();
            (
                app.t("deleteMenu"),
                vec![
                    Line::from(app.t("confirmDelete")),
                    Line::from(Span::styled(
                        truncate_to_width(menu_title, usize::from(popup.width.saturating_sub(4))),
                        bold.fg(Color::Yellow),
                    )),
                    Line::default(),
                    Line::from(format!(
                        "(y) {}   (n) {}",
                        app.t("confirmButton"),
                        app.t("cancelDelete")
                    )),
                ],
            )
        }
        Overlay::ImportPrompt { path } => (
            app.t("importMenu"),
            vec![
                Line::from(app.t("importPrompt")),
                Line::from(Span::styled(format!("{path}_"), bold.fg(Color::Yellow))),
                Line::default(),
                Line::from(format!(
                    "(enter) {}   (esc) {}",
                    app.t("confirmButton"),
                    app.t("cancelDelete")
                )),
            ],
        ),
    };

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(format!(" {title} "), bold)),
        )
        .wrap(Wrap { trim: false })
        .render(popup, buf);
}
