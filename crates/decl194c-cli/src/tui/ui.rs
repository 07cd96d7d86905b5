use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use decl194c_core::{BlockKind, Declaration, Field};

use crate::tui::state::{App, StatusKind};

pub const FOOTER_HEIGHT: u16 = 1;
pub const FORM_WIDTH_PERCENT: u16 = 45;

const HELP: &str = "↑/↓ field · ←/→ capacity · Enter newline · Ctrl+E export · Ctrl+P print · Ctrl+T preview · Esc quit";

pub fn draw_ui(frame: &mut ratatui::Frame, app: &mut App) {
    let size = frame.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
        .split(size);

    if app.show_preview {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(FORM_WIDTH_PERCENT),
                Constraint::Percentage(100 - FORM_WIDTH_PERCENT),
            ])
            .split(rows[0]);
        draw_form(frame, app, columns[0]);
        draw_preview(frame, app, columns[1]);
    } else {
        draw_form(frame, app, rows[0]);
    }

    draw_footer(frame, app, rows[1]);
}

fn draw_form(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let (lines, selected_rows) = form_lines(app);
    let visible = area.height.saturating_sub(2);
    app.keep_form_in_view(selected_rows.0, selected_rows.1, visible);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Declaration details ");
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.form_scroll, 0));
    frame.render_widget(paragraph, area);
}

// Form rows plus the first and last row of the selected field.
fn form_lines(app: &App) -> (Vec<Line<'static>>, (u16, u16)) {
    let selected = app.selected_field();
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut selected_rows = (0, 0);

    for field in Field::ALL {
        let is_selected = field == selected;
        let first_row = lines.len();
        let marker = if is_selected { " ► " } else { "   " };
        let mut label = vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(
                field.label(),
                if is_selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                },
            ),
        ];
        if field.is_required() {
            label.push(Span::styled(" *", Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(label));

        let value = display_value(app, field);
        let value_lines: Vec<&str> = value.split('\n').collect();
        let last = value_lines.len() - 1;
        for (idx, part) in value_lines.iter().enumerate() {
            let mut spans = vec![Span::raw("     "), Span::raw(part.to_string())];
            if is_selected && idx == last {
                spans.push(Span::styled(
                    "▏",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::SLOW_BLINK),
                ));
            }
            lines.push(Line::from(spans));
        }

        if let Some(message) = app.field_error(field) {
            lines.push(Line::from(vec![
                Span::raw("     "),
                Span::styled(message.to_string(), Style::default().fg(Color::Red)),
            ]));
        } else if is_selected {
            lines.push(Line::from(vec![
                Span::raw("     "),
                Span::styled(field.hint(), Style::default().fg(Color::DarkGray)),
            ]));
        }
        if is_selected {
            selected_rows = (to_row(first_row), to_row(lines.len() - 1));
        }
        lines.push(Line::from(""));
    }

    (lines, selected_rows)
}

fn to_row(idx: usize) -> u16 {
    u16::try_from(idx).unwrap_or(u16::MAX)
}

fn display_value(app: &App, field: Field) -> String {
    match field {
        Field::DeclarantCapacity => match app.record.declarant_capacity {
            Some(capacity) => format!("◂ {capacity} ▸"),
            None => "◂ Select Capacity ▸".to_string(),
        },
        _ => app.record.value(field),
    }
}

fn draw_preview(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let lines = preview_lines(&app.preview(), inner_width);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Preview ");
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn preview_lines(declaration: &Declaration, width: usize) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let signature_indent = " ".repeat(width / 2);
    let mut lines = Vec::new();

    for block in &declaration.blocks {
        for text in &block.lines {
            let line = match block.kind {
                BlockKind::Title => {
                    Line::from(Span::styled(text.clone(), bold)).alignment(Alignment::Center)
                }
                BlockKind::Heading => Line::from(Span::styled(text.clone(), bold)),
                BlockKind::Signature => {
                    Line::from(format!("{signature_indent}{text}"))
                }
                _ => Line::from(text.clone()),
            };
            lines.push(line);
        }
        lines.push(Line::from(""));
    }
    lines
}

fn draw_footer(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => Color::DarkGray,
                StatusKind::Success => Color::Green,
                StatusKind::Error => Color::Red,
            };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(Paragraph::new(line), area);
}
