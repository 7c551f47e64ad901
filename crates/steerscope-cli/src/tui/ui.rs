//! TUI rendering: two panes side by side.
//!
//! ┌──────────────────────────────────────────────┐
//! │  Response Analysis Dashboard                 │
//! ├──────────────────────┬───────────────────────┤
//! │ Baseline Response    │ Steered Response      │
//! │  The  cat  sat  on   │  The  dog  ran  to    │
//! ├──────────────────────┼───────────────────────┤
//! │ Top Neuron Acts      │ Top Neuron Acts       │
//! │  n1   0.9000 ███     │  n7   1.2000 ████     │
//! ├──────────────────────┼───────────────────────┤
//! │ Next Token Probs     │ Next Token Probs      │
//! │  cat  0.7000         │  dog  0.6100          │
//! └──────────────────────┴───────────────────────┘
//!  status
//!  keys

use super::app::App;
use crate::commands::printable_token;
use ratatui::{prelude::*, widgets::*};
use steerscope_core::{DisplayConfig, PaneView, Side, parse_hex_color, signal_extent};

/// Cells reserved for the activation bar column.
const BAR_COLUMNS: usize = 20;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(12),   // panes
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    let view = app.view();

    draw_title(f, rows[0], app);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    for (side, area) in Side::ALL.into_iter().zip(cols.iter()) {
        draw_pane(f, *area, app, view.pane(side));
    }

    draw_status(f, rows[2], app);
    draw_keys(f, rows[3]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let names: Vec<String> = Side::ALL
        .iter()
        .map(|&s| match app.path(s) {
            Some(p) => format!("{s}: {}", p.display()),
            None => format!("{s}: —"),
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(
                " Response Analysis Dashboard ",
                Style::default().bold().fg(Color::Cyan),
            ),
            Span::styled(
                format!(" {} ", names.join("   ")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    let p = Paragraph::new(" Compare Baseline and Steered Response Patterns")
        .style(Style::default().fg(Color::Gray))
        .block(block);
    f.render_widget(p, area);
}

fn draw_pane(f: &mut Frame, area: Rect, app: &App, pane: &PaneView) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30), // token strip
            Constraint::Percentage(40), // activations
            Constraint::Percentage(30), // next tokens
        ])
        .split(area);

    let config = app.config();
    let colors = PaneColors::for_side(config, pane.side);
    let focused = app.focus() == pane.side;

    draw_tokens(f, parts[0], pane, &colors, focused);

    if let Some(err) = &pane.analysis_error {
        let block = colors.block(format!(" {} ", pane.analysis_heading()), false);
        let p = Paragraph::new(format!("analysis unavailable: {err}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(p, parts[1].union(parts[2]));
        return;
    }

    match &pane.analysis {
        Some(_) => {
            draw_signals(f, parts[1], pane, &colors);
            draw_candidates(f, parts[2], pane, config, &colors);
        }
        None => {
            let block = colors.block(format!(" {} ", pane.analysis_heading()), false);
            let hint = if pane.tokens.is_empty() {
                "No trace loaded"
            } else {
                "Use ←/→ to pick a token"
            };
            let p = Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(p, parts[1].union(parts[2]));
        }
    }
}

fn draw_tokens(f: &mut Frame, area: Rect, pane: &PaneView, colors: &PaneColors, focused: bool) {
    let mut spans = Vec::with_capacity(pane.tokens.len() * 2);
    for (i, token) in pane.tokens.iter().enumerate() {
        let style = if pane.selection == Some(i) {
            Style::default().bg(colors.primary).fg(Color::White).bold()
        } else {
            Style::default().fg(colors.primary)
        };
        spans.push(Span::styled(format!("[{}]", printable_token(token)), style));
        spans.push(Span::raw(" "));
    }

    let mut title = vec![Span::styled(
        format!(" ● {} ", pane.title()),
        Style::default().fg(colors.primary).bold(),
    )];
    if let Some(token) = &pane.selected_token {
        title.push(Span::raw(format!(
            "(Selected: \"{}\") ",
            printable_token(token)
        )));
    }

    let p = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: false })
        .block(colors.block(Line::from(title), focused));
    f.render_widget(p, area);
}

fn draw_signals(f: &mut Frame, area: Rect, pane: &PaneView, colors: &PaneColors) {
    let Some(analysis) = &pane.analysis else {
        return;
    };
    let extent = signal_extent(&analysis.signals);

    let rows: Vec<Row> = analysis
        .signals
        .iter()
        .map(|bar| {
            let filled = if extent > 0.0 && bar.value.is_finite() {
                ((bar.value.abs() / extent) * BAR_COLUMNS as f64).round() as usize
            } else {
                0
            };
            let bar_color = if bar.value < 0.0 {
                colors.medium
            } else {
                colors.primary
            };
            Row::new(vec![
                Cell::from(bar.label.clone()),
                Cell::from(format!("{:>10.4}", bar.value)),
                Cell::from(Span::styled(
                    "█".repeat(filled),
                    Style::default().fg(bar_color),
                )),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(10),                       // neuron
            Constraint::Length(11),                    // activation
            Constraint::Length(BAR_COLUMNS as u16 + 1), // bar
        ],
    )
    .block(colors.block(
        format!(" {} · Top Neuron Activations ", pane.analysis_heading()),
        false,
    ));
    f.render_widget(table, area);
}

fn draw_candidates(
    f: &mut Frame,
    area: Rect,
    pane: &PaneView,
    config: &DisplayConfig,
    colors: &PaneColors,
) {
    let Some(analysis) = &pane.analysis else {
        return;
    };

    let rows: Vec<Row> = analysis
        .candidates
        .iter()
        .map(|row| {
            Row::new(vec![
                format!("\"{}\"", printable_token(&row.candidate)),
                config.format_probability(row.probability),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(12), Constraint::Length(14)])
        .header(
            Row::new(vec!["Token", "Probability"]).style(Style::default().bold().fg(colors.primary)),
        )
        .block(colors.block(" Next Token Probabilities ".to_string(), false));
    f.render_widget(table, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match app.status() {
        Some(s) if s.is_error => (s.message.as_str(), Style::default().fg(Color::Red)),
        Some(s) => (s.message.as_str(), Style::default().fg(Color::Green)),
        None => ("", Style::default()),
    };
    f.render_widget(Paragraph::new(format!(" {text}")).style(style), area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(
        " tab: switch pane   ←/→: select token   home/end   esc: clear   r/R: reload   q: quit",
    )
    .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

// ---------------------------------------------------------------------------
// Theme colors
// ---------------------------------------------------------------------------

struct PaneColors {
    primary: Color,
    medium: Color,
    border: Color,
}

impl PaneColors {
    fn for_side(config: &DisplayConfig, side: Side) -> Self {
        let theme = config.theme(side);
        Self {
            primary: hex_color(&theme.primary),
            medium: hex_color(&theme.medium),
            border: hex_color(&theme.border),
        }
    }

    fn block<'a>(&self, title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
        let border = if focused {
            Style::default().fg(self.primary).bold()
        } else {
            Style::default().fg(self.border)
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
    }
}

fn hex_color(hex: &str) -> Color {
    parse_hex_color(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Reset)
}
