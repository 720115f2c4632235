//! Results screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::ClientApp;
use crate::models::ResultSummary;

use super::render::TITLE;

/// Render the student's past attempts with their marks.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Min(6),    // Results
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let subtitle = match app.results.average_percentage() {
        Some(average) => format!("Academic performance · average {:.1}%", average),
        None => "Academic performance".to_string(),
    };
    let title = Paragraph::new(vec![
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(subtitle, Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    render_results(frame, chunks[1], app);

    let controls = Paragraph::new("j/k or arrows to select  ·  r refresh  ·  Esc back  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[2]);
}

fn render_results(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let view = &app.results;

    let lines: Vec<Line> = if view.loading && view.results.is_empty() {
        vec![Line::from(Span::styled(
            "Loading results...",
            Style::default().fg(Color::Yellow),
        ))]
    } else if let Some(err) = &view.error {
        vec![Line::from(Span::styled(
            format!("Failed to fetch results: {}", err),
            Style::default().fg(Color::Red),
        ))]
    } else if view.results.is_empty() {
        vec![Line::from(Span::styled(
            "No results available yet.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        view.results
            .iter()
            .enumerate()
            .map(|(i, result)| result_line(result, i == view.selected))
            .collect()
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Results ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn result_line(result: &ResultSummary, selected: bool) -> Line<'_> {
    let style = if selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };

    let (status, status_color) = if result.is_evaluated() {
        ("Published", Color::Green)
    } else {
        ("Reviewing", Color::Yellow)
    };
    let score = match result.score() {
        Some((obtained, total)) => format!("{} / {}", obtained, total),
        None => "--".to_string(),
    };
    let percentage = match result.percentage() {
        Some(percentage) => format!("{:.1}%", percentage),
        None => "Pending".to_string(),
    };

    Line::from(vec![
        Span::styled(if selected { "> " } else { "  " }, style),
        Span::styled(format!("{:<11}", status), Style::default().fg(status_color)),
        Span::styled(result.exam_name.as_str(), style),
        Span::styled(
            format!("  {}", result.reference()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("  {}", score), Style::default().fg(Color::White)),
        Span::styled(format!("  {}", percentage), Style::default().fg(Color::Cyan)),
    ])
}
