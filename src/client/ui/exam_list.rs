//! Exam list screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::ClientApp;
use crate::models::{format_countdown, ExamStatus, ExamSummary};

use super::render::TITLE;

/// Render the list of assigned exams.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Min(6),    // Exams
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(
            format!("Your exams on {}", app.server),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    render_exams(frame, chunks[1], app);

    let controls = Paragraph::new("j/k or arrows to select  ·  Enter to start  ·  v results  ·  r refresh  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[2]);
}

fn render_exams(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let list = &app.exams;

    let lines: Vec<Line> = if list.loading && list.exams.is_empty() {
        vec![Line::from(Span::styled(
            "Loading exams...",
            Style::default().fg(Color::Yellow),
        ))]
    } else if let Some(err) = &list.error {
        vec![Line::from(Span::styled(
            format!("Failed to fetch exams: {}", err),
            Style::default().fg(Color::Red),
        ))]
    } else if list.exams.is_empty() {
        vec![Line::from(Span::styled(
            "No exams assigned yet.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        list.exams
            .iter()
            .enumerate()
            .map(|(i, exam)| exam_line(exam, i == list.selected, app))
            .collect()
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Exams ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn exam_line<'a>(exam: &'a ExamSummary, selected: bool, app: &ClientApp) -> Line<'a> {
    let status = exam.status_at(app.now);
    let status_color = match status {
        ExamStatus::Live => Color::Green,
        ExamStatus::Upcoming => Color::Yellow,
        ExamStatus::Submitted => Color::Blue,
        ExamStatus::Expired => Color::DarkGray,
    };

    let style = if selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };

    let detail = match (status, exam.countdown_at(app.now)) {
        (ExamStatus::Upcoming, Some(left)) => format!("starts in {}", format_countdown(left)),
        (ExamStatus::Live, _) => exam
            .duration
            .map(|minutes| format!("{} min", minutes))
            .unwrap_or_default(),
        _ => String::new(),
    };

    let mut spans = vec![
        Span::styled(if selected { "> " } else { "  " }, style),
        Span::styled(format!("{:<10}", status.label()), Style::default().fg(status_color)),
        Span::styled(exam.exam_name.as_str(), style),
    ];
    if let Some(subject) = &exam.subject_name {
        spans.push(Span::styled(
            format!("  ({})", subject),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !detail.is_empty() {
        spans.push(Span::styled(
            format!("  {}", detail),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}
