//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::client::state::{ClientApp, ClientState};

use super::{exam, exam_list, login, results};

pub(super) const TITLE: &str = "EXAM CLIENT";

/// Render the client UI based on current state.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.state {
        ClientState::Login => login::render(frame, area, app),
        ClientState::ExamList => exam_list::render(frame, area, app),
        ClientState::Results => results::render(frame, area, app),
        ClientState::LoadingExam { exam_id } => render_message(
            frame,
            area,
            &format!("Loading exam {}...", exam_id),
            Color::Yellow,
            None,
        ),
        ClientState::Exam => exam::render(frame, area, app),
        ClientState::Submitting { message } => {
            render_message(frame, area, message, Color::Yellow, None)
        }
        ClientState::Notice { message } => render_message(
            frame,
            area,
            message,
            Color::Green,
            Some("Press any key to return to your exams"),
        ),
    }
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color, hint: Option<&str>) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(9),
        Constraint::Percentage(40),
    ])
    .split(area);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(color).bold())),
        Line::from(""),
        Line::from(""),
    ];

    if let Some(hint) = hint {
        content.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, chunks[1]);
}
