//! Login screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::state::{ClientApp, LoginField};

use super::render::TITLE;

/// Render the login screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let form = &app.login;

    let chunks = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(13),
        Constraint::Percentage(30),
    ])
    .split(area);

    let field_style = |field: LoginField| {
        if form.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        }
    };
    let cursor = |field: LoginField| if form.field == field { "_" } else { "" };

    let masked = "*".repeat(form.password.chars().count());

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("Server {}", app.server),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Email:    ", Style::default().fg(Color::White)),
            Span::styled(form.email.as_str(), field_style(LoginField::Email)),
            Span::styled(cursor(LoginField::Email), field_style(LoginField::Email)),
        ]),
        Line::from(vec![
            Span::styled("Password: ", Style::default().fg(Color::White)),
            Span::styled(masked, field_style(LoginField::Password)),
            Span::styled(cursor(LoginField::Password), field_style(LoginField::Password)),
        ]),
        Line::from(""),
    ];

    if form.pending {
        content.push(Line::from(Span::styled(
            "Signing in...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(err) = &form.error {
        content.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        content.push(Line::from(""));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "[Tab] switch field  ·  [Enter] sign in  ·  [Esc] quit",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
