//! Exam screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{ClientApp, ExamView};
use crate::models::{Answer, OptionLabel, Question, QuestionKind};
use crate::session::format_remaining;

/// Render the exam screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let Some(view) = &app.exam else {
        return;
    };

    let question = view.controller.current_question();
    let answer = view
        .controller
        .session()
        .answer(&question.id)
        .cloned()
        .unwrap_or_default();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(3), // Navigation
        Constraint::Length(5), // Prompt
        Constraint::Min(8),    // Answer
        Constraint::Length(1), // Status
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], view);
    render_navigation(frame, chunks[1], view);
    render_prompt(frame, chunks[2], question);

    match &question.kind {
        QuestionKind::SingleChoice { options } => {
            render_options(frame, chunks[3], options, answer.selected)
        }
        QuestionKind::FreeText => render_editor(frame, chunks[3], " Answer ", &answer.text, view.editing),
        QuestionKind::Code { language } => render_code(frame, chunks[3], view, language, &answer),
    }

    render_status(frame, chunks[4], view);
    render_controls(frame, chunks[5], view, question);
}

fn render_header(frame: &mut Frame, area: Rect, view: &ExamView) {
    let session = view.controller.session();
    let timer = format_remaining(view.controller.remaining().unwrap_or(0));
    let timer_style = match view.controller.remaining() {
        Some(left) if left <= 60 => Style::default().fg(Color::Red).bold(),
        Some(_) => Style::default().fg(Color::Green).bold(),
        None => Style::default().fg(Color::DarkGray),
    };

    let halves = Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Exam {}", view.controller.exam_id()),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!(
                "  ·  Question {} of {}  ·  {} answered",
                session.cursor() + 1,
                session.len(),
                session.answers().answered_count()
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    frame.render_widget(title, halves[0]);

    let clock = Paragraph::new(Span::styled(format!("Time left {}", timer), timer_style))
        .alignment(Alignment::Right);
    frame.render_widget(clock, halves[1]);
}

fn render_navigation(frame: &mut Frame, area: Rect, view: &ExamView) {
    let session = view.controller.session();

    let spans: Vec<Span> = session
        .questions()
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let style = if i == session.cursor() {
                Style::default().fg(Color::Black).bg(Color::Cyan).bold()
            } else if session.answers().is_answered(&question.id) {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!(" {} ", i + 1), style)
        })
        .collect();

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Questions ")
            .title_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(widget, area);
}

fn render_prompt(frame: &mut Frame, area: Rect, question: &Question) {
    let widget = Paragraph::new(question.prompt.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, options: &[String; 4], selected: Option<OptionLabel>) {
    let lines: Vec<Line> = OptionLabel::ALL
        .iter()
        .zip(options)
        .map(|(&label, text)| {
            let is_selected = selected == Some(label);
            let prefix = if is_selected { "> " } else { "  " };

            let style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("{}) ", label), style),
                Span::styled(text.as_str(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_editor(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let mut text = value.to_string();
    if focused {
        text.push('_');
    }

    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title.to_string())
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_code(frame: &mut Frame, area: Rect, view: &ExamView, language: &str, answer: &Answer) {
    let halves = Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_editor(
        frame,
        halves[0],
        &format!(" Code ({}) ", language),
        &answer.code,
        view.editing,
    );

    let current = &view.controller.current_question().id;
    let (output, color) = if view.running.as_ref() == Some(current) {
        ("Running...".to_string(), Color::Yellow)
    } else if let Some((_, message)) = view.run_error.as_ref().filter(|(id, _)| id == current) {
        (message.clone(), Color::Red)
    } else if answer.output.is_empty() {
        ("Run your code to see the output.".to_string(), Color::DarkGray)
    } else {
        (answer.output.clone(), Color::Green)
    };

    let widget = Paragraph::new(output)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Output ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, halves[1]);
}

fn render_status(frame: &mut Frame, area: Rect, view: &ExamView) {
    let line = if view.confirm_submit {
        Span::styled(
            "Submit the exam now? [y] yes  ·  [n] no",
            Style::default().fg(Color::Yellow).bold(),
        )
    } else if let Some(status) = &view.status {
        Span::styled(status.as_str(), Style::default().fg(Color::Red))
    } else {
        Span::raw("")
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect, view: &ExamView, question: &Question) {
    let controls = if view.editing {
        match question.kind {
            QuestionKind::Code { .. } => "type to edit  ·  Esc done  ·  F5 run",
            _ => "type to edit  ·  Esc done",
        }
    } else {
        match question.kind {
            QuestionKind::SingleChoice { .. } => {
                "a-d choose  ·  ←/→ or 1-9 move  ·  S submit  ·  q quit"
            }
            QuestionKind::FreeText => "e edit  ·  ←/→ or 1-9 move  ·  S submit  ·  q quit",
            QuestionKind::Code { .. } => {
                "e edit  ·  F5 run  ·  ←/→ or 1-9 move  ·  S submit  ·  q quit"
            }
        }
    };

    let widget = Paragraph::new(controls)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}
