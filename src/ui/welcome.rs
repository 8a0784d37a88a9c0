// ============================================================================
// Écran public
// ============================================================================
// Présentation de l'application et invitation à se connecter
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::{create_layout, key_style, quit_confirmation_line};

/// Dessine l'écran public
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_body(frame, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversor ")
        .title_alignment(Alignment::Center);

    let title = Line::from(Span::styled(
        "Convertisseur de devises BRL → USD / EUR",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(title).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_body(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Bienvenue !",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Convertissez un montant en réais avec les cotations du jour,",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "mises à jour automatiquement toutes les 10 minutes.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Appuyez sur "),
            Span::styled("[Enter]", key_style(Color::Green)),
            Span::raw(" pour vous connecter"),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        quit_confirmation_line()
    } else {
        Line::from(vec![
            Span::styled("[Enter]", key_style(Color::Green)),
            Span::raw(" Se connecter  "),
            Span::styled("[q]", key_style(Color::Yellow)),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
