// ============================================================================
// Écran de conversion
// ============================================================================
// Affiche l'utilisateur connecté, les cotations courantes, le champ de
// saisie du montant BRL et le résultat de la dernière conversion
//
// CONCEPTS RATATUI :
// 1. Layout imbriqué : le contenu est redécoupé en trois blocs
// 2. Span : plusieurs styles sur une même ligne
// ============================================================================

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{format_amount, Currency, RateTable};
use crate::ui::{create_layout, key_style, quit_confirmation_line};

/// Dessine l'écran de conversion
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

/// Header : nom de l'utilisateur connecté
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversor ")
        .title_alignment(Alignment::Center);

    let user = app.display_name().unwrap_or("utilisateur");
    let line = Line::from(vec![
        Span::raw("Bonjour, "),
        Span::styled(
            user.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Contenu : cotations, saisie, résultat
fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Cotations
            Constraint::Length(3), // Saisie
            Constraint::Min(0),    // Résultat
        ])
        .split(area);

    render_rates(frame, app, chunks[0]);
    render_input(frame, app, chunks[1]);
    render_result(frame, app, chunks[2]);
}

fn render_rates(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.is_loading() {
        " Cotations (mise à jour...) "
    } else {
        " Cotations "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let lines = match &app.rates {
        Some(table) => rate_lines(table),
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "Chargement des cotations...",
                Style::default().fg(Color::Gray),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Une ligne par devise cible, puis l'heure de la dernière mise à jour
fn rate_lines(table: &RateTable) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Currency::TARGETS
        .iter()
        .map(|&currency| {
            let value = table
                .rate(currency)
                .map(format_amount)
                .unwrap_or_else(|| "N/A".to_string());

            Line::from(vec![
                Span::raw(format!(" 1 {} = ", table.base.code())),
                Span::styled(
                    format!("{} {}", currency.symbol(), value),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  ({})", currency.code()), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let updated = table.fetched_at.with_timezone(&Local).format("%H:%M:%S");
    lines.push(Line::from(Span::styled(
        format!(" Mis à jour à {}", updated),
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    // Vert quand le champ a le focus
    let border = if app.input_focused { Color::Green } else { Color::Cyan };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Montant (BRL) ");

    let mut spans = vec![
        Span::styled(
            format!("{} ", Currency::Brl.symbol()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.clone(), Style::default().fg(Color::White)),
    ];
    if app.input_focused {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversion ");

    let lines = match &app.conversion {
        Some(result) => {
            let mut lines = vec![Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    format!("{} {}", Currency::Brl.symbol(), format_amount(result.amount_brl)),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ])];
            lines.extend(Currency::TARGETS.iter().map(|&currency| {
                Line::from(vec![
                    Span::raw(" = "),
                    Span::styled(
                        format!("{} {}", currency.symbol(), format_amount(result.amount(currency))),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                ])
            }));
            lines
        }
        None => vec![Line::from(Span::styled(
            " Saisissez un montant puis appuyez sur [Enter]",
            Style::default().fg(Color::Gray),
        ))],
    };

    let paragraph = Paragraph::new(lines).block(block);
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
            Span::styled("[0-9 , .]", key_style(Color::Yellow)),
            Span::raw(" Montant  "),
            Span::styled("[Enter]", key_style(Color::Green)),
            Span::raw(" Convertir  "),
            Span::styled("[r]", key_style(Color::Yellow)),
            Span::raw(" Rafraîchir  "),
            Span::styled("[s]", key_style(Color::Red)),
            Span::raw(" Déconnexion  "),
            Span::styled("[q]", key_style(Color::Yellow)),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
