// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;       // Gestion des événements clavier
pub mod home;         // Écran de conversion
pub mod notification; // Fenêtre modale de notification
pub mod welcome;      // Écran public / connexion

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};

use crate::app::{App, Screen};

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - L'écran courant décide du rendu
/// - La notification se dessine par-dessus, quel que soit l'écran
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Welcome => welcome::render(frame, app),
        Screen::Home => home::render(frame, app),
    }

    if let Some(notification) = &app.notification {
        notification::render(frame, notification);
    }
}

/// Crée le layout principal (header, content, footer)
pub(crate) fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

/// Style des raccourcis clavier dans les footers
pub(crate) fn key_style(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Ligne de confirmation du quit en deux temps
pub(crate) fn quit_confirmation_line() -> Line<'static> {
    let warning = key_style(Color::Yellow);
    Line::from(vec![
        Span::styled("⚠  Appuyez sur ", warning),
        Span::styled(
            "[q]",
            key_style(Color::Red).add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(
            " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
            warning,
        ),
    ])
}
