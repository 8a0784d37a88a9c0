// ============================================================================
// Notification modale
// ============================================================================
// Fenêtre centrée dessinée par-dessus l'écran courant. Clear efface la zone
// avant le rendu pour que le texte du dessous ne transparaisse pas
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::Notification;
use crate::ui::key_style;

/// Dessine la notification au centre de l'écran
pub fn render(frame: &mut Frame, notification: &Notification) {
    let area = centered_rect(60, 9, frame.size());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" {} ", notification.title))
        .title_alignment(Alignment::Center)
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));

    let mut lines: Vec<Line> = notification
        .message
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Enter]", key_style(Color::Green)),
        Span::raw(" OK"),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Rectangle centré : `percent_x`% de la largeur, `height` lignes
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 9, area);

        assert_eq!(rect.height, 9);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.x, 20);
        assert!(rect.y + rect.height <= area.height);
    }
}
