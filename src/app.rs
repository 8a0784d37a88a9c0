// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de l'application TUI : écran courant, session, et l'état de
// l'écran d'accueil (montant saisi, cotations, dernière conversion)
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Propriétaire unique : seule la boucle UI modifie App, pas de Mutex
// 3. Encapsulation : les invariants (séquence des cotations) passent par
//    les méthodes
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use tracing::{debug, error, info, warn};

use crate::models::{self, ConversionResult, ConvertError, RateTable};
use crate::refresh::RefreshEvent;
use crate::session::SessionProvider;

/// Longueur maximale du montant saisi
const MAX_INPUT_LEN: usize = 24;

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Écran public : présentation et connexion
    Welcome,

    /// Écran d'accueil connecté : conversion BRL → USD / EUR
    /// Le timer de rafraîchissement vit tant que cet écran est actif
    Home,
}

/// Notification bloquante (équivalent d'une alerte)
///
/// Tant qu'elle est affichée, les touches servent uniquement à la fermer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Quit en deux temps (première pression de 'q' : confirmation)
    pub confirm_quit: bool,

    /// Fournisseur d'identité (nom affiché, déconnexion)
    session: Box<dyn SessionProvider>,

    /// Montant BRL en cours de saisie (texte brut, validé à la conversion)
    pub input_buffer: String,

    /// Le champ de saisie a le focus (curseur visible)
    pub input_focused: bool,

    /// Dernières cotations reçues (None tant qu'aucune récupération n'a réussi)
    pub rates: Option<RateTable>,

    /// Numéro de séquence de la récupération qui a produit `rates`
    rates_seq: u64,

    /// Dernière conversion réussie
    /// Jamais recalculée automatiquement quand les cotations changent
    pub conversion: Option<ConversionResult>,

    /// Notification bloquante en cours
    pub notification: Option<Notification>,

    /// Nombre de récupérations en vol
    in_flight: usize,
}

impl App {
    /// Crée l'application sur l'écran public
    pub fn new(session: Box<dyn SessionProvider>) -> Self {
        let current_screen = if session.is_signed_in() {
            Screen::Home
        } else {
            Screen::Welcome
        };

        Self {
            running: true,
            current_screen,
            confirm_quit: false,
            session,
            input_buffer: String::new(),
            input_focused: false,
            rates: None,
            rates_seq: 0,
            conversion: None,
            notification: None,
            in_flight: 0,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Navigation et session
    // ========================================================================

    /// Vérifie si on est sur l'écran public
    pub fn is_on_welcome(&self) -> bool {
        self.current_screen == Screen::Welcome
    }

    /// Vérifie si on est sur l'écran de conversion
    pub fn is_on_home(&self) -> bool {
        self.current_screen == Screen::Home
    }

    /// Nom de l'utilisateur connecté
    pub fn display_name(&self) -> Option<&str> {
        self.session.display_name()
    }

    /// Ouvre la session et monte l'écran d'accueil
    ///
    /// L'état de l'écran repart de zéro : RateTable vide jusqu'à la première
    /// récupération réussie
    pub fn sign_in(&mut self) {
        self.session.sign_in();
        self.reset_home();
        self.current_screen = Screen::Home;
    }

    /// Ferme la session et retourne à l'écran public
    ///
    /// Les cotations et la conversion sont détruites avec l'écran ; au passage
    /// suivant, `refresh::sync_with_screen` drop le RefreshHandle
    pub fn sign_out(&mut self) {
        self.session.sign_out();
        self.reset_home();
        self.current_screen = Screen::Welcome;
    }

    fn reset_home(&mut self) {
        self.input_buffer.clear();
        self.input_focused = false;
        self.rates = None;
        self.rates_seq = 0;
        self.conversion = None;
        self.notification = None;
        self.in_flight = 0;
    }

    // ========================================================================
    // Quit confirmation
    // ========================================================================

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Saisie du montant
    // ========================================================================

    /// Ajoute un caractère au montant et donne le focus au champ
    pub fn append_char(&mut self, c: char) {
        self.input_focused = true;
        if self.input_buffer.chars().count() < MAX_INPUT_LEN {
            self.input_buffer.push(c);
        }
    }

    /// Supprime le dernier caractère du montant
    pub fn backspace(&mut self) {
        self.input_focused = true;
        self.input_buffer.pop();
    }

    /// Retire le focus du champ de saisie
    pub fn blur_input(&mut self) {
        self.input_focused = false;
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Convertit le montant saisi avec les cotations actuelles
    ///
    /// Le focus est retiré avant le calcul, quel que soit le résultat. En cas
    /// d'erreur, rien n'est modifié à part la notification.
    pub fn convert(&mut self) -> Result<(), ConvertError> {
        self.blur_input();

        match models::convert(&self.input_buffer, self.rates.as_ref()) {
            Ok(result) => {
                info!(
                    amount_brl = result.amount_brl,
                    usd = %result.usd_display(),
                    eur = %result.eur_display(),
                    "Conversion done"
                );
                self.conversion = Some(result);
                Ok(())
            }
            Err(e) => {
                warn!(input = %self.input_buffer, error = %e, "Conversion rejected");
                let message = match &e {
                    ConvertError::InvalidAmount(_) => "Saisissez un montant valide en BRL.",
                    ConvertError::RatesUnavailable => {
                        "Cotations pas encore disponibles, patientez quelques instants."
                    }
                };
                self.notify("Conversion impossible", message);
                Err(e)
            }
        }
    }

    // ========================================================================
    // Cotations
    // ========================================================================

    /// Applique un événement du timer de rafraîchissement
    ///
    /// - Fetched : remplace les cotations seulement si la récupération est
    ///   plus récente que celle affichée
    /// - Failed : cotations inchangées, l'utilisateur est notifié (sauf si
    ///   une récupération plus récente a déjà réussi)
    pub fn apply_refresh_event(&mut self, event: RefreshEvent) {
        if !self.is_on_home() {
            debug!(seq = event.seq(), "Refresh event received off the home screen, ignored");
            return;
        }

        match event {
            RefreshEvent::Started { seq } => {
                debug!(seq, "Rate fetch started");
                self.in_flight += 1;
            }
            RefreshEvent::Fetched { seq, table } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if seq > self.rates_seq {
                    info!(seq, usd = ?table.usd(), eur = ?table.eur(), "Updating rates");
                    self.rates = Some(table);
                    self.rates_seq = seq;
                } else {
                    warn!(seq, current = self.rates_seq, "Ignoring stale rates");
                }
            }
            RefreshEvent::Failed { seq, error } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                error!(seq, error = %error, "Rate refresh failed, keeping previous rates");
                if seq > self.rates_seq {
                    self.notify(
                        "Cotations indisponibles",
                        &format!(
                            "Impossible d'obtenir les cotations. Réessayez plus tard.\n{}",
                            error
                        ),
                    );
                }
            }
        }
    }

    /// Vérifie si une récupération est en cours
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Affiche une notification bloquante (remplace la précédente)
    pub fn notify(&mut self, title: &str, message: &str) {
        self.notification = Some(Notification {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    /// Ferme la notification
    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Vérifie si une notification bloque l'écran
    pub fn has_notification(&self) -> bool {
        self.notification.is_some()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
