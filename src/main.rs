// ============================================================================
// Conversor : conversion BRL → USD / EUR dans le terminal
// ============================================================================
// Programme TUI en deux écrans : accueil public puis écran de conversion.
// Les cotations sont récupérées en arrière-plan (runtime tokio) et rafraîchies
// toutes les 10 minutes tant que l'écran de conversion est affiché
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : le runtime tokio vit à côté de la boucle UI
// 4. RAII : le timer de rafraîchissement meurt avec son RefreshHandle
// ============================================================================

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

use conversor::api::{ExchangeRateApi, RateProvider};
use conversor::app::App;
use conversor::config::Config;
use conversor::refresh::{sync_with_screen, RefreshHandle, RefreshScheduler};
use conversor::session::LocalSession;
use conversor::ui::{events::EventHandler, render, Event};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - stdout appartient au TUI, on log vers un fichier
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans `Config::log_dir()` :
/// - CONVERSOR_LOG_DIR si défini
/// - Linux : ~/.local/share/conversor/logs/conversor.log
/// - macOS : ~/Library/Application Support/conversor/logs/conversor.log
///
/// ```bash
/// tail -f ~/.local/share/conversor/logs/conversor.log.*
/// RUST_LOG=conversor=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "conversor.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true) // Le runtime tokio log depuis ses propres threads
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conversor=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'installation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // La configuration passe avant le logging : elle donne le répertoire
    let config = Config::from_env().context("Configuration invalide")?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        api = %config.api_base_url,
        base = %config.base_currency,
        refresh_secs = config.refresh_interval.as_secs(),
        "Conversor starting up"
    );

    // CONCEPT RUST : Runtime multi-thread en arrière-plan
    // - Le timer et les requêtes HTTP tournent sur les workers tokio
    // - La boucle UI reste synchrone et lit les résultats via un channel
    let runtime = Runtime::new().context("Échec de la création du runtime tokio")?;

    let provider: Arc<dyn RateProvider> = Arc::new(ExchangeRateApi::from_config(&config)?);
    let session = LocalSession::new(config.user_name.clone());
    let mut app = App::new(Box::new(session));

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &runtime, &provider, &config);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Les requêtes encore en vol sont abandonnées avec le runtime
    runtime.shutdown_background();

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Monter / démonter le timer selon l'écran
//   1. Appliquer les résultats du rafraîchissement
//   2. Dessiner l'interface
//   3. Traiter les événements clavier
// ============================================================================

/// Exécute la boucle principale de l'application
///
/// CONCEPT RUST : Option<RefreshHandle> comme cycle de vie
/// - Some tant que l'écran de conversion est affiché
/// - Remis à None (drop) dès qu'on le quitte : timer et requêtes annulés
/// - Au retour de `run` (quit ou erreur `?`), le handle est droppé aussi
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    runtime: &Runtime,
    provider: &Arc<dyn RateProvider>,
    config: &Config,
) -> Result<()> {
    let mut refresh: Option<RefreshHandle> = None;

    while app.is_running() {
        // ========================================
        // 0. MOUNT / UNMOUNT du timer
        // ========================================
        sync_with_screen(
            app,
            &mut refresh,
            || {
                RefreshScheduler::new(
                    Arc::clone(provider),
                    config.base_currency,
                    config.refresh_interval,
                )
            },
            runtime.handle(),
        );

        // ========================================
        // 1. RÉSULTATS : Cotations reçues
        // ========================================
        if let Some(handle) = refresh.as_mut() {
            while let Some(event) = handle.try_next() {
                app.apply_refresh_event(event);
            }
        }

        // ========================================
        // 2. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 3. INPUT
        // ========================================
        match events.next() {
            Ok(event) => handle_event(app, event, refresh.as_ref()),
            Err(e) => error!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Une notification ouverte capte toutes les touches
/// - Ensuite, les touches dépendent de l'écran courant
fn handle_event(app: &mut App, event: Event, refresh: Option<&RefreshHandle>) {
    use conversor::ui::events::{
        get_char_from_event, is_amount_char_event, is_backspace_event, is_dismiss_event,
        is_enter_event, is_escape_event, is_quit_event, is_refresh_event, is_sign_out_event,
    };

    match event {
        // Notification modale : seule la fermeture est possible
        Event::Key(_) if app.has_notification() => {
            if is_dismiss_event(&event) {
                debug!("User dismissed notification");
                app.dismiss_notification();
            }
        }

        Event::Key(_) if is_quit_event(&event) => {
            // Quit en deux temps pour éviter les sorties accidentelles
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // ========================================
        // Écran public
        // ========================================
        Event::Key(_) if is_enter_event(&event) && app.is_on_welcome() => {
            app.cancel_quit();
            info!("User signed in");
            app.sign_in();
        }

        // ========================================
        // Écran de conversion
        // ========================================
        Event::Key(_) if is_amount_char_event(&event) && app.is_on_home() => {
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        Event::Key(_) if is_backspace_event(&event) && app.is_on_home() => {
            app.cancel_quit();
            app.backspace();
        }

        Event::Key(_) if is_enter_event(&event) && app.is_on_home() => {
            app.cancel_quit();
            // L'erreur est déjà loggée et notifiée par App
            let _ = app.convert();
        }

        Event::Key(_) if is_escape_event(&event) && app.is_on_home() => {
            app.cancel_quit();
            app.blur_input();
        }

        Event::Key(_) if is_refresh_event(&event) && app.is_on_home() => {
            app.cancel_quit();
            match refresh {
                Some(handle) => {
                    info!("User requested rate refresh");
                    handle.refresh_now();
                }
                None => debug!("Refresh requested while no schedule is mounted"),
            }
        }

        Event::Key(_) if is_sign_out_event(&event) && app.is_on_home() => {
            app.cancel_quit();
            info!("User signed out");
            app.sign_out();
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de l'initialisation du terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
