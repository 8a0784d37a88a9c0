// ============================================================================
// Rafraîchissement périodique des cotations
// ============================================================================
// Au montage de l'écran d'accueil : une récupération immédiate, puis une
// récupération toutes les 10 minutes tant que l'écran est actif
//
// CONCEPTS RUST :
// 1. RAII : le timer est une ressource détenue par RefreshHandle ;
//    Drop annule le timer ET les requêtes en cours
// 2. tokio::select! : attendre le prochain tick OU une demande manuelle
// 3. JoinSet : les requêtes en vol appartiennent à la tâche du timer,
//    elles sont annulées avec elle
// 4. Numéro de séquence : chaque récupération est numérotée, l'écran ignore
//    un résultat plus ancien que celui qu'il affiche déjà
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::RateProvider;
use crate::app::App;
use crate::models::{Currency, RateTable};

/// Événements envoyés par le timer vers l'écran
#[derive(Debug)]
pub enum RefreshEvent {
    /// Une récupération démarre
    Started { seq: u64 },

    /// Récupération réussie
    Fetched { seq: u64, table: RateTable },

    /// Récupération échouée (message complet de la chaîne d'erreurs)
    Failed { seq: u64, error: String },
}

impl RefreshEvent {
    /// Numéro de séquence de la récupération concernée
    pub fn seq(&self) -> u64 {
        match self {
            RefreshEvent::Started { seq }
            | RefreshEvent::Fetched { seq, .. }
            | RefreshEvent::Failed { seq, .. } => *seq,
        }
    }
}

/// Configuration du timer, consommée par `start`
pub struct RefreshScheduler {
    provider: Arc<dyn RateProvider>,
    base: Currency,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(provider: Arc<dyn RateProvider>, base: Currency, period: Duration) -> Self {
        Self {
            provider,
            base,
            period,
        }
    }

    /// Démarre le timer sur le runtime donné
    ///
    /// Le premier tick part immédiatement. Le timer vit jusqu'au drop du
    /// RefreshHandle retourné.
    pub fn start(self, runtime: &Handle) -> RefreshHandle {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();

        info!(
            provider = %self.provider.name(),
            base = %self.base,
            period_secs = self.period.as_secs(),
            "Starting rate refresh schedule"
        );

        let task = runtime.spawn(run_schedule(self, event_tx, trigger_rx));

        RefreshHandle {
            task,
            events: event_rx,
            trigger: trigger_tx,
        }
    }
}

/// Boucle du timer
///
/// Les ticks sont espacés de `period` à partir de leur déclenchement, pas de
/// la fin de la requête : une requête lente ne retarde pas la suivante et
/// deux requêtes peuvent être en vol en même temps
async fn run_schedule(
    scheduler: RefreshScheduler,
    events: UnboundedSender<RefreshEvent>,
    mut triggers: UnboundedReceiver<()>,
) {
    let mut ticker = tokio::time::interval(scheduler.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut in_flight = JoinSet::new();
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!(next_seq = seq + 1, "Refresh tick");
            }
            trigger = triggers.recv() => {
                if trigger.is_none() {
                    // Le handle n'existe plus
                    break;
                }
                debug!(next_seq = seq + 1, "Manual refresh requested");
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        error!(error = ?e, "Rate fetch task panicked");
                    }
                }
                continue;
            }
        }

        seq += 1;
        if events.send(RefreshEvent::Started { seq }).is_err() {
            break;
        }

        let provider = Arc::clone(&scheduler.provider);
        let events = events.clone();
        let base = scheduler.base;

        in_flight.spawn(async move {
            let event = match provider.fetch_rates(base).await {
                Ok(table) => {
                    info!(seq, usd = ?table.usd(), eur = ?table.eur(), "Rates fetched");
                    RefreshEvent::Fetched { seq, table }
                }
                Err(e) => {
                    error!(seq, error = ?e, "Failed to fetch rates");
                    RefreshEvent::Failed {
                        seq,
                        error: format!("{:#}", e),
                    }
                }
            };

            if events.send(event).is_err() {
                debug!(seq, "Refresh result dropped (screen gone)");
            }
        });
    }

    debug!("Refresh schedule loop exited");
}

/// Handle du timer de rafraîchissement, détenu par l'écran d'accueil
///
/// CONCEPT RUST : Drop
/// - Quitter l'écran (déconnexion, quit, erreur) drop le handle
/// - Drop annule la tâche du timer, ce qui drop son JoinSet et annule les
///   requêtes en vol : aucun résultat tardif ne peut arriver après
pub struct RefreshHandle {
    task: JoinHandle<()>,
    events: UnboundedReceiver<RefreshEvent>,
    trigger: UnboundedSender<()>,
}

impl RefreshHandle {
    /// Demande une récupération immédiate (en plus des ticks réguliers)
    pub fn refresh_now(&self) {
        if self.trigger.send(()).is_err() {
            warn!("Refresh schedule is not running, manual refresh ignored");
        }
    }

    /// Prochain événement disponible, sans bloquer (boucle UI)
    pub fn try_next(&mut self) -> Option<RefreshEvent> {
        self.events.try_recv().ok()
    }

    /// Attend le prochain événement
    pub async fn next(&mut self) -> Option<RefreshEvent> {
        self.events.recv().await
    }

}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
        info!("Rate refresh schedule cancelled");
    }
}

/// Monte ou démonte le timer selon l'écran affiché
///
/// Appelé à chaque itération de la boucle UI :
/// - écran de conversion sans timer : démarre un nouveau timer
/// - autre écran avec un timer : le drop (timer et requêtes annulés)
pub fn sync_with_screen(
    app: &App,
    slot: &mut Option<RefreshHandle>,
    scheduler: impl FnOnce() -> RefreshScheduler,
    runtime: &Handle,
) {
    match (app.is_on_home(), slot.is_some()) {
        (true, false) => {
            info!("Home screen mounted, starting rate refresh");
            *slot = Some(scheduler().start(runtime));
        }
        (false, true) => {
            info!("Home screen unmounted, stopping rate refresh");
            *slot = None;
        }
        _ => {}
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// CONCEPT : Horloge en pause (tokio test-util)
// - start_paused = true : le temps n'avance que quand toutes les tâches
//   attendent un timer, et saute directement à la prochaine échéance
// - 10 minutes de timer s'exécutent instantanément et de façon déterministe
// ============================================================================
