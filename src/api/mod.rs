// ============================================================================
// Module : api
// ============================================================================
// Clients des APIs de cotations. Le trait RateProvider isole le timer de
// rafraîchissement du transport HTTP (et permet un mock dans les tests)
// ============================================================================

pub mod exchange_rate; // Client API exchangerate-api.com

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Currency, RateTable};

// Re-export des éléments principaux
pub use exchange_rate::ExchangeRateApi;

/// Source de cotations
///
/// CONCEPT RUST : async_trait
/// - Les méthodes async dans un trait utilisé comme `dyn RateProvider`
///   passent par la macro (Box<dyn Future> sous le capot)
/// - Send + Sync : le provider est partagé entre tâches tokio via Arc
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Nom du fournisseur (pour les logs)
    fn name(&self) -> &str;

    /// Récupère la table des cotations pour 1 unité de `base`
    async fn fetch_rates(&self, base: Currency) -> Result<RateTable>;
}

/// Provider scriptable pour les tests
#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Réponse programmée du mock
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Cotations renvoyées après `delay`
        Rates { usd: f64, eur: f64, delay: Duration },
        /// Échec avec ce message
        Fail(String),
    }

    /// Rejoue les réponses dans l'ordre ; renvoie USD 0.20 / EUR 0.18 une
    /// fois le script épuisé
    #[derive(Default)]
    pub struct MockRateProvider {
        calls: AtomicUsize,
        completions: AtomicUsize,
        script: Mutex<VecDeque<MockResponse>>,
    }

    impl MockRateProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, response: MockResponse) {
            self.script.lock().unwrap().push_back(response);
        }

        /// Nombre d'appels à fetch_rates
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Nombre d'appels arrivés au bout (non annulés)
        pub fn completions(&self) -> usize {
            self.completions.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_rates(&self, base: Currency) -> Result<RateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();

            let (usd, eur, delay) = match next {
                Some(MockResponse::Rates { usd, eur, delay }) => (usd, eur, delay),
                Some(MockResponse::Fail(message)) => anyhow::bail!(message),
                None => (0.20, 0.18, Duration::ZERO),
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.completions.fetch_add(1, Ordering::SeqCst);

            RateTable::new(
                base,
                vec![("USD".to_string(), usd), ("EUR".to_string(), eur)],
                chrono::Utc::now(),
            )
        }
    }
}
