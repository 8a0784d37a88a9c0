// ============================================================================
// API Client : exchangerate-api.com
// ============================================================================
// Récupère la table des cotations pour une devise de base
//
//   GET https://api.exchangerate-api.com/v4/latest/BRL
//   {
//     "base": "BRL",
//     "date": "2024-05-02",
//     "time_last_updated": 1714608001,
//     "rates": { "BRL": 1, "USD": 0.193, "EUR": 0.181, ... }
//   }
//
// La variante v6 de l'API renvoie "base_code", "conversion_rates",
// "time_last_update_unix" et un champ "result" ("success" / "error") avec un
// HTTP 200 même en cas d'erreur : les deux formats sont acceptés
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::RateProvider;
use crate::config::Config;
use crate::models::{Currency, RateTable};

// ============================================================================
// Structure pour parser la réponse JSON
// ============================================================================
// CONCEPT RUST : #[serde(alias = "...")]
// - Accepte plusieurs noms de champ JSON pour le même champ Rust
// - Option + default : le champ peut être absent
// ============================================================================

/// Réponse de l'API de cotations
#[derive(Debug, Deserialize)]
pub struct ExchangeRateResponse {
    /// "success" ou "error" (v6 seulement)
    #[serde(default)]
    result: Option<String>,

    /// Type d'erreur renvoyé par la v6 ("unsupported-code", "quota-reached", ...)
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,

    /// Devise de base annoncée
    #[serde(default, alias = "base_code")]
    base: Option<String>,

    /// Dernière mise à jour côté fournisseur (timestamp Unix)
    #[serde(default, alias = "time_last_update_unix")]
    time_last_updated: Option<i64>,

    /// Code ISO 4217 → cotation
    #[serde(default, alias = "conversion_rates")]
    rates: Option<HashMap<String, f64>>,
}

// ============================================================================
// Client HTTP
// ============================================================================

/// Client de l'API exchangerate-api.com
///
/// Le client reqwest est construit une seule fois et réutilisé à chaque tick
/// (pool de connexions conservé)
pub struct ExchangeRateApi {
    client: reqwest::Client,
    base_url: String,
}

impl ExchangeRateApi {
    /// Crée le client avec une URL de base et un timeout par requête
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("conversor/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Crée le client depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApi {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    /// Récupère les cotations pour `base`
    ///
    /// Toute erreur (réseau, statut non 2xx, JSON invalide, USD/EUR absents)
    /// remonte avec son contexte ; aucune nouvelle tentative ici
    #[instrument(skip(self), fields(provider = %self.name()))]
    async fn fetch_rates(&self, base: Currency) -> Result<RateTable> {
        let url = build_url(&self.base_url, base);
        debug!(url = %url, "Sending HTTP request to rate API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Échec de la requête HTTP vers l'API de cotations")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, "Rate API returned error status");
            anyhow::bail!("L'API de cotations a retourné une erreur : HTTP {}", status);
        }

        let body: ExchangeRateResponse = response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse de cotations")?;

        let table = parse_response(body, base, Utc::now())?;

        info!(
            currencies = table.currency_count(),
            usd = ?table.usd(),
            eur = ?table.eur(),
            "Successfully fetched rates"
        );
        Ok(table)
    }
}

/// Construit l'URL de l'API : `<base_url>/<BASE>`
pub fn build_url(base_url: &str, base: Currency) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), base.code())
}

/// Convertit la réponse JSON en RateTable
///
/// CONCEPT RUST : Ownership
/// - `response` est "moved" : on récupère la HashMap sans la copier
pub fn parse_response(
    response: ExchangeRateResponse,
    base: Currency,
    fetched_at: DateTime<Utc>,
) -> Result<RateTable> {
    if let Some(result) = &response.result {
        if result != "success" {
            anyhow::bail!(
                "L'API de cotations a retourné une erreur : {}",
                response.error_type.as_deref().unwrap_or(result)
            );
        }
    }

    if let Some(announced) = &response.base {
        if !announced.eq_ignore_ascii_case(base.code()) {
            anyhow::bail!(
                "Devise de base inattendue : {} (attendu {})",
                announced,
                base.code()
            );
        }
    }

    let rates = response
        .rates
        .context("Champ \"rates\" absent de la réponse")?;

    let provider_updated_at = response
        .time_last_updated
        .and_then(|ts| DateTime::from_timestamp(ts, 0));

    let table = RateTable::new(base, rates, fetched_at)?.with_provider_update(provider_updated_at);
    debug!(currencies = table.currency_count(), "Parsed rate table");

    Ok(table)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<RateTable> {
        let response: ExchangeRateResponse = serde_json::from_str(json)?;
        parse_response(response, Currency::Brl, Utc::now())
    }

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url("https://api.exchangerate-api.com/v4/latest", Currency::Brl),
            "https://api.exchangerate-api.com/v4/latest/BRL"
        );
        assert_eq!(
            build_url("http://localhost:8080/latest/", Currency::Brl),
            "http://localhost:8080/latest/BRL"
        );
    }

    #[test]
    fn test_parse_v4_response() {
        let table = parse(
            r#"{
                "provider": "https://www.exchangerate-api.com",
                "base": "BRL",
                "date": "2024-05-02",
                "time_last_updated": 1714608001,
                "rates": { "BRL": 1, "USD": 0.193, "EUR": 0.181, "JPY": 30.1 }
            }"#,
        )
        .unwrap();

        assert_eq!(table.usd(), Some(0.193));
        assert_eq!(table.eur(), Some(0.181));
        assert_eq!(table.currency_count(), 4);
        assert_eq!(
            table.provider_updated_at,
            DateTime::from_timestamp(1714608001, 0)
        );
    }

    #[test]
    fn test_parse_v6_response() {
        let table = parse(
            r#"{
                "result": "success",
                "base_code": "BRL",
                "time_last_update_unix": 1714608001,
                "conversion_rates": { "BRL": 1, "USD": 0.2, "EUR": 0.18 }
            }"#,
        )
        .unwrap();

        assert_eq!(table.usd(), Some(0.2));
    }

    #[test]
    fn test_parse_error_result() {
        let err = parse(r#"{ "result": "error", "error-type": "quota-reached" }"#).unwrap_err();
        assert!(err.to_string().contains("quota-reached"));
    }

    #[test]
    fn test_parse_missing_eur() {
        assert!(parse(r#"{ "base": "BRL", "rates": { "USD": 0.2 } }"#).is_err());
    }

    #[test]
    fn test_parse_missing_rates() {
        assert!(parse(r#"{ "base": "BRL" }"#).is_err());
    }

    #[test]
    fn test_parse_wrong_base() {
        assert!(parse(r#"{ "base": "USD", "rates": { "USD": 1, "EUR": 0.9 } }"#).is_err());
    }

    // ========================================================================
    // Serveur HTTP local
    // ========================================================================
    // Répond une seule fois avec `status` et `body` si la requête vise
    // GET /latest/BRL, sinon 404. Retourne l'URL de base à donner au client.
    // ========================================================================

    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let (status, body) = if request.starts_with(b"GET /latest/BRL ") {
                (status, body)
            } else {
                ("404 Not Found", "")
            };
            let response = format!(
                concat!(
                    "HTTP/1.1 {}\r\n",
                    "Content-Type: application/json\r\n",
                    "Content-Length: {}\r\n",
                    "Connection: close\r\n\r\n{}"
                ),
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/latest", addr)
    }

    fn local_api(base_url: String) -> ExchangeRateApi {
        ExchangeRateApi::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_rates_from_local_server() {
        let url = serve_once(
            "200 OK",
            r#"{ "base": "BRL", "rates": { "BRL": 1, "USD": 0.2, "EUR": 0.18 } }"#,
        )
        .await;

        let table = local_api(url).fetch_rates(Currency::Brl).await.unwrap();
        assert_eq!(table.usd(), Some(0.2));
        assert_eq!(table.eur(), Some(0.18));
    }

    #[tokio::test]
    async fn test_fetch_rates_http_error_status() {
        let url = serve_once("500 Internal Server Error", "").await;

        let err = local_api(url).fetch_rates(Currency::Brl).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"), "{:#}", err);
    }

    #[tokio::test]
    async fn test_fetch_rates_malformed_json() {
        let url = serve_once("200 OK", "<html>maintenance</html>").await;

        let err = local_api(url).fetch_rates(Currency::Brl).await.unwrap_err();
        assert!(err.to_string().contains("JSON"), "{:#}", err);
    }

    // Test avec un vrai appel API (peut échouer si pas de connexion)
    #[tokio::test]
    async fn test_fetch_rates_live() {
        let api = local_api(crate::config::DEFAULT_API_URL.to_string());

        match api.fetch_rates(Currency::Brl).await {
            Ok(table) => {
                assert!(table.usd().unwrap() > 0.0);
                assert!(table.eur().unwrap() > 0.0);
            }
            Err(e) => {
                println!("⚠ Test skippé (pas de connexion?) : {:#}", e);
            }
        }
    }
}
