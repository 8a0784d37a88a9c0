// ============================================================================
// Configuration
// ============================================================================
// Paramètres d'exécution lus depuis les variables d'environnement, avec des
// valeurs par défaut raisonnables
//
// | Variable                | Défaut                                      |
// |-------------------------|---------------------------------------------|
// | CONVERSOR_API_URL       | https://api.exchangerate-api.com/v4/latest  |
// | CONVERSOR_REFRESH_SECS  | 600 (10 minutes)                            |
// | CONVERSOR_TIMEOUT_SECS  | 10                                          |
// | CONVERSOR_USER          | USER / USERNAME                             |
// | CONVERSOR_LOG_DIR       | <data_local_dir>/conversor/logs             |
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::models::Currency;

/// URL de base de l'API de cotations (la devise de base est ajoutée à la fin)
pub const DEFAULT_API_URL: &str = "https://api.exchangerate-api.com/v4/latest";

/// Intervalle de rafraîchissement des cotations : 10 minutes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// Timeout d'une requête HTTP
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base de l'API de cotations
    pub api_base_url: String,

    /// Devise de base des cotations
    pub base_currency: Currency,

    /// Période du timer de rafraîchissement
    pub refresh_interval: Duration,

    /// Timeout de chaque requête HTTP
    pub request_timeout: Duration,

    /// Nom affiché dans le message d'accueil (None tant qu'inconnu)
    pub user_name: Option<String>,

    /// Répertoire des logs imposé par l'utilisateur
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            base_currency: Currency::Brl,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_name: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Charge la configuration depuis l'environnement du process
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration depuis une fonction de lookup
    ///
    /// CONCEPT RUST : Closure en paramètre (impl Fn)
    /// - Les tests passent une HashMap au lieu de toucher au vrai environnement
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        // Les valeurs vides sont traitées comme absentes
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("CONVERSOR_API_URL") {
            config.api_base_url = url.trim().to_string();
        }

        if let Some(value) = get("CONVERSOR_REFRESH_SECS") {
            config.refresh_interval = parse_secs("CONVERSOR_REFRESH_SECS", &value)?;
        }

        if let Some(value) = get("CONVERSOR_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("CONVERSOR_TIMEOUT_SECS", &value)?;
        }

        config.user_name = get("CONVERSOR_USER")
            .or_else(|| get("USER"))
            .or_else(|| get("USERNAME"))
            .map(|name| name.trim().to_string());

        config.log_dir = get("CONVERSOR_LOG_DIR").map(PathBuf::from);

        Ok(config)
    }

    /// Répertoire des logs effectif
    ///
    /// - Linux : ~/.local/share/conversor/logs
    /// - macOS : ~/Library/Application Support/conversor/logs
    /// - Windows : C:\Users\<user>\AppData\Local\conversor\logs
    /// - Sinon : ./logs
    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("conversor").join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }
}

/// Parse une durée en secondes strictement positive
fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{} doit être un nombre de secondes (reçu {:?})", name, value))?;

    if secs == 0 {
        anyhow::bail!("{} doit être supérieur à zéro", name);
    }

    Ok(Duration::from_secs(secs))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.base_currency, Currency::Brl);
        assert_eq!(config.refresh_interval, Duration::from_millis(600_000));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.user_name.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("CONVERSOR_API_URL", "http://localhost:8080/latest"),
            ("CONVERSOR_REFRESH_SECS", "60"),
            ("CONVERSOR_TIMEOUT_SECS", " 3 "),
            ("CONVERSOR_USER", "Ana Souza"),
            ("USER", "ana"),
            ("CONVERSOR_LOG_DIR", "/tmp/conversor-logs"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080/latest");
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.user_name.as_deref(), Some("Ana Souza"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/conversor-logs"));
    }

    #[test]
    fn test_config_user_fallback() {
        let config =
            Config::from_lookup(lookup_from(&[("CONVERSOR_USER", "  "), ("USER", "ana")])).unwrap();
        assert_eq!(config.user_name.as_deref(), Some("ana"));
    }

    #[test]
    fn test_config_invalid_interval() {
        assert!(Config::from_lookup(lookup_from(&[("CONVERSOR_REFRESH_SECS", "dix")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("CONVERSOR_REFRESH_SECS", "0")])).is_err());
    }
}
