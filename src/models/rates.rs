// ============================================================================
// Structure : RateTable
// ============================================================================
// Table des cotations relatives à 1 unité de la devise de base (BRL)
//
// CONCEPTS RUST :
// 1. BTreeMap : map triée (affichage et logs déterministes)
// 2. Constructeur validant : une RateTable construite est toujours utilisable
// 3. DateTime<Utc> : horodatage de la récupération
// ============================================================================

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::Currency;

/// Une cotation est utilisable si elle est finie et strictement positive
fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// Cotations pour 1 unité de `base`
///
/// Invariant : USD et EUR sont toujours présents et valides
/// (vérifié par `RateTable::new`)
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    /// Devise de base (toujours BRL dans l'application)
    pub base: Currency,

    /// Code ISO 4217 → cotation
    pub rates: BTreeMap<String, f64>,

    /// Moment où la table a été reçue
    pub fetched_at: DateTime<Utc>,

    /// Dernière mise à jour annoncée par le fournisseur, si fournie
    pub provider_updated_at: Option<DateTime<Utc>>,
}

impl RateTable {
    /// Construit une table à partir des cotations brutes
    ///
    /// Les cotations invalides (NaN, infinies, <= 0) sont ignorées avec un
    /// warning. Échoue si USD ou EUR manque ou est invalide.
    pub fn new(
        base: Currency,
        raw: impl IntoIterator<Item = (String, f64)>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self> {
        let mut rates = BTreeMap::new();
        let mut skipped = 0;

        for (code, rate) in raw {
            if is_valid_rate(rate) {
                rates.insert(code.to_ascii_uppercase(), rate);
            } else {
                skipped += 1;
                warn!(currency = %code, rate, "Skipping invalid rate");
            }
        }

        for currency in Currency::TARGETS {
            if !rates.contains_key(currency.code()) {
                anyhow::bail!(
                    "Cotation {} absente ou invalide dans la réponse",
                    currency.code()
                );
            }
        }

        if skipped > 0 {
            warn!(skipped, kept = rates.len(), "Some rates were skipped");
        }

        Ok(Self {
            base,
            rates,
            fetched_at,
            provider_updated_at: None,
        })
    }

    /// Ajoute la date de mise à jour annoncée par le fournisseur
    pub fn with_provider_update(mut self, updated_at: Option<DateTime<Utc>>) -> Self {
        self.provider_updated_at = updated_at;
        self
    }

    /// Cotation d'une devise pour 1 unité de la base
    ///
    /// La base elle-même vaut toujours 1.0
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        if currency == self.base {
            return Some(1.0);
        }
        self.rates.get(currency.code()).copied()
    }

    /// Cotation USD
    pub fn usd(&self) -> Option<f64> {
        self.rate(Currency::Usd)
    }

    /// Cotation EUR
    pub fn eur(&self) -> Option<f64> {
        self.rate(Currency::Eur)
    }

    /// Nombre de devises dans la table (au moins USD et EUR)
    pub fn currency_count(&self) -> usize {
        self.rates.len()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|&(c, r)| (c.to_string(), r)).collect()
    }

    #[test]
    fn test_rate_table_new() {
        let table = RateTable::new(
            Currency::Brl,
            raw(&[("BRL", 1.0), ("USD", 0.20), ("EUR", 0.18), ("GBP", 0.16)]),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(table.currency_count(), 4);
        assert_eq!(table.usd(), Some(0.20));
        assert_eq!(table.eur(), Some(0.18));
        assert_eq!(table.rate(Currency::Brl), Some(1.0));
        assert!(table.provider_updated_at.is_none());
    }

    #[test]
    fn test_rate_table_missing_eur() {
        let result = RateTable::new(Currency::Brl, raw(&[("USD", 0.20)]), Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn test_rate_table_invalid_usd() {
        let result = RateTable::new(
            Currency::Brl,
            raw(&[("USD", 0.0), ("EUR", 0.18)]),
            Utc::now(),
        );
        assert!(result.is_err());

        let result = RateTable::new(
            Currency::Brl,
            raw(&[("USD", f64::NAN), ("EUR", 0.18)]),
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rate_table_skips_invalid_others() {
        let table = RateTable::new(
            Currency::Brl,
            raw(&[("USD", 0.20), ("EUR", 0.18), ("XXX", -1.0), ("YYY", f64::INFINITY)]),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(table.currency_count(), 2);
        assert!(!table.rates.contains_key("XXX"));
    }

    #[test]
    fn test_rate_table_lowercase_codes() {
        let table = RateTable::new(
            Currency::Brl,
            raw(&[("usd", 0.20), ("eur", 0.18)]),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(table.usd(), Some(0.20));
    }
}
