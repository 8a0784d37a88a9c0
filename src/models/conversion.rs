// ============================================================================
// Conversion BRL → USD / EUR
// ============================================================================
// Parse le montant saisi, applique les cotations en cache et arrondit au
// centime
//
// CONCEPTS RUST :
// 1. thiserror : enum d'erreurs typée que l'appelant peut matcher
// 2. Fonctions pures : aucune dépendance à l'UI, faciles à tester
// 3. f64::round : arrondi "half away from zero" (0.125 → 0.13)
// ============================================================================

use thiserror::Error;

use crate::models::{Currency, RateTable};

/// Erreurs de validation de la conversion
///
/// Aucune des deux ne modifie l'état : l'utilisateur corrige sa saisie ou
/// attend la prochaine récupération réussie des cotations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Le texte saisi n'est pas un nombre
    #[error("Montant invalide : {0:?}")]
    InvalidAmount(String),

    /// Aucune récupération de cotations n'a encore réussi
    #[error("Cotations USD/EUR pas encore disponibles")]
    RatesUnavailable,
}

/// Résultat d'une conversion réussie
///
/// Les montants sont déjà arrondis à 2 décimales
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    /// Montant saisi, en BRL
    pub amount_brl: f64,

    /// Montant converti en USD
    pub usd: f64,

    /// Montant converti en EUR
    pub eur: f64,
}

impl ConversionResult {
    /// Montant converti pour une devise
    pub fn amount(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Brl => self.amount_brl,
            Currency::Usd => self.usd,
            Currency::Eur => self.eur,
        }
    }

    /// Montant USD avec exactement deux décimales ("20.00")
    pub fn usd_display(&self) -> String {
        format_amount(self.usd)
    }

    /// Montant EUR avec exactement deux décimales ("18.00")
    pub fn eur_display(&self) -> String {
        format_amount(self.eur)
    }
}

/// Arrondit au centime, moitié vers l'extérieur (pas d'arrondi bancaire)
///
/// Le zéro négatif est normalisé pour ne jamais afficher "-0.00"
pub fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formate un montant avec exactement deux décimales
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Parse le montant saisi par l'utilisateur
///
/// Règles :
/// - espaces autour ignorés, texte vide → invalide
/// - une seule virgule acceptée comme séparateur décimal ("10,50")
/// - virgule et point mélangés → invalide
/// - "NaN", "inf" ou tout caractère parasite → invalide
/// - les montants négatifs sont acceptés
pub fn parse_amount(input: &str) -> Result<f64, ConvertError> {
    let invalid = || ConvertError::InvalidAmount(input.to_string());

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let normalized = if trimmed.contains(',') {
        if trimmed.contains('.') || trimmed.matches(',').count() > 1 {
            return Err(invalid());
        }
        trimmed.replacen(',', ".", 1)
    } else {
        trimmed.to_string()
    };

    // f64::from_str accepte "inf" et "NaN" : on filtre les caractères avant
    let only_numeric = normalized
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !only_numeric {
        return Err(invalid());
    }

    let amount: f64 = normalized.parse().map_err(|_| invalid())?;
    if !amount.is_finite() {
        return Err(invalid());
    }

    Ok(amount)
}

/// Convertit un montant BRL en USD et EUR avec les cotations actuelles
///
/// Le montant est validé en premier, puis la présence des cotations
pub fn convert(input: &str, rates: Option<&RateTable>) -> Result<ConversionResult, ConvertError> {
    let amount = parse_amount(input)?;

    let rates = rates.ok_or(ConvertError::RatesUnavailable)?;
    let usd_rate = rates.usd().ok_or(ConvertError::RatesUnavailable)?;
    let eur_rate = rates.eur().ok_or(ConvertError::RatesUnavailable)?;

    Ok(ConversionResult {
        amount_brl: amount,
        usd: round_cents(amount * usd_rate),
        eur: round_cents(amount * eur_rate),
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn table(usd: f64, eur: f64) -> RateTable {
        RateTable::new(
            Currency::Brl,
            vec![("USD".to_string(), usd), ("EUR".to_string(), eur)],
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_convert_scenario_100() {
        let rates = table(0.20, 0.18);
        let result = convert("100", Some(&rates)).unwrap();

        assert_eq!(result.usd_display(), "20.00");
        assert_eq!(result.eur_display(), "18.00");
        assert_eq!(result.amount(Currency::Brl), 100.0);
    }

    #[test]
    fn test_convert_non_numeric() {
        let rates = table(0.20, 0.18);

        for input in ["abc", "", "   ", "12abc", "1.2.3", "-", "NaN", "inf", "1,2.3", "1,2,3"] {
            assert_eq!(
                convert(input, Some(&rates)),
                Err(ConvertError::InvalidAmount(input.to_string())),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_convert_without_rates() {
        assert_eq!(convert("50", None), Err(ConvertError::RatesUnavailable));
    }

    #[test]
    fn test_invalid_amount_checked_before_rates() {
        assert!(matches!(convert("abc", None), Err(ConvertError::InvalidAmount(_))));
    }

    #[test]
    fn test_convert_negative_amount() {
        let rates = table(0.20, 0.18);
        let result = convert("-10", Some(&rates)).unwrap();

        assert_eq!(result.usd_display(), "-2.00");
        assert_eq!(result.eur_display(), "-1.80");
    }

    #[test]
    fn test_convert_comma_and_whitespace() {
        let rates = table(0.20, 0.18);
        let result = convert("  10,50 ", Some(&rates)).unwrap();

        assert_eq!(result.amount_brl, 10.5);
        assert_eq!(result.usd_display(), "2.10");
        assert_eq!(result.eur_display(), "1.89");
    }

    #[test]
    fn test_convert_rounds_to_cents() {
        let rates = table(0.1834, 0.1667);
        let result = convert("33.33", Some(&rates)).unwrap();

        // 33.33 * 0.1834 = 6.112722 ; 33.33 * 0.1667 = 5.556111
        assert_eq!(result.usd_display(), "6.11");
        assert_eq!(result.eur_display(), "5.56");
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-0.125), -0.13);
        assert_eq!(round_cents(2.5), 2.5);
        assert_eq!(format_amount(round_cents(-0.001)), "0.00");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("42"), Ok(42.0));
        assert_eq!(parse_amount("+1.5"), Ok(1.5));
        assert_eq!(parse_amount(".5"), Ok(0.5));
        assert_eq!(parse_amount("1e3"), Ok(1000.0));
        assert!(parse_amount("1e400").is_err());
    }
}
