// ============================================================================
// Enum : Currency
// ============================================================================
// Les trois devises gérées par l'application : le réel (base des cotations),
// le dollar et l'euro
//
// CONCEPTS RUST :
// 1. Enum "fermé" : impossible de construire une devise non supportée
// 2. Display : affichage avec {} (code ISO 4217)
// ============================================================================

use std::fmt;

/// Devise supportée (code ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    /// Réal brésilien : devise de base des cotations
    Brl,
    /// Dollar américain
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// Devises cibles de la conversion, dans l'ordre d'affichage
    pub const TARGETS: [Currency; 2] = [Currency::Usd, Currency::Eur];

    /// Code ISO 4217 (clé utilisée par l'API dans le champ "rates")
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Symbole monétaire pour l'affichage
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Brl => "R$",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_and_symbol() {
        assert_eq!(Currency::Brl.code(), "BRL");
        assert_eq!(Currency::Usd.symbol(), "$");
        assert_eq!(Currency::Eur.symbol(), "€");
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn test_targets_exclude_base() {
        assert_eq!(Currency::TARGETS, [Currency::Usd, Currency::Eur]);
        assert!(!Currency::TARGETS.contains(&Currency::Brl));
    }
}
