// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : devises, table des cotations,
// conversion
// ============================================================================

pub mod currency;   // Devises supportées (BRL, USD, EUR)
pub mod rates;      // Table des cotations (RateTable)
pub mod conversion; // Parsing du montant et conversion

// Re-export des structures principales pour simplifier les imports
// On peut faire : use conversor::models::RateTable;
pub use currency::Currency;
pub use rates::RateTable;
pub use conversion::{convert, format_amount, ConversionResult, ConvertError};
