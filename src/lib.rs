// ============================================================================
// Conversor - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Client de l'API de cotations
pub mod app;     // État de l'application
pub mod config;  // Configuration (variables d'environnement)
pub mod models;  // Devises, cotations, conversion
pub mod refresh; // Rafraîchissement périodique des cotations
pub mod session; // Session utilisateur
pub mod ui;      // Interface utilisateur
