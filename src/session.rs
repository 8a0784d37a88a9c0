// ============================================================================
// Session utilisateur
// ============================================================================
// Fournisseur d'identité vu par l'écran d'accueil : un nom à afficher et une
// déconnexion. L'authentification réelle (OAuth) reste externe ; la session
// locale prend le nom dans la configuration
// ============================================================================

use tracing::info;

/// Fournisseur d'identité / de session
///
/// CONCEPT RUST : Trait object
/// - App stocke un Box<dyn SessionProvider>
/// - Une implémentation OAuth pourrait remplacer LocalSession sans toucher à App
pub trait SessionProvider {
    /// Nom complet de l'utilisateur (None tant qu'il n'est pas connu)
    fn display_name(&self) -> Option<&str>;

    /// Vérifie si une session est active
    fn is_signed_in(&self) -> bool;

    /// Ouvre la session
    fn sign_in(&mut self);

    /// Ferme la session (fire-and-forget)
    fn sign_out(&mut self);
}

/// Session locale, sans fournisseur externe
#[derive(Debug, Clone, Default)]
pub struct LocalSession {
    user_name: Option<String>,
    signed_in: bool,
}

impl LocalSession {
    /// Crée une session fermée pour cet utilisateur
    pub fn new(user_name: Option<String>) -> Self {
        Self {
            user_name,
            signed_in: false,
        }
    }
}

impl SessionProvider for LocalSession {
    fn display_name(&self) -> Option<&str> {
        if self.signed_in {
            self.user_name.as_deref()
        } else {
            None
        }
    }

    fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    fn sign_in(&mut self) {
        self.signed_in = true;
        info!(user = ?self.user_name, "Session opened");
    }

    fn sign_out(&mut self) {
        self.signed_in = false;
        info!(user = ?self.user_name, "Session closed");
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_session_lifecycle() {
        let mut session = LocalSession::new(Some("Ana Souza".to_string()));
        assert!(!session.is_signed_in());
        assert_eq!(session.display_name(), None);

        session.sign_in();
        assert!(session.is_signed_in());
        assert_eq!(session.display_name(), Some("Ana Souza"));

        session.sign_out();
        assert!(!session.is_signed_in());
        assert_eq!(session.display_name(), None);
    }
}
