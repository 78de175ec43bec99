//! Render error taxonomy.

use std::fmt;

use crate::i18n::Translator;

/// Message shown to users for failures that carry no safe message of their own.
pub const GENERIC_ERROR_MESSAGE: &str = "A non-recoverable error occurred";

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Translation domain a recoverable message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// Raised by the region clients themselves.
    Client,
    /// Raised by the data layer.
    Storage,
}

impl ErrorDomain {
    /// Translation domain name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised while preparing or rendering a region.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Expected condition with a message that is safe to show to users.
    #[error("{message}")]
    Recoverable { domain: ErrorDomain, message: String },

    /// The template engine failed.
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl RenderError {
    /// Create a recoverable error.
    pub fn recoverable(domain: ErrorDomain, message: impl Into<String>) -> Self {
        Self::Recoverable {
            domain,
            message: message.into(),
        }
    }

    /// Recoverable error in the client domain.
    pub fn client(message: impl Into<String>) -> Self {
        Self::recoverable(ErrorDomain::Client, message)
    }

    /// Recoverable error in the storage domain.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::recoverable(ErrorDomain::Storage, message)
    }

    /// Check if the error carries a user-facing message.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable { .. })
    }

    /// Localized message for the error list shown in templates.
    ///
    /// Only recoverable errors expose their own text; everything else maps
    /// to the generic message.
    pub fn user_message(&self, translator: &dyn Translator) -> String {
        match self {
            Self::Recoverable { domain, message } => translator.translate(domain.as_str(), message),
            _ => translator.translate(ErrorDomain::Client.as_str(), GENERIC_ERROR_MESSAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Catalog;

    #[test]
    fn test_recoverable_message_is_translated() {
        let catalog = Catalog::new().with("storage", "Item not found", "Artikel nicht gefunden");
        let err = RenderError::storage("Item not found");

        assert!(err.is_recoverable());
        assert_eq!(err.user_message(&catalog), "Artikel nicht gefunden");
    }

    #[test]
    fn test_domains_map_to_translation_domains() {
        assert_eq!(RenderError::client("x").to_string(), "x");
        assert!(matches!(
            RenderError::storage("x"),
            RenderError::Recoverable { domain: ErrorDomain::Storage, .. }
        ));
        assert_eq!(ErrorDomain::Client.as_str(), "client");
        assert_eq!(ErrorDomain::Storage.as_str(), "storage");
    }

    #[test]
    fn test_unexpected_error_hides_details() {
        let err = RenderError::from(anyhow::anyhow!("connection reset by peer"));

        assert!(!err.is_recoverable());
        assert_eq!(err.user_message(&Catalog::new()), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_template_error_hides_details() {
        let err = RenderError::Template("variable `x` not found".to_string());
        assert_eq!(err.user_message(&Catalog::new()), GENERIC_ERROR_MESSAGE);
    }
}
