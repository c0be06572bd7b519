//! Translation error types.
//!
//! Two kinds of errors can occur while translating: definition errors
//! (duplicate symbols, raised while pass 1 builds the namespace) and
//! syntax/type errors (raised while pass 2 emits C). The pass driver
//! decides per pass which kind is reported and which is suppressed.

/// Error type for translation operations.
///
/// This allows proper error propagation using `?` for both translation
/// errors (bad source programs) and formatting errors (write failures
/// into the output buffer).
#[derive(Debug)]
pub enum TranslateError {
    /// A duplicate-definition error detected while pass 1 builds the
    /// symbol table.
    Definition(String),
    /// A syntax or type error detected while parsing a statement or
    /// expression. Only authoritative in pass 2.
    Syntax(String),
    /// A formatting error when writing generated C
    Format(std::fmt::Error),
}

impl TranslateError {
    /// Shorthand for the generic "this statement does not parse" error.
    pub fn syntax() -> Self {
        TranslateError::Syntax("syntax error".to_string())
    }

    /// True for pass-1 (definition) errors.
    pub fn is_definition(&self) -> bool {
        matches!(self, TranslateError::Definition(_))
    }
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::Definition(s) => write!(f, "{}", s),
            TranslateError::Syntax(s) => write!(f, "{}", s),
            TranslateError::Format(e) => write!(f, "output generation error: {}", e),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<std::fmt::Error> for TranslateError {
    fn from(e: std::fmt::Error) -> Self {
        TranslateError::Format(e)
    }
}

/// Result alias used throughout the translator.
pub type Result<T> = std::result::Result<T, TranslateError>;
