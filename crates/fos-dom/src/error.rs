//! DOM operation errors

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found (or its arena slot was released)
    #[error("node not found")]
    NotFound,

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("hierarchy request error")]
    HierarchyRequest,

    /// Operation needs an element node
    #[error("node is not an element")]
    NotAnElement,

    /// Node is not a child of the given parent
    #[error("node is not a child")]
    NotAChild,

    /// Attribute or token name contains characters the DOM rejects
    #[error("invalid character in name '{0}'")]
    InvalidCharacter(String),

    /// Empty token passed to a token list
    #[error("token must not be empty")]
    EmptyToken,

    /// Unknown or malformed CSS property name
    #[error("'{0}' is not a valid CSS property name")]
    InvalidStyleProperty(String),

    /// Selector could not be parsed
    #[error("selector syntax error: {0}")]
    Syntax(String),
}
