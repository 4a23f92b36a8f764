//! Errors produced while parsing address strings

/// Errors related to address parsing
#[derive(Debug, thiserror::Error)]
pub enum AddrParseError {
    /// Address has the wrong number of dot-separated parts
    #[error("invalid resource address: {0} (expected [data.]TYPE.NAME)")]
    InvalidResourceAddress(String),

    /// Empty name component
    #[error("address contains empty component")]
    EmptyComponent,

    /// Invalid component characters
    #[error("invalid address component: {0} (must be alphanumeric, underscore or dash)")]
    InvalidComponent(String),
}
