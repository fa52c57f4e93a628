/// Errors raised while extracting or formatting stream values.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The stream ran out before a value could be extracted.
    #[error("no value available in the stream")]
    Empty,

    /// A textual token could not be parsed as the requested type.
    #[error("cannot parse {token:?} as {kind}")]
    InvalidToken { token: String, kind: &'static str },

    /// A JSON value has the wrong primitive kind for the requested type.
    #[error("JSON value is not a {kind}")]
    TypeMismatch { kind: &'static str },

    /// A non-finite float has no JSON representation.
    #[error("non-finite float cannot be written as JSON")]
    NonFinite,
}

pub type Result<T> = std::result::Result<T, StreamError>;
