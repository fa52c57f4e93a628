use daqlink_stream::StreamError;

/// Outcomes of a command invocation that did not produce a value.
///
/// The `Display` form of each variant is the exact reason string the
/// protocol front-ends put on the wire after the `!` marker.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No registry entry for the requested name, hash or index.
    #[error("obj_not_found!")]
    NotFound,

    /// A get request hit a handler without a getter.
    #[error(">_not_supported!")]
    GetNotSupported,

    /// A set request hit a handler without a setter.
    #[error("<_not_supported!")]
    SetNotSupported,

    /// Argument extraction from the input stream failed.
    #[error("parse_err!")]
    Parse(#[from] StreamError),

    /// The request body is not valid JSON.
    #[error("parse_err!")]
    Json(#[from] serde_json::Error),

    /// A malformed request line (missing direction, early terminator).
    #[error("protocol_error!")]
    Protocol,

    /// The target is temporarily rejecting calls (re-entrant bulk call).
    #[error("disabled!")]
    Disabled,

    /// A failure propagated out of the handler itself.
    #[error("{0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
