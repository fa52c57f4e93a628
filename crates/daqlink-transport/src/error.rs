use daqlink_frame::FrameError;

/// Failures of one request/response exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The codec aborted during the send phase.
    #[error("send phase aborted")]
    SendFailed,

    /// A non-zero byte arrived while the line should have been quiet.
    #[error("silence frame disrupted")]
    SilenceViolation,

    /// The peer never produced a tagged length header.
    #[error("no response header from peer")]
    Timeout,

    /// Every attempt of a retried exchange failed.
    #[error("gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// The peer answered a line request with an error marker.
    #[error("{0}")]
    Command(String),

    /// The peer completed the exchange with a zero-length body.
    #[error("peer returned an empty response")]
    EmptyResponse,

    /// Frame-level rejection, typically an oversized request body.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, TransportError>;
