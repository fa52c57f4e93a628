/// Frame-level rejections.
///
/// Flow-control failures during a transfer surface as terminal
/// [`CodecState`](crate::CodecState) values instead, so the codec can be
/// driven from contexts where returning early is not an option.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The body exceeds the 15-bit length field.
    #[error("frame body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
