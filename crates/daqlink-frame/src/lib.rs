//! Silence-frame flow control for clocked SPI byte streams.
//!
//! This is the core value-add layer of daqlink. The SPI link carries no
//! framing signal and no message-length side channel, so every transfer is
//! framed by convention:
//! - A run of zero bytes (the "silence frame") marking transfer start
//! - A 2-byte big-endian length with bit 7 of the high byte set
//! - The message body, exactly `length` bytes
//!
//! The codec is a symmetric state machine fed one byte per call, so it works
//! identically from a blocking master loop and from an interrupt handler.

pub mod codec;
pub mod error;
pub mod fifo;

pub use codec::{
    CodecConfig, CodecState, SyncCodec, DEFAULT_RECV_TIMEOUT_STEPS, DEFAULT_SILENCE_LEN,
    MAX_BODY_LEN,
};
pub use error::{FrameError, Result};
pub use fifo::Fifo;
