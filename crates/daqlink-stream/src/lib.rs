//! Formatted primitive-value streams for the daqlink command layer.
//!
//! Command handlers read and write primitives (bool, integers, float,
//! string) without knowing the wire representation. Two representations
//! implement the same [`ValueStream`] contract:
//! - [`TextStream`]: space-delimited textual tokens over a [`Fifo`],
//!   used by the plain-text line protocol
//! - [`JsonStream`]: direct coercion against a `serde_json::Value` slot,
//!   used by the JSON bulk dispatcher
//!
//! [`Fifo`]: daqlink_frame::Fifo

pub mod error;
pub mod json;
pub mod text;
pub mod value;

pub use error::{Result, StreamError};
pub use json::JsonStream;
pub use text::TextStream;
pub use value::{StreamValue, ValueStream};
