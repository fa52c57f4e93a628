//! SPI silence-frame protocol stack.
//!
//! A raw, clocked SPI byte stream carries no framing signal and no length
//! side channel; this workspace layers reliable request/response messaging
//! on top of it and exposes board operations as named get/set access
//! points over a plain-text line protocol and a JSON bulk protocol.
//!
//! The member crates split along the natural seams:
//! - [`daqlink_frame`]: the silence-frame flow-control codec and the
//!   [`Fifo`] byte buffer.
//! - [`daqlink_stream`]: textual and JSON value streams over one
//!   read/write contract.
//! - [`daqlink_dispatch`]: command registry, line parser and the JSON
//!   bulk dispatcher.
//! - [`daqlink_transport`]: the blocking master exchange and the
//!   interrupt-fed board link.
//!
//! This crate re-exports the public surface and adds [`BoardSession`],
//! the update-loop glue that connects the board link to the line parser.

pub mod session;

pub use daqlink_frame::{
    CodecConfig, CodecState, Fifo, FrameError, SyncCodec, DEFAULT_RECV_TIMEOUT_STEPS,
    DEFAULT_SILENCE_LEN, MAX_BODY_LEN,
};
pub use daqlink_stream::{JsonStream, StreamError, StreamValue, TextStream, ValueStream};
pub use daqlink_dispatch::{
    name_hash, CallContext, CallDescr, CallHandler, CallType, CmdRegistry, DispatchError,
    JsonDispatcher, LinePort, Selector, Setting, TERMINATOR,
};
pub use daqlink_transport::{
    board_link, send_frame, BoardReceiver, IrqHandle, MasterConfig, SlaveBus, SpiBus, SpiMaster,
    TransportError,
};

pub use session::BoardSession;
