//! Command dispatch for daqlink: call-by-name/hash/index without runtime
//! reflection.
//!
//! Every board operation is a named access point with get and/or set
//! semantics, registered once at startup in a [`CmdRegistry`]. Protocol
//! front-ends translate their wire form into a uniform [`CallDescr`] and
//! hand it to the registry:
//! - [`LinePort`] parses `NAME>\n` / `NAME<VALUE\n` text lines
//! - [`JsonDispatcher`] walks a JSON request tree recursively, including
//!   the enumerate-all snapshot dump
//!
//! Handler failures never escape a front-end; they are converted to the
//! wire-level error markers (`!reason`, `{"error":{...}}`) before a
//! response is built.

pub mod bulk;
pub mod descr;
pub mod error;
pub mod handler;
pub mod line;
pub mod registry;

pub use bulk::JsonDispatcher;
pub use descr::{name_hash, CallDescr, CallType, Selector};
pub use error::{DispatchError, Result};
pub use handler::{CallContext, CallHandler, Setting};
pub use line::{LinePort, TERMINATOR};
pub use registry::CmdRegistry;
