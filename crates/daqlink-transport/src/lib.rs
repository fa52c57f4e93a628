//! Transport adapters binding the frame codec to an SPI link.
//!
//! Two sides, two execution models:
//! - [`SpiMaster`] drives a blocking full-duplex bus from the host: assert
//!   chip select, stream the request out through the codec, clock the
//!   response back in, with wall-clock retry on top.
//! - [`board_link`] splits the board receive path into an interrupt-fed
//!   [`IrqHandle`] and a main-loop [`BoardReceiver`]; completed frames move
//!   between them by a buffer swap under a short critical section.
//!
//! The platform supplies the actual byte transfer through the [`SpiBus`]
//! and [`SlaveBus`] traits; everything here is hardware-agnostic.

pub mod board;
pub mod error;
pub mod master;
pub mod traits;

pub use board::{board_link, send_frame, BoardReceiver, IrqHandle};
pub use error::{Result, TransportError};
pub use master::{MasterConfig, SpiMaster};
pub use traits::{SlaveBus, SpiBus};
