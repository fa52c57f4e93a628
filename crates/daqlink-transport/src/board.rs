use std::mem;
use std::sync::{Arc, Mutex};

use daqlink_frame::{CodecConfig, CodecState, Fifo, FrameError, SyncCodec, MAX_BODY_LEN};

use crate::error::{Result, TransportError};
use crate::traits::SlaveBus;

/// State shared between the interrupt feed and the polling loop.
struct RecvShared {
    codec: SyncCodec,
    active: Fifo,
}

/// Interrupt-side feed of the board receive path.
///
/// `frame_start` is called from the chip-select edge, `on_byte` from the
/// data-register interrupt. Both take the shared lock for one codec step
/// only, so the main loop is never blocked for longer than that.
pub struct IrqHandle {
    shared: Arc<Mutex<RecvShared>>,
}

impl IrqHandle {
    /// Hardware start-of-frame: arm the codec directly at the length
    /// header, no silence wait needed.
    pub fn frame_start(&self) {
        let mut shared = self.shared.lock().expect("receive lock poisoned");
        shared.active.clear();
        shared.codec.start(CodecState::RecvLenHi);
    }

    /// Feed one received byte.
    pub fn on_byte(&self, byte: u8) {
        let mut shared = self.shared.lock().expect("receive lock poisoned");
        let RecvShared { codec, active } = &mut *shared;
        codec.step_recv(byte, active);
    }
}

/// Main-loop side of the board receive path.
pub struct BoardReceiver {
    shared: Arc<Mutex<RecvShared>>,
    ready: Fifo,
}

impl BoardReceiver {
    /// Hands out the next completed frame, if any.
    ///
    /// The shared lock bounds only the buffer swap; the returned frame is
    /// private to this side and can be drained at leisure while the
    /// interrupt feed fills the next one.
    pub fn poll(&mut self) -> Option<&mut Fifo> {
        {
            let mut shared = self.shared.lock().expect("receive lock poisoned");
            if shared.codec.state() != CodecState::RecvDone {
                return None;
            }
            mem::swap(&mut shared.active, &mut self.ready);
            shared.active.clear();
            shared.codec.start(CodecState::Halted);
        }
        tracing::debug!(len = self.ready.len(), "frame handed off");
        Some(&mut self.ready)
    }
}

/// Builds the interrupt/main-loop pair of the board receive path.
pub fn board_link(config: CodecConfig) -> (IrqHandle, BoardReceiver) {
    let shared = Arc::new(Mutex::new(RecvShared {
        codec: SyncCodec::with_config(config),
        active: Fifo::new(),
    }));
    (
        IrqHandle {
            shared: Arc::clone(&shared),
        },
        BoardReceiver {
            shared,
            ready: Fifo::new(),
        },
    )
}

/// Blocking frame send from the board main loop.
///
/// The peer drives the clock, so `send_byte` only queues bytes; a full
/// queue reports back as [`TransportError::SendFailed`].
pub fn send_frame<B: SlaveBus + ?Sized>(
    bus: &mut B,
    msg: &mut Fifo,
    config: &CodecConfig,
) -> Result<()> {
    if msg.len() > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLarge {
            size: msg.len(),
            max: MAX_BODY_LEN,
        }
        .into());
    }
    let mut codec = SyncCodec::with_config(config.clone());
    codec.start(CodecState::SendSilence);
    while let Some(byte) = codec.step_send(msg) {
        if !bus.send_byte(byte) {
            tracing::warn!("transmit queue rejected a byte");
            return Err(TransportError::SendFailed);
        }
    }
    Ok(())
}
