use std::sync::Arc;

use daqlink_dispatch::{CmdRegistry, LinePort};
use daqlink_frame::CodecConfig;
use daqlink_transport::{board_link, send_frame, BoardReceiver, IrqHandle, Result, SlaveBus};

/// Board-side glue between the receive link and the line parser.
///
/// The firmware main loop calls [`update`](Self::update) each iteration;
/// interrupts keep feeding the returned [`IrqHandle`] independently.
pub struct BoardSession<B: SlaveBus> {
    receiver: BoardReceiver,
    port: LinePort,
    bus: B,
    codec: CodecConfig,
}

impl<B: SlaveBus> BoardSession<B> {
    /// Wires a registry and a transmit bus into a session; the returned
    /// [`IrqHandle`] goes to the interrupt layer.
    pub fn new(registry: Arc<CmdRegistry>, bus: B, codec: CodecConfig) -> (IrqHandle, Self) {
        let (irq, receiver) = board_link(codec.clone());
        (
            irq,
            Self {
                receiver,
                port: LinePort::new(registry),
                bus,
                codec,
            },
        )
    }

    /// One main-loop iteration: drain a completed request frame through
    /// the parser and transmit every response it produced.
    pub fn update(&mut self) -> Result<()> {
        let Some(frame) = self.receiver.poll() else {
            return Ok(());
        };
        let mut responses = Vec::new();
        while let Some(byte) = frame.pop() {
            if let Some(response) = self.port.push_byte(byte) {
                responses.push(response);
            }
        }
        for mut response in responses {
            tracing::trace!(len = response.len(), "sending response frame");
            send_frame(&mut self.bus, &mut response, &self.codec)?;
        }
        Ok(())
    }
}
