use std::sync::Arc;

use daqlink_frame::Fifo;
use daqlink_stream::TextStream;

use crate::descr::{CallDescr, CallType, Selector};
use crate::error::DispatchError;
use crate::registry::CmdRegistry;

/// End-of-request marker on the textual wire.
pub const TERMINATOR: u8 = b'\n';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortState {
    ReadingName,
    ReadingDirection,
    ReadingArgs,
    ProtocolError,
}

/// Byte-at-a-time parser for the line protocol.
///
/// Requests look like `ADC1>\n` (get) or `Gain<3\n` (set). The access
/// point name runs up to the `>`/`<` direction marker, arguments follow it
/// and the newline fires the dispatch. Failures produce a `!reason\n`
/// response instead of a value; a response line is emitted for every
/// terminator, so the link never stalls on a bad request.
pub struct LinePort {
    registry: Arc<CmdRegistry>,
    state: PortState,
    trimming: bool,
    name: Vec<u8>,
    call_type: CallType,
    input: Fifo,
}

impl LinePort {
    pub fn new(registry: Arc<CmdRegistry>) -> Self {
        Self {
            registry,
            state: PortState::ReadingName,
            trimming: true,
            name: Vec::new(),
            call_type: CallType::Get,
            input: Fifo::new(),
        }
    }

    fn reset(&mut self) {
        self.state = PortState::ReadingName;
        self.trimming = true;
        self.name.clear();
        self.input.clear();
    }

    fn finish(&mut self) -> Fifo {
        let mut output = Fifo::new();
        let result = if self.state == PortState::ReadingArgs {
            let mut in_stream = TextStream::new(&mut self.input);
            let mut out_stream = TextStream::new(&mut output);
            self.registry.call(CallDescr {
                selector: Selector::Name(String::from_utf8_lossy(&self.name).into_owned()),
                call_type: self.call_type,
                input: &mut in_stream,
                output: &mut out_stream,
            })
        } else {
            Err(DispatchError::Protocol)
        };
        if let Err(err) = result {
            // Partial output from a failed handler stays in place; the
            // error marker is appended after it.
            output.extend_from_slice(format!("!{err}").as_bytes());
        }
        output.push(TERMINATOR);
        self.reset();
        output
    }

    /// Feeds one byte; returns the response line once a terminator arrives.
    pub fn push_byte(&mut self, byte: u8) -> Option<Fifo> {
        if byte == TERMINATOR {
            return Some(self.finish());
        }
        if self.trimming {
            if byte == b' ' {
                return None;
            }
            self.trimming = false;
        }
        match self.state {
            PortState::ReadingName => match byte {
                b' ' | b'>' | b'<' => {
                    self.state = PortState::ReadingDirection;
                    self.trimming = true;
                    self.push_byte(byte)
                }
                _ => {
                    self.name.push(byte);
                    None
                }
            },
            PortState::ReadingDirection => {
                match byte {
                    b'>' => self.call_type = CallType::Get,
                    b'<' => self.call_type = CallType::Set,
                    _ => {
                        self.state = PortState::ProtocolError;
                        return None;
                    }
                }
                self.state = PortState::ReadingArgs;
                self.trimming = true;
                None
            }
            PortState::ReadingArgs => {
                self.input.push(byte);
                None
            }
            PortState::ProtocolError => None,
        }
    }

    /// Feeds a whole request and collects the responses it produced.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Vec<Fifo> {
        bytes.iter().filter_map(|&byte| self.push_byte(byte)).collect()
    }
}
