use crate::fifo::Fifo;

/// Largest body the 15-bit length field can describe.
pub const MAX_BODY_LEN: usize = 0x7fff;

/// Default number of zero bytes in the silence run.
pub const DEFAULT_SILENCE_LEN: u32 = 4;

/// Default number of clock steps to wait for the tagged length byte.
pub const DEFAULT_RECV_TIMEOUT_STEPS: u32 = 10_000;

/// Flow-control state, one active instance per direction per transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecState {
    /// Inactive, no transfer in progress.
    Halted,

    /// Emitting the silence run.
    SendSilence,
    /// Emitting the tagged high length byte.
    SendLenHi,
    /// Emitting the low length byte.
    SendLenLo,
    /// Emitting body bytes.
    SendBody,
    /// Send phase finished successfully.
    SendDone,

    /// Waiting out the peer's silence run.
    RecvSilence,
    /// Waiting for the tagged high length byte.
    RecvLenHi,
    /// Waiting for the low length byte.
    RecvLenLo,
    /// Accumulating body bytes.
    RecvBody,
    /// Receive phase finished successfully.
    RecvDone,

    /// The silence run was disrupted by a non-zero byte. Terminal.
    ErrLine,
    /// The tagged length byte never arrived. Terminal.
    ErrTimeout,
}

impl CodecState {
    /// `true` for the terminal error states.
    pub fn is_error(self) -> bool {
        matches!(self, CodecState::ErrLine | CodecState::ErrTimeout)
    }
}

/// Framing constants, owned by the codec instance.
///
/// `silence_len` must be at least 4 for the peer to reliably spot the
/// transfer start; `recv_timeout_steps` bounds the silence-to-length wait
/// in iterations, so no wall clock is needed inside the codec.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Zero bytes sent/expected before the length header.
    pub silence_len: u32,
    /// Clock steps to wait for the tagged length byte before giving up.
    pub recv_timeout_steps: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            silence_len: DEFAULT_SILENCE_LEN,
            recv_timeout_steps: DEFAULT_RECV_TIMEOUT_STEPS,
        }
    }
}

/// The symmetric send/receive flow-control state machine.
///
/// Callers supply or consume exactly one byte per step, so the codec works
/// unchanged whether bytes move through a blocking transfer loop or an
/// interrupt register read. Terminal states (`SendDone`, `RecvDone`,
/// `ErrLine`, `ErrTimeout`) persist until [`start`](Self::start) resets the
/// machine.
#[derive(Debug)]
pub struct SyncCodec {
    state: CodecState,
    step_cnt: u32,
    target_len: usize,
    config: CodecConfig,
}

impl SyncCodec {
    /// Create a halted codec with default framing constants.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Create a halted codec with explicit framing constants.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            state: CodecState::Halted,
            step_cnt: 0,
            target_len: 0,
            config,
        }
    }

    /// Reset counters and enter `state`.
    ///
    /// Valid entry points are `SendSilence`, `RecvSilence`, `RecvLenHi`
    /// (when a hardware start-of-frame signal replaces the silence wait)
    /// and `Halted`.
    pub fn start(&mut self, state: CodecState) {
        self.step_cnt = 0;
        self.target_len = 0;
        self.state = state;
    }

    /// Current state.
    pub fn state(&self) -> CodecState {
        self.state
    }

    /// `true` once a terminal error state was entered.
    pub fn is_bad(&self) -> bool {
        self.state.is_error()
    }

    /// Framing constants in effect.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Produce the next wire byte of the send phase.
    ///
    /// Returns `None` once the body is exhausted (state `SendDone`) or when
    /// the codec is not in a send state. `msg` is drained from the front;
    /// its length when the header goes out is the transmitted length, so
    /// the caller must not touch `msg` mid-transfer.
    pub fn step_send(&mut self, msg: &mut Fifo) -> Option<u8> {
        match self.state {
            CodecState::SendSilence => {
                self.step_cnt += 1;
                if self.step_cnt >= self.config.silence_len {
                    self.step_cnt = 0;
                    self.state = CodecState::SendLenHi;
                }
                Some(0)
            }
            CodecState::SendLenHi => {
                self.state = CodecState::SendLenLo;
                Some(((msg.len() >> 8) as u8) | 0x80)
            }
            CodecState::SendLenLo => {
                self.state = CodecState::SendBody;
                Some((msg.len() & 0xff) as u8)
            }
            CodecState::SendBody => match msg.pop() {
                Some(byte) => Some(byte),
                None => {
                    self.state = CodecState::SendDone;
                    None
                }
            },
            _ => None,
        }
    }

    /// Consume one received byte.
    ///
    /// Returns `false` when the transfer finished, successfully
    /// (`RecvDone`) or not (`ErrLine`/`ErrTimeout`); check
    /// [`state`](Self::state) to tell which. Body bytes accumulate at the
    /// back of `msg`.
    pub fn step_recv(&mut self, byte: u8, msg: &mut Fifo) -> bool {
        match self.state {
            CodecState::RecvSilence => {
                // Collision check: the line must stay quiet.
                if byte != 0 {
                    tracing::trace!(byte, "silence frame disrupted");
                    self.state = CodecState::ErrLine;
                    return false;
                }
                self.step_cnt += 1;
                if self.step_cnt >= self.config.silence_len {
                    self.step_cnt = 0;
                    self.state = CodecState::RecvLenHi;
                }
                true
            }
            CodecState::RecvLenHi => {
                if byte & 0x80 != 0 {
                    self.target_len = ((byte & 0x7f) as usize) << 8;
                    self.state = CodecState::RecvLenLo;
                    return true;
                }
                self.step_cnt += 1;
                if self.step_cnt > self.config.recv_timeout_steps {
                    tracing::trace!(
                        steps = self.config.recv_timeout_steps,
                        "no length header from peer"
                    );
                    self.state = CodecState::ErrTimeout;
                    return false;
                }
                true
            }
            CodecState::RecvLenLo => {
                self.target_len |= byte as usize;
                if self.target_len == 0 {
                    self.state = CodecState::RecvDone;
                    return false;
                }
                self.state = CodecState::RecvBody;
                true
            }
            CodecState::RecvBody => {
                msg.push(byte);
                if msg.len() >= self.target_len {
                    self.state = CodecState::RecvDone;
                    return false;
                }
                true
            }
            _ => false,
        }
    }
}

impl Default for SyncCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(body: &[u8]) -> Vec<u8> {
        let mut codec = SyncCodec::new();
        let mut msg = Fifo::from_slice(body);
        let mut wire = Vec::new();
        codec.start(CodecState::SendSilence);
        while let Some(byte) = codec.step_send(&mut msg) {
            wire.push(byte);
        }
        assert_eq!(codec.state(), CodecState::SendDone);
        wire
    }

    fn decode(wire: &[u8]) -> (CodecState, Fifo) {
        let mut codec = SyncCodec::new();
        let mut msg = Fifo::new();
        codec.start(CodecState::RecvSilence);
        for &byte in wire {
            if !codec.step_recv(byte, &mut msg) {
                break;
            }
        }
        (codec.state(), msg)
    }

    #[test]
    fn roundtrip_short_body() {
        let body = b"ARMID>\n";
        let wire = encode(body);

        assert_eq!(&wire[..4], &[0, 0, 0, 0]);
        assert_eq!(wire[4], 0x80);
        assert_eq!(wire[5], body.len() as u8);

        let (state, msg) = decode(&wire);
        assert_eq!(state, CodecState::RecvDone);
        assert_eq!(msg.as_slice(), body);
    }

    #[test]
    fn roundtrip_empty_body() {
        let wire = encode(b"");
        assert_eq!(wire, vec![0, 0, 0, 0, 0x80, 0x00]);

        let (state, msg) = decode(&wire);
        assert_eq!(state, CodecState::RecvDone);
        assert!(msg.is_empty());
    }

    #[test]
    fn roundtrip_longest_body() {
        let body = vec![0xA5u8; MAX_BODY_LEN];
        let wire = encode(&body);
        assert_eq!(wire[4], 0x80 | 0x7f);
        assert_eq!(wire[5], 0xff);
        assert_eq!(wire.len(), 4 + 2 + MAX_BODY_LEN);

        let (state, msg) = decode(&wire);
        assert_eq!(state, CodecState::RecvDone);
        assert_eq!(msg.as_slice(), body.as_slice());
    }

    #[test]
    fn roundtrip_body_with_zero_bytes() {
        let body = [0u8, 1, 0, 2, 0];
        let (state, msg) = decode(&encode(&body));
        assert_eq!(state, CodecState::RecvDone);
        assert_eq!(msg.as_slice(), body);
    }

    #[test]
    fn silence_violation_is_terminal() {
        let mut codec = SyncCodec::new();
        let mut msg = Fifo::new();
        codec.start(CodecState::RecvSilence);

        assert!(codec.step_recv(0, &mut msg));
        assert!(!codec.step_recv(0x42, &mut msg));
        assert_eq!(codec.state(), CodecState::ErrLine);
        assert!(codec.is_bad());

        // Terminal until reset.
        assert!(!codec.step_recv(0, &mut msg));
        assert!(codec.is_bad());

        codec.start(CodecState::RecvSilence);
        assert!(!codec.is_bad());
    }

    #[test]
    fn timeout_after_configured_steps() {
        let config = CodecConfig {
            recv_timeout_steps: 16,
            ..CodecConfig::default()
        };
        let mut codec = SyncCodec::with_config(config);
        let mut msg = Fifo::new();
        codec.start(CodecState::RecvSilence);

        let mut steps = 0u32;
        while codec.step_recv(0, &mut msg) {
            steps += 1;
            assert!(steps < 1000, "codec never timed out");
        }
        assert_eq!(codec.state(), CodecState::ErrTimeout);
        assert!(codec.is_bad());
    }

    #[test]
    fn untagged_bytes_do_not_start_length() {
        let mut codec = SyncCodec::new();
        let mut msg = Fifo::new();
        codec.start(CodecState::RecvLenHi);

        // Bytes without bit 7 keep the codec waiting for the header.
        assert!(codec.step_recv(0x7f, &mut msg));
        assert_eq!(codec.state(), CodecState::RecvLenHi);

        assert!(codec.step_recv(0x80 | 0x00, &mut msg));
        assert!(codec.step_recv(1, &mut msg));
        assert!(!codec.step_recv(b'x', &mut msg));
        assert_eq!(codec.state(), CodecState::RecvDone);
        assert_eq!(msg.as_slice(), b"x");
    }

    #[test]
    fn start_of_frame_entry_skips_silence() {
        // The board enters at RecvLenHi on the chip-select edge.
        let mut codec = SyncCodec::new();
        let mut msg = Fifo::new();
        codec.start(CodecState::RecvLenHi);

        assert!(codec.step_recv(0x80, &mut msg));
        assert!(codec.step_recv(2, &mut msg));
        assert!(codec.step_recv(b'o', &mut msg));
        assert!(!codec.step_recv(b'k', &mut msg));
        assert_eq!(codec.state(), CodecState::RecvDone);
        assert_eq!(msg.as_slice(), b"ok");
    }

    #[test]
    fn send_steps_halt_outside_send_states() {
        let mut codec = SyncCodec::new();
        let mut msg = Fifo::from_slice(b"data");
        assert_eq!(codec.step_send(&mut msg), None);
        codec.start(CodecState::RecvSilence);
        assert_eq!(codec.step_send(&mut msg), None);
    }

    #[test]
    fn zero_length_receive_completes_without_body() {
        let mut codec = SyncCodec::new();
        let mut msg = Fifo::new();
        codec.start(CodecState::RecvLenHi);

        assert!(codec.step_recv(0x80, &mut msg));
        assert!(!codec.step_recv(0, &mut msg));
        assert_eq!(codec.state(), CodecState::RecvDone);
        assert!(msg.is_empty());
    }

    #[test]
    fn configured_silence_run_length() {
        let config = CodecConfig {
            silence_len: 6,
            ..CodecConfig::default()
        };
        let mut codec = SyncCodec::with_config(config);
        let mut msg = Fifo::from_slice(b"z");
        let mut wire = Vec::new();
        codec.start(CodecState::SendSilence);
        while let Some(byte) = codec.step_send(&mut msg) {
            wire.push(byte);
        }
        assert_eq!(&wire[..6], &[0u8; 6]);
        assert_eq!(wire[6], 0x80);
    }
}
