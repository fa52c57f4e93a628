use std::thread;
use std::time::Duration;

use daqlink_frame::{CodecConfig, CodecState, Fifo, FrameError, SyncCodec, MAX_BODY_LEN};

use crate::error::{Result, TransportError};
use crate::traits::SpiBus;

/// Timing and retry knobs of the master exchange.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// Pause after each chip-select edge, giving the peer time to arm its
    /// receive path.
    pub cs_settle: Duration,
    /// Attempts per retried exchange.
    pub retry_limit: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
    /// Framing constants shared with the peer.
    pub codec: CodecConfig,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            cs_settle: Duration::from_millis(20),
            retry_limit: 3,
            retry_delay: Duration::from_millis(10),
            codec: CodecConfig::default(),
        }
    }
}

/// Host-side half-duplex exchange over a blocking SPI bus.
///
/// One outstanding request at a time: the full request frame is clocked
/// out, then the bus is clocked with zeros until the response frame
/// completes. Chip select brackets the whole exchange.
pub struct SpiMaster<B: SpiBus> {
    bus: B,
    config: MasterConfig,
}

impl<B: SpiBus> SpiMaster<B> {
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, MasterConfig::default())
    }

    pub fn with_config(bus: B, config: MasterConfig) -> Self {
        Self { bus, config }
    }

    /// The underlying bus, for platform-specific side channels.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// One request/response exchange.
    pub fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        if request.len() > MAX_BODY_LEN {
            return Err(FrameError::BodyTooLarge {
                size: request.len(),
                max: MAX_BODY_LEN,
            }
            .into());
        }

        self.bus.set_cs(true);
        thread::sleep(self.config.cs_settle);
        let result = self.transfer_frames(request);
        self.bus.set_cs(false);
        thread::sleep(self.config.cs_settle);

        match &result {
            Ok(response) => {
                tracing::trace!(sent = request.len(), received = response.len(), "exchange done");
            }
            Err(err) => tracing::trace!(%err, "exchange failed"),
        }
        result
    }

    fn transfer_frames(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        let mut codec = SyncCodec::with_config(self.config.codec.clone());
        let mut msg = Fifo::from_slice(request);

        // Send phase. Bytes shifted in while we still drive the request
        // are line noise and are dropped.
        codec.start(CodecState::SendSilence);
        while let Some(byte) = codec.step_send(&mut msg) {
            self.bus.transfer(byte);
        }
        if codec.state() != CodecState::SendDone {
            return Err(TransportError::SendFailed);
        }

        // One extra clock byte lets the peer latch the frame tail, then
        // drain the controller before turning the line around.
        self.bus.transfer(0);
        self.bus.wait_done();

        // Receive phase: the peer only shifts data while we clock.
        let mut response = Fifo::new();
        codec.start(CodecState::RecvSilence);
        loop {
            let byte = self.bus.transfer(0);
            if !codec.step_recv(byte, &mut response) {
                break;
            }
        }
        match codec.state() {
            CodecState::RecvDone => Ok(response.into_vec()),
            CodecState::ErrLine => Err(TransportError::SilenceViolation),
            _ => Err(TransportError::Timeout),
        }
    }

    /// Re-issues [`exchange`](Self::exchange) until it succeeds or the
    /// configured attempt limit is reached.
    pub fn exchange_with_retry(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.exchange(request) {
                Ok(response) => return Ok(response),
                Err(err) if attempts < self.config.retry_limit => {
                    tracing::warn!(%err, attempts, "exchange failed, retrying");
                    thread::sleep(self.config.retry_delay);
                }
                Err(err) => {
                    tracing::warn!(%err, attempts, "exchange gave up");
                    return Err(TransportError::RetriesExhausted { attempts });
                }
            }
        }
    }

    /// `NAME>\n` line request; returns the response payload without the
    /// terminator.
    pub fn request_get(&mut self, name: &str) -> Result<String> {
        self.request_line(&format!("{name}>\n"))
    }

    /// `NAME<VALUE\n` line request; returns the read-back payload without
    /// the terminator.
    pub fn request_set(&mut self, name: &str, value: &str) -> Result<String> {
        self.request_line(&format!("{name}<{value}\n"))
    }

    fn request_line(&mut self, line: &str) -> Result<String> {
        let raw = self.exchange_with_retry(line.as_bytes())?;
        if raw.is_empty() {
            return Err(TransportError::EmptyResponse);
        }
        let text = String::from_utf8_lossy(&raw);
        let text = text.trim_end_matches(char::from(b'\n'));
        if let Some(reason) = text.strip_prefix('!') {
            return Err(TransportError::Command(reason.to_owned()));
        }
        Ok(text.to_owned())
    }
}
