use bytes::{Buf, BufMut, BytesMut};

const INITIAL_CAPACITY: usize = 256;

/// The byte queue both codec directions stream through.
///
/// Sending drains bytes from the front; receiving and response building
/// append at the back. The same type backs the token parser of the
/// formatted stream layer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Fifo {
    buf: BytesMut,
}

impl Fifo {
    /// Create an empty FIFO.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Create a FIFO preloaded with `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(bytes),
        }
    }

    /// Number of bytes currently queued.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` if no bytes are queued.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append one byte at the back.
    pub fn push(&mut self, byte: u8) {
        self.buf.put_u8(byte);
    }

    /// Remove and return the front byte, if any.
    pub fn pop(&mut self) -> Option<u8> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.buf.get_u8())
        }
    }

    /// Append a run of bytes at the back.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Drop all queued bytes.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// The queued bytes, front first.
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Consume the FIFO and return the queued bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

impl From<&[u8]> for Fifo {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl From<Vec<u8>> for Fifo {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            buf: BytesMut::from(bytes.as_slice()),
        }
    }
}

impl From<&str> for Fifo {
    fn from(text: &str) -> Self {
        Self::from_slice(text.as_bytes())
    }
}
