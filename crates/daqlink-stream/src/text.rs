use daqlink_frame::Fifo;

use crate::error::{Result, StreamError};
use crate::value::ValueStream;

/// Token delimiter on the textual wire.
const MARKER: u8 = b' ';

/// Space-delimited textual value stream over a [`Fifo`].
///
/// Reads consume the FIFO front: leading marker bytes are skipped, then
/// bytes accumulate until the next marker or buffer end. Writes append the
/// formatted token directly with no separator: the wire protocol needs
/// exact output, so the caller controls spacing.
pub struct TextStream<'a> {
    fifo: &'a mut Fifo,
}

impl<'a> TextStream<'a> {
    pub fn new(fifo: &'a mut Fifo) -> Self {
        Self { fifo }
    }

    fn fetch_token(&mut self) -> Result<String> {
        let mut token = Vec::new();
        while let Some(byte) = self.fifo.pop() {
            if byte == MARKER {
                if token.is_empty() {
                    continue; // leading markers are skipped
                }
                break;
            }
            token.push(byte);
        }
        if token.is_empty() {
            return Err(StreamError::Empty);
        }
        Ok(String::from_utf8_lossy(&token).into_owned())
    }

    fn parse_int(token: &str, kind: &'static str) -> Result<i64> {
        let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16)
        } else {
            token.parse::<i64>()
        };
        parsed.map_err(|_| StreamError::InvalidToken {
            token: token.to_owned(),
            kind,
        })
    }
}

impl ValueStream for TextStream<'_> {
    fn read_bool(&mut self) -> Result<bool> {
        let token = self.fetch_token()?;
        let first = token.as_bytes()[0];
        if first.is_ascii_digit() {
            return Ok(first != b'0');
        }
        match token.as_str() {
            "true" | "True" => Ok(true),
            "false" | "False" => Ok(false),
            _ => Err(StreamError::InvalidToken { token, kind: "bool" }),
        }
    }

    fn read_i32(&mut self) -> Result<i32> {
        let token = self.fetch_token()?;
        let wide = Self::parse_int(&token, "i32")?;
        i32::try_from(wide).map_err(|_| StreamError::InvalidToken { token, kind: "i32" })
    }

    fn read_u32(&mut self) -> Result<u32> {
        let token = self.fetch_token()?;
        let wide = Self::parse_int(&token, "u32")?;
        u32::try_from(wide).map_err(|_| StreamError::InvalidToken { token, kind: "u32" })
    }

    fn read_f32(&mut self) -> Result<f32> {
        let token = self.fetch_token()?;
        token
            .parse::<f32>()
            .map_err(|_| StreamError::InvalidToken { token, kind: "f32" })
    }

    fn read_string(&mut self) -> Result<String> {
        self.fetch_token()
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.fifo.push(if value { b'1' } else { b'0' });
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.fifo.extend_from_slice(value.to_string().as_bytes());
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.fifo.extend_from_slice(value.to_string().as_bytes());
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        // `Display` for f32 is locale-independent and round-trips.
        self.fifo.extend_from_slice(value.to_string().as_bytes());
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.fifo.extend_from_slice(value.as_bytes());
        Ok(())
    }
}
