use serde_json::{Number, Value};

use crate::error::{Result, StreamError};
use crate::value::ValueStream;

/// JSON value stream over a single `serde_json::Value` slot.
///
/// Reads coerce directly against the slot's primitive kind, with no token
/// delimiting. Writes replace the slot, so a get handler's output lands
/// exactly where the bulk dispatcher mounted the stream in its response
/// tree.
pub struct JsonStream<'a> {
    slot: &'a mut Value,
}

impl<'a> JsonStream<'a> {
    pub fn new(slot: &'a mut Value) -> Self {
        Self { slot }
    }
}

impl ValueStream for JsonStream<'_> {
    fn read_bool(&mut self) -> Result<bool> {
        match &*self.slot {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_i64() != Some(0)),
            _ => Err(StreamError::TypeMismatch { kind: "bool" }),
        }
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.slot
            .as_i64()
            .and_then(|wide| i32::try_from(wide).ok())
            .ok_or(StreamError::TypeMismatch { kind: "i32" })
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.slot
            .as_u64()
            .and_then(|wide| u32::try_from(wide).ok())
            .ok_or(StreamError::TypeMismatch { kind: "u32" })
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.slot
            .as_f64()
            .map(|wide| wide as f32)
            .ok_or(StreamError::TypeMismatch { kind: "f32" })
    }

    fn read_string(&mut self) -> Result<String> {
        match &*self.slot {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            _ => Err(StreamError::TypeMismatch { kind: "string" }),
        }
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        *self.slot = Value::Bool(value);
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        *self.slot = Value::Number(value.into());
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        *self.slot = Value::Number(value.into());
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        let number = Number::from_f64(f64::from(value)).ok_or(StreamError::NonFinite)?;
        *self.slot = Value::Number(number);
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        *self.slot = Value::String(value.to_owned());
        Ok(())
    }
}
