use crate::error::Result;

/// The four-primitive read/write contract shared by every stream mode.
///
/// Extraction failures return an error instead of poisoning the stream;
/// after an `Err` the remaining content is unspecified and the stream
/// should be discarded.
pub trait ValueStream {
    fn read_bool(&mut self) -> Result<bool>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_u32(&mut self) -> Result<u32>;
    fn read_f32(&mut self) -> Result<f32>;
    fn read_string(&mut self) -> Result<String>;

    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_u32(&mut self, value: u32) -> Result<()>;
    fn write_f32(&mut self, value: f32) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
}

/// A primitive that knows how to move itself through a [`ValueStream`].
///
/// This is the seam the generic get/set handler is built on: one type
/// parameter picks both the parse and the format direction.
pub trait StreamValue: Sized {
    fn read_from(stream: &mut dyn ValueStream) -> Result<Self>;
    fn write_to(&self, stream: &mut dyn ValueStream) -> Result<()>;
}

impl StreamValue for bool {
    fn read_from(stream: &mut dyn ValueStream) -> Result<Self> {
        stream.read_bool()
    }

    fn write_to(&self, stream: &mut dyn ValueStream) -> Result<()> {
        stream.write_bool(*self)
    }
}

impl StreamValue for i32 {
    fn read_from(stream: &mut dyn ValueStream) -> Result<Self> {
        stream.read_i32()
    }

    fn write_to(&self, stream: &mut dyn ValueStream) -> Result<()> {
        stream.write_i32(*self)
    }
}

impl StreamValue for u32 {
    fn read_from(stream: &mut dyn ValueStream) -> Result<Self> {
        stream.read_u32()
    }

    fn write_to(&self, stream: &mut dyn ValueStream) -> Result<()> {
        stream.write_u32(*self)
    }
}

impl StreamValue for f32 {
    fn read_from(stream: &mut dyn ValueStream) -> Result<Self> {
        stream.read_f32()
    }

    fn write_to(&self, stream: &mut dyn ValueStream) -> Result<()> {
        stream.write_f32(*self)
    }
}

impl StreamValue for String {
    fn read_from(stream: &mut dyn ValueStream) -> Result<Self> {
        stream.read_string()
    }

    fn write_to(&self, stream: &mut dyn ValueStream) -> Result<()> {
        stream.write_string(self)
    }
}
