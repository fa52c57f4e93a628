use daqlink_stream::ValueStream;

/// Call direction of a command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    /// Read the access point.
    Get,
    /// Write the access point.
    Set,
}

/// How an invocation names its target command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// By exact command name.
    Name(String),
    /// By the 32-bit name hash (see [`name_hash`]).
    Hash(i32),
    /// By zero-based position in the enumeration order.
    Index(usize),
}

/// 32-bit FNV-1a over the command name, reinterpreted as `i32`.
///
/// Computed once at registration; hash-based selectors resolve through a
/// side table kept by the registry. On a hash collision the later
/// registration owns the hash.
pub fn name_hash(name: &str) -> i32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let mut hash = OFFSET;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash as i32
}

/// A protocol-independent command invocation.
///
/// Front-ends build one per request, the registry consumes it
/// synchronously; descriptors are never persisted.
pub struct CallDescr<'a> {
    /// The target command.
    pub selector: Selector,
    /// Get or set.
    pub call_type: CallType,
    /// Where handler arguments are extracted from.
    pub input: &'a mut dyn ValueStream,
    /// Where the handler return value is written to.
    pub output: &'a mut dyn ValueStream,
}
