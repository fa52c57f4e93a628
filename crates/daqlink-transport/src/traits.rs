/// Blocking full-duplex SPI primitive supplied by the platform glue.
///
/// The master drives the clock, so every transferred byte also shifts one
/// byte in from the peer.
pub trait SpiBus {
    /// Assert or release chip select.
    fn set_cs(&mut self, active: bool);

    /// Clock one byte out and return the byte clocked in.
    fn transfer(&mut self, byte: u8) -> u8;

    /// Block until the controller has drained its transmit queue.
    fn wait_done(&mut self);
}

/// Byte transmit primitive for the board side.
///
/// The board never drives the clock; `send_byte` queues a byte for the
/// next master-clocked transfer and reports whether the queue accepted it.
pub trait SlaveBus {
    fn send_byte(&mut self, byte: u8) -> bool;
}
