use std::io;

use crossbeam_channel::Receiver;

/// Interrupt-driven UART driver interface.
///
/// Methods prefixed `irq_` are called from the interrupt dispatcher and must
/// not block. `poll_out` is called from thread context only.
pub trait UartDevice: Send + Sync {
    fn is_ready(&self) -> bool;

    /// Latch the interrupt status; false when no event is pending.
    fn irq_update(&self) -> bool;

    fn irq_rx_enable(&self);

    fn irq_rx_ready(&self) -> bool;

    fn fifo_read(&self) -> Option<u8>;

    fn irq_tx_ready(&self) -> bool;

    fn irq_tx_enable(&self);

    fn irq_tx_disable(&self);

    fn poll_out(&self, byte: u8) -> io::Result<()>;

    /// Push written bytes out of any host-side buffering.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Remote end asserts it is connected (DTR seen from the peer).
    fn peer_present(&self) -> bool {
        true
    }

    /// Interrupt line: one message per raised interrupt.
    fn interrupts(&self) -> Receiver<()>;
}
