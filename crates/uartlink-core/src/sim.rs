//! In-memory UART used for loopback operation and tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::device::UartDevice;

pub struct SimUart {
    rx_fifo: Mutex<VecDeque<u8>>,
    wire: Mutex<Vec<u8>>,
    ready: AtomicBool,
    peer: AtomicBool,
    loopback: bool,
    rx_enabled: AtomicBool,
    tx_enabled: AtomicBool,
    tx_held: AtomicBool,
    fail_writes: AtomicBool,
    irq_tx: Sender<()>,
    irq_rx: Receiver<()>,
}

impl SimUart {
    pub fn new() -> Self {
        let (irq_tx, irq_rx) = unbounded();
        Self {
            rx_fifo: Mutex::new(VecDeque::new()),
            wire: Mutex::new(Vec::new()),
            ready: AtomicBool::new(true),
            peer: AtomicBool::new(true),
            loopback: false,
            rx_enabled: AtomicBool::new(false),
            tx_enabled: AtomicBool::new(false),
            tx_held: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            irq_tx,
            irq_rx,
        }
    }

    /// Transmitted bytes are also received, as with TX wired to RX.
    pub fn loopback() -> Self {
        Self { loopback: true, ..Self::new() }
    }

    pub fn inject(&self, bytes: &[u8]) {
        self.rx_fifo.lock().extend(bytes.iter().copied());
        self.raise();
    }

    pub fn wire(&self) -> Vec<u8> {
        self.wire.lock().clone()
    }

    pub fn take_wire(&self) -> Vec<u8> {
        std::mem::take(&mut *self.wire.lock())
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn set_peer_present(&self, present: bool) {
        self.peer.store(present, Ordering::Release);
    }

    /// Withhold transmit-ready until [`release_tx`](Self::release_tx).
    pub fn hold_tx(&self) {
        self.tx_held.store(true, Ordering::Release);
    }

    pub fn release_tx(&self) {
        self.tx_held.store(false, Ordering::Release);
        self.raise();
    }

    /// Make every `poll_out` fail as a dead port would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    pub fn tx_irq_enabled(&self) -> bool {
        self.tx_enabled.load(Ordering::Acquire)
    }

    fn raise(&self) {
        let _ = self.irq_tx.send(());
    }
}

impl Default for SimUart {
    fn default() -> Self {
        Self::new()
    }
}

impl UartDevice for SimUart {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn irq_update(&self) -> bool {
        self.irq_rx_ready() || self.irq_tx_ready()
    }

    fn irq_rx_enable(&self) {
        self.rx_enabled.store(true, Ordering::Release);
        self.raise();
    }

    fn irq_rx_ready(&self) -> bool {
        self.rx_enabled.load(Ordering::Acquire) && !self.rx_fifo.lock().is_empty()
    }

    fn fifo_read(&self) -> Option<u8> {
        self.rx_fifo.lock().pop_front()
    }

    fn irq_tx_ready(&self) -> bool {
        self.tx_enabled.load(Ordering::Acquire) && !self.tx_held.load(Ordering::Acquire)
    }

    fn irq_tx_enable(&self) {
        self.tx_enabled.store(true, Ordering::Release);
        self.raise();
    }

    fn irq_tx_disable(&self) {
        self.tx_enabled.store(false, Ordering::Release);
    }

    fn poll_out(&self, byte: u8) -> io::Result<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port gone"));
        }
        self.wire.lock().push(byte);
        if self.loopback {
            self.inject(&[byte]);
        }
        Ok(())
    }

    fn peer_present(&self) -> bool {
        self.peer.load(Ordering::Acquire)
    }

    fn interrupts(&self) -> Receiver<()> {
        self.irq_rx.clone()
    }
}
