use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::assembler::{Feed, FinalizedLine, LineAssembler};
use crate::config::ChannelConfig;
use crate::device::UartDevice;
use crate::error::{ChannelError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub lines_received: u64,
    pub bytes_dropped: u64,
    pub frames_sent: u64,
    pub send_timeouts: u64,
}

#[derive(Default)]
struct Counters {
    lines_received: AtomicU64,
    bytes_dropped: AtomicU64,
    frames_sent: AtomicU64,
    send_timeouts: AtomicU64,
}

/// One UART channel and all state shared between the interrupt dispatcher
/// and senders/readers.
pub struct Channel<D: UartDevice> {
    device: D,
    config: ChannelConfig,
    // Critical section between the dispatcher and readers. Held only for a
    // FIFO drain or a snapshot copy.
    rx: Mutex<LineAssembler>,
    busy: AtomicBool,
    tx_lock: Mutex<()>,
    // Bumped right before TX-ready is armed; completions carry the value seen
    // by the dispatcher so a sender can drop one meant for an earlier frame.
    tx_seq: AtomicU64,
    done_tx: Sender<u64>,
    done_rx: Receiver<u64>,
    counters: Counters,
}

impl<D: UartDevice> Channel<D> {
    pub fn new(device: D, config: ChannelConfig) -> Result<Self> {
        config.validate()?;
        let (done_tx, done_rx) = bounded(1);
        Ok(Self {
            device,
            rx: Mutex::new(LineAssembler::new(config.rx_capacity)),
            config,
            busy: AtomicBool::new(false),
            tx_lock: Mutex::new(()),
            tx_seq: AtomicU64::new(0),
            done_tx,
            done_rx,
            counters: Counters::default(),
        })
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    // Receive interrupts stay off until the peer handshake is done.
    pub fn arm(&self) -> Result<()> {
        if !self.device.is_ready() {
            return Err(ChannelError::DeviceNotReady);
        }
        self.device.irq_rx_enable();
        log::debug!("channel armed, rx capacity {}", self.config.rx_capacity);
        Ok(())
    }

    /// Interrupt dispatcher. Drains the receive FIFO into the line assembler
    /// and completes a pending transmission on transmit-ready.
    pub fn on_interrupt(&self) {
        if !self.device.irq_update() {
            return;
        }

        {
            let mut rx = self.rx.lock();
            while self.device.irq_rx_ready() {
                let Some(byte) = self.device.fifo_read() else {
                    break;
                };
                match rx.feed(byte) {
                    Feed::Finalized => {
                        self.counters.lines_received.fetch_add(1, Ordering::Relaxed);
                    }
                    Feed::Discarded => {
                        self.counters.bytes_dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    Feed::Stored | Feed::Ignored => {}
                }
            }
        }

        if self.device.irq_tx_ready() {
            let armed = self.tx_seq.load(Ordering::Acquire);
            // Disable before waking the sender, or the next frame's TX-ready
            // could be switched off by this handler.
            self.device.irq_tx_disable();
            self.busy.store(false, Ordering::Release);
            if let Err(TrySendError::Full(seq)) = self.done_tx.try_send(armed) {
                // Slot holds a completion nobody consumed.
                let _ = self.done_rx.try_recv();
                let _ = self.done_tx.try_send(seq);
            }
        }
    }

    /// Write `bytes` to the wire and wait for the transmit-ready completion.
    ///
    /// Concurrent callers queue on the transmit lock, so frames never
    /// interleave. On a write failure or timeout the busy flag is cleared
    /// before returning.
    pub fn send(&self, bytes: &[u8]) -> Result<()> {
        if !self.device.is_ready() {
            return Err(ChannelError::DeviceNotReady);
        }

        let _guard = self.tx_lock.lock();

        if self.busy.swap(true, Ordering::AcqRel) {
            log::warn!("busy flag already set at send start");
        }

        for &byte in bytes {
            if let Err(e) = self.device.poll_out(byte) {
                return Err(self.abort_tx(e.into()));
            }
            pace(self.config.char_pacing);
        }
        if let Err(e) = self.device.flush() {
            return Err(self.abort_tx(e.into()));
        }

        let seq = self.tx_seq.fetch_add(1, Ordering::AcqRel) + 1;
        self.device.irq_tx_enable();

        let deadline = Instant::now() + self.config.tx_timeout;
        loop {
            match self.done_rx.recv_deadline(deadline) {
                Ok(done) if done == seq => {
                    self.counters.frames_sent.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Ok(stale) => log::debug!("dropping completion of frame {stale}"),
                Err(_) => {
                    self.counters.send_timeouts.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "no transmit completion for {} byte frame within {:?}",
                        bytes.len(),
                        self.config.tx_timeout
                    );
                    return Err(self.abort_tx(ChannelError::Timeout(self.config.tx_timeout)));
                }
            }
        }
    }

    fn abort_tx(&self, err: ChannelError) -> ChannelError {
        self.device.irq_tx_disable();
        self.busy.store(false, Ordering::Release);
        err
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn last_line(&self) -> FinalizedLine {
        self.rx.lock().last().clone()
    }

    pub fn rx_position(&self) -> usize {
        self.rx.lock().position()
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            lines_received: self.counters.lines_received.load(Ordering::Relaxed),
            bytes_dropped: self.counters.bytes_dropped.load(Ordering::Relaxed),
            frames_sent: self.counters.frames_sent.load(Ordering::Relaxed),
            send_timeouts: self.counters.send_timeouts.load(Ordering::Relaxed),
        }
    }
}

fn pace(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
