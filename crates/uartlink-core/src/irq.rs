//! Interrupt context.
//!
//! A dedicated thread waits on the device interrupt line and runs the
//! channel's dispatcher for every raised interrupt, the way the interrupt
//! controller would preempt thread code on hardware.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, select, Sender};

use crate::channel::Channel;
use crate::device::UartDevice;

pub struct InterruptDriver {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl InterruptDriver {
    pub fn spawn<D: UartDevice + 'static>(channel: Arc<Channel<D>>) -> std::io::Result<Self> {
        let irq = channel.device().interrupts();
        let (stop, stop_rx) = bounded::<()>(0);

        let handle = std::thread::Builder::new().name("uart-irq".into()).spawn(move || {
            log::debug!("interrupt driver started");
            loop {
                select! {
                    recv(irq) -> msg => {
                        if msg.is_err() {
                            break;
                        }
                        channel.on_interrupt();
                    }
                    recv(stop_rx) -> _ => break,
                }
            }
            log::debug!("interrupt driver stopped");
        })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }
}

impl Drop for InterruptDriver {
    fn drop(&mut self) {
        // Disconnecting the stop channel wakes the select.
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
