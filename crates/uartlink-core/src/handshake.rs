use std::time::{Duration, Instant};

use crate::device::UartDevice;
use crate::error::{ChannelError, Result};

/// Block until the peer signals it is connected.
///
/// Polls [`UartDevice::peer_present`] every `poll`. With `limit` set, gives up
/// with [`ChannelError::Timeout`] once it has elapsed.
pub fn wait_for_peer<D: UartDevice + ?Sized>(device: &D, poll: Duration, limit: Option<Duration>) -> Result<()> {
    if !device.is_ready() {
        return Err(ChannelError::DeviceNotReady);
    }

    let start = Instant::now();
    let mut logged = false;
    while !device.peer_present() {
        if let Some(limit) = limit {
            if start.elapsed() >= limit {
                return Err(ChannelError::Timeout(limit));
            }
        }
        if !logged {
            log::info!("waiting for peer (DTR)");
            logged = true;
        }
        std::thread::sleep(poll);
    }

    log::debug!("peer present after {:?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimUart;
    use std::sync::Arc;

    #[test]
    fn returns_at_once_when_peer_present() {
        let uart = SimUart::new();
        wait_for_peer(&uart, Duration::from_millis(1), Some(Duration::from_millis(10))).unwrap();
    }

    #[test]
    fn times_out_without_peer() {
        let uart = SimUart::new();
        uart.set_peer_present(false);
        let err = wait_for_peer(&uart, Duration::from_millis(2), Some(Duration::from_millis(20))).unwrap_err();
        assert!(matches!(err, ChannelError::Timeout(_)));
    }

    #[test]
    fn not_ready_device_fails_fast() {
        let uart = SimUart::new();
        uart.set_ready(false);
        let err = wait_for_peer(&uart, Duration::from_millis(1), None).unwrap_err();
        assert!(matches!(err, ChannelError::DeviceNotReady));
    }

    #[test]
    fn waits_until_peer_appears() {
        let uart = Arc::new(SimUart::new());
        uart.set_peer_present(false);

        let peer = uart.clone();
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            peer.set_peer_present(true);
        });

        wait_for_peer(&*uart, Duration::from_millis(2), Some(Duration::from_secs(5))).unwrap();
        t.join().unwrap();
    }
}
