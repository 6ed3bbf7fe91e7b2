use std::time::Duration;

use crate::error::{ChannelError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Receive staging buffer size. At most `rx_capacity - 1` payload bytes are kept per line.
    pub rx_capacity: usize,
    pub tx_capacity: usize,
    /// Delay after every transmitted byte. Zero disables pacing.
    pub char_pacing: Duration,
    pub tx_timeout: Duration,
    pub ready_poll: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            rx_capacity: 128,
            tx_capacity: 256,
            char_pacing: Duration::from_micros(100),
            tx_timeout: Duration::from_millis(100),
            ready_poll: Duration::from_millis(100),
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rx_capacity < 2 {
            return Err(ChannelError::InvalidArgument(format!(
                "rx_capacity must be at least 2, got {}",
                self.rx_capacity
            )));
        }
        if self.tx_capacity < 3 {
            return Err(ChannelError::InvalidArgument(format!(
                "tx_capacity must be at least 3, got {}",
                self.tx_capacity
            )));
        }
        if self.tx_timeout.is_zero() {
            return Err(ChannelError::InvalidArgument("tx_timeout must be non-zero".into()));
        }
        if self.ready_poll.is_zero() {
            return Err(ChannelError::InvalidArgument("ready_poll must be non-zero".into()));
        }
        Ok(())
    }

    /// Longest payload `send` accepts once CR LF is appended.
    pub fn max_payload(&self) -> usize {
        self.tx_capacity.saturating_sub(3)
    }
}
