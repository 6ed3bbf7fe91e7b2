use std::time::Duration;

/// Failures reported by the channel and its command front end.
///
/// Each variant maps to a negative errno-style status code so the console can
/// report it the way firmware shells usually do.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("device not ready")]
    DeviceNotReady,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no transmit completion within {0:?}")]
    Timeout(Duration),

    #[error("receive buffer overflow, {dropped} byte(s) discarded")]
    Overflow { dropped: usize },

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port: {0}")]
    Serial(#[from] serialport::Error),
}

impl ChannelError {
    pub fn code(&self) -> i32 {
        match self {
            Self::DeviceNotReady => -19,
            Self::InvalidArgument(_) => -22,
            Self::Timeout(_) => -11,
            Self::Overflow { .. } => -75,
            Self::Io(_) | Self::Serial(_) => -5,
        }
    }
}

pub type Result<T, E = ChannelError> = std::result::Result<T, E>;
