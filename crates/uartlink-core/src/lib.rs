//! Core functionalities: interrupt-driven line reception, paced synchronous
//! transmission, devices, command front end.

pub mod assembler;
pub mod channel;
pub mod config;
pub mod console;
pub mod device;
pub mod encoding;
pub mod error;
pub mod handshake;
pub mod host;
pub mod irq;
pub mod sim;

pub use assembler::{FinalizedLine, LineAssembler};
pub use channel::{Channel, ChannelStats};
pub use config::ChannelConfig;
pub use console::{read_command, send_command, Console};
pub use device::UartDevice;
pub use encoding::TextEncoding;
pub use error::ChannelError;
pub use handshake::wait_for_peer;
pub use host::{list_ports, HostConfig, HostUart, PortInfo};
pub use irq::InterruptDriver;
pub use sim::SimUart;
