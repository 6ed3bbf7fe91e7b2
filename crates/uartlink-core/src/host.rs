//! `serialport`-backed device for running the channel against a real port.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serialport::{SerialPort, SerialPortInfo};

use crate::device::UartDevice;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PortInfo {
    pub port_name: String,
    pub port_type: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (port_type, vid, pid) = match &info.port_type {
            serialport::SerialPortType::UsbPort(usb) => ("USB".to_string(), Some(usb.vid), Some(usb.pid)),
            serialport::SerialPortType::PciPort => ("PCI".to_string(), None, None),
            serialport::SerialPortType::BluetoothPort => ("Bluetooth".to_string(), None, None),
            serialport::SerialPortType::Unknown => ("Unknown".to_string(), None, None),
        };
        Self {
            port_name: info.port_name,
            port_type,
            vid,
            pid,
        }
    }
}

pub fn list_ports() -> Vec<PortInfo> {
    serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub port_name: String,
    pub baud_rate: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 115_200,
        }
    }
}

struct Shared {
    rx_fifo: Mutex<VecDeque<u8>>,
    alive: AtomicBool,
    rx_enabled: AtomicBool,
    irq_tx: Sender<()>,
}

impl Shared {
    fn raise(&self) {
        let _ = self.irq_tx.send(());
    }
}

/// A host serial port presented through the UART interrupt interface.
///
/// A reader thread stands in for the receive interrupt: it moves incoming
/// bytes into the FIFO and raises the interrupt line.
pub struct HostUart {
    port: Mutex<Box<dyn SerialPort>>,
    shared: Arc<Shared>,
    tx_enabled: AtomicBool,
    irq_rx: Receiver<()>,
    reader: Option<JoinHandle<()>>,
}

impl HostUart {
    pub fn open(cfg: &HostConfig) -> Result<Self> {
        let port = serialport::new(&cfg.port_name, cfg.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(50))
            .open()?;
        let mut reader_port = port.try_clone()?;

        let (irq_tx, irq_rx) = unbounded();
        let shared = Arc::new(Shared {
            rx_fifo: Mutex::new(VecDeque::new()),
            alive: AtomicBool::new(true),
            rx_enabled: AtomicBool::new(false),
            irq_tx,
        });

        let reader_shared = shared.clone();
        let port_name = cfg.port_name.clone();
        let reader = std::thread::Builder::new()
            .name("uart-rx".into())
            .spawn(move || {
                let mut buf = [0u8; 256];
                while reader_shared.alive.load(Ordering::Acquire) {
                    match reader_port.read(&mut buf) {
                        Ok(n) if n > 0 => {
                            reader_shared.rx_fifo.lock().extend(buf[..n].iter().copied());
                            reader_shared.raise();
                        }
                        Ok(_) => {}
                        Err(e) if e.kind() == ErrorKind::TimedOut => {}
                        Err(e) => {
                            log::error!("{port_name}: read failed: {e}");
                            reader_shared.alive.store(false, Ordering::Release);
                        }
                    }
                }
            })
            .map_err(serialport::Error::from)?;

        log::info!("opened {} at {} baud", cfg.port_name, cfg.baud_rate);

        Ok(Self {
            port: Mutex::new(port),
            shared,
            tx_enabled: AtomicBool::new(false),
            irq_rx,
            reader: Some(reader),
        })
    }
}

impl Drop for HostUart {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

impl UartDevice for HostUart {
    fn is_ready(&self) -> bool {
        self.shared.alive.load(Ordering::Acquire)
    }

    fn irq_update(&self) -> bool {
        self.irq_rx_ready() || self.irq_tx_ready()
    }

    fn irq_rx_enable(&self) {
        self.shared.rx_enabled.store(true, Ordering::Release);
        self.shared.raise();
    }

    fn irq_rx_ready(&self) -> bool {
        self.shared.rx_enabled.load(Ordering::Acquire) && !self.shared.rx_fifo.lock().is_empty()
    }

    fn fifo_read(&self) -> Option<u8> {
        self.shared.rx_fifo.lock().pop_front()
    }

    fn irq_tx_ready(&self) -> bool {
        self.tx_enabled.load(Ordering::Acquire)
    }

    fn irq_tx_enable(&self) {
        self.tx_enabled.store(true, Ordering::Release);
        self.shared.raise();
    }

    fn irq_tx_disable(&self) {
        self.tx_enabled.store(false, Ordering::Release);
    }

    fn poll_out(&self, byte: u8) -> io::Result<()> {
        self.port.lock().write_all(&[byte]).map_err(|e| {
            log::error!("write failed: {e}");
            e
        })
    }

    fn flush(&self) -> io::Result<()> {
        self.port.lock().flush()
    }

    fn peer_present(&self) -> bool {
        self.port.lock().read_data_set_ready().unwrap_or(false)
    }

    fn interrupts(&self) -> Receiver<()> {
        self.irq_rx.clone()
    }
}
