mod settings;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use uartlink_core::{
    list_ports, wait_for_peer, Channel, ChannelConfig, Console, HostConfig, HostUart, InterruptDriver, SimUart,
    TextEncoding, UartDevice,
};

use crate::settings::Settings;

const STARTUP_MESSAGE: &[u8] = b"UART initialized and ready for communication!\r\n";

#[derive(Debug, Parser)]
#[command(name = "uartlink", version, about = "Send and read text lines over a UART channel")]
struct Args {
    /// Serial port to open
    #[arg(short, long)]
    port: Option<String>,

    #[arg(short, long)]
    baud: Option<u32>,

    /// Use an in-memory loopback device instead of a port
    #[arg(long, conflicts_with = "port")]
    loopback: bool,

    /// Settings file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Text encoding of received lines: auto, utf-8, utf-16, ascii, gbk
    #[arg(long)]
    encoding: Option<String>,

    /// Give up waiting for the peer after this many milliseconds
    #[arg(long)]
    peer_timeout_ms: Option<u64>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save: bool,

    /// List available serial ports and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        for p in list_ports() {
            match (p.vid, p.pid) {
                (Some(vid), Some(pid)) => println!("{} ({:04X}:{:04X}) {}", p.port_name, vid, pid, p.port_type),
                _ => println!("{} {}", p.port_name, p.port_type),
            }
        }
        return Ok(());
    }

    let path = args
        .settings
        .clone()
        .or_else(Settings::default_path)
        .context("no settings path available")?;
    let mut settings = Settings::load(&path)?;
    apply_args(&mut settings, &args);
    if args.save {
        settings.save(&path)?;
        log::info!("settings saved to {}", path.display());
    }

    let encoding: TextEncoding = settings.encoding.parse()?;
    let config = settings.channel_config();

    if args.loopback {
        run(SimUart::loopback(), config, encoding, &settings)
    } else {
        if settings.port_name.is_empty() {
            anyhow::bail!("no serial port given (use --port, --loopback or --list)");
        }
        let host = HostUart::open(&HostConfig {
            port_name: settings.port_name.clone(),
            baud_rate: settings.baud_rate,
        })
        .with_context(|| format!("opening {}", settings.port_name))?;
        run(host, config, encoding, &settings)
    }
}

fn apply_args(settings: &mut Settings, args: &Args) {
    if let Some(port) = &args.port {
        settings.port_name = port.clone();
    }
    if let Some(baud) = args.baud {
        settings.baud_rate = baud;
    }
    if let Some(encoding) = &args.encoding {
        settings.encoding = encoding.clone();
    }
    if args.peer_timeout_ms.is_some() {
        settings.peer_timeout_ms = args.peer_timeout_ms;
    }
}

fn run<D: UartDevice + 'static>(
    device: D,
    config: ChannelConfig,
    encoding: TextEncoding,
    settings: &Settings,
) -> Result<()> {
    wait_for_peer(&device, config.ready_poll, settings.peer_timeout())?;

    let channel = Arc::new(Channel::new(device, config)?);
    channel.arm()?;
    let _driver = InterruptDriver::spawn(channel.clone()).context("starting interrupt driver")?;
    log::info!("UART communication ready");

    if let Err(e) = channel.send(STARTUP_MESSAGE) {
        log::warn!("startup message not confirmed: {e}");
    }

    let console = Console::new(&channel, encoding);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("uart> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let cmd = line.trim();
        if cmd == "quit" || cmd == "exit" {
            break;
        }

        let mut out = String::new();
        let res = console.execute(cmd, &mut out);
        print!("{out}");
        if let Err(e) = res {
            eprintln!("error: {e} ({})", e.code());
        }
    }

    log::debug!("final counters: {:?}", channel.stats());
    Ok(())
}
