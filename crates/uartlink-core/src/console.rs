//! Command front end: `send` and `read` over a channel.

use std::fmt::Write;

use crate::assembler::{CR, LF};
use crate::channel::Channel;
use crate::device::UartDevice;
use crate::encoding::TextEncoding;
use crate::error::{ChannelError, Result};

pub struct CommandDescriptor {
    pub name: &'static str,
    pub usage: &'static str,
    pub brief: &'static str,
}

pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "send", usage: "send \"your string\"", brief: "Send string over UART" },
    CommandDescriptor { name: "read", usage: "read", brief: "Read last received message" },
    CommandDescriptor { name: "stats", usage: "stats", brief: "Channel counters" },
    CommandDescriptor { name: "help", usage: "help", brief: "List commands" },
];

/// Frame `payload` with CR LF and transmit it.
pub fn send_command<D: UartDevice>(channel: &Channel<D>, payload: &str) -> Result<()> {
    let max = channel.config().max_payload();
    if payload.len() > max {
        return Err(ChannelError::InvalidArgument(format!("input too long (max {max} chars)")));
    }

    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.extend_from_slice(payload.as_bytes());
    frame.push(CR);
    frame.push(LF);
    channel.send(&frame)
}

/// Last finalized line as text.
pub fn read_command<D: UartDevice>(channel: &Channel<D>, encoding: TextEncoding) -> String {
    encoding.decode(channel.last_line().as_bytes())
}

pub struct Console<'c, D: UartDevice> {
    channel: &'c Channel<D>,
    encoding: TextEncoding,
}

impl<'c, D: UartDevice> Console<'c, D> {
    pub fn new(channel: &'c Channel<D>, encoding: TextEncoding) -> Self {
        Self { channel, encoding }
    }

    /// Run one command line, writing its output to `out`.
    pub fn execute(&self, line: &str, out: &mut dyn Write) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "send" => self.cmd_send(rest, out),
            "read" => self.cmd_read(out),
            "stats" => self.cmd_stats(out),
            "help" => cmd_help(out),
            other => Err(ChannelError::InvalidArgument(format!("unknown command '{other}'"))),
        }
    }

    fn cmd_send(&self, arg: &str, out: &mut dyn Write) -> Result<()> {
        let payload = unquote(arg);
        if payload.is_empty() {
            let _ = writeln!(out, "Usage: {}", COMMANDS[0].usage);
            return Err(ChannelError::InvalidArgument("missing payload".into()));
        }

        match send_command(self.channel, payload) {
            Ok(()) => {
                let _ = writeln!(out, "Sent successfully: {payload}");
                Ok(())
            }
            Err(e) => {
                let _ = writeln!(out, "Failed to send (error: {})", e.code());
                Err(e)
            }
        }
    }

    fn cmd_read(&self, out: &mut dyn Write) -> Result<()> {
        let line = self.channel.last_line();
        let _ = writeln!(out, "Last received message: {}", self.encoding.decode(line.as_bytes()));
        if line.dropped() > 0 {
            return Err(ChannelError::Overflow { dropped: line.dropped() });
        }
        Ok(())
    }

    fn cmd_stats(&self, out: &mut dyn Write) -> Result<()> {
        let s = self.channel.stats();
        let _ = writeln!(out, "lines received: {}", s.lines_received);
        let _ = writeln!(out, "bytes dropped:  {}", s.bytes_dropped);
        let _ = writeln!(out, "frames sent:    {}", s.frames_sent);
        let _ = writeln!(out, "send timeouts:  {}", s.send_timeouts);
        Ok(())
    }
}

fn cmd_help(out: &mut dyn Write) -> Result<()> {
    for c in COMMANDS {
        let _ = writeln!(out, "  {:<8} {}", c.name, c.brief);
    }
    Ok(())
}

fn unquote(arg: &str) -> &str {
    arg.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(arg)
}
