//! Command front end tests

use std::sync::Arc;
use std::time::Duration;

use uartlink_core::{Channel, ChannelConfig, ChannelError, Console, InterruptDriver, SimUart, TextEncoding};

fn setup(tx_timeout: Duration, with_driver: bool) -> (Arc<Channel<SimUart>>, Option<InterruptDriver>) {
    let cfg = ChannelConfig {
        char_pacing: Duration::ZERO,
        tx_timeout,
        ..Default::default()
    };
    let ch = Arc::new(Channel::new(SimUart::new(), cfg).unwrap());
    ch.arm().unwrap();
    let driver = with_driver.then(|| InterruptDriver::spawn(ch.clone()).unwrap());
    (ch, driver)
}

fn run(ch: &Channel<SimUart>, line: &str) -> (Result<(), ChannelError>, String) {
    let console = Console::new(ch, TextEncoding::Auto);
    let mut out = String::new();
    let res = console.execute(line, &mut out);
    (res, out)
}

#[test]
fn test_send_echoes_input() {
    let (ch, _d) = setup(Duration::from_secs(2), true);
    let (res, out) = run(&ch, "send hello");

    assert!(res.is_ok());
    assert_eq!(out, "Sent successfully: hello\n");
    assert_eq!(ch.device().wire(), b"hello\r\n");
}

#[test]
fn test_send_quoted_string() {
    let (ch, _d) = setup(Duration::from_secs(2), true);
    let (res, out) = run(&ch, "send \"two words\"");

    assert!(res.is_ok());
    assert_eq!(out, "Sent successfully: two words\n");
    assert_eq!(ch.device().wire(), b"two words\r\n");
}

#[test]
fn test_send_without_argument_prints_usage() {
    let (ch, _d) = setup(Duration::from_secs(2), false);
    let (res, out) = run(&ch, "send");

    let err = res.unwrap_err();
    assert_eq!(err.code(), -22);
    assert!(out.starts_with("Usage: send"));
    assert!(ch.device().wire().is_empty());
}

#[test]
fn test_send_too_long_reports_status() {
    let (ch, _d) = setup(Duration::from_secs(2), true);
    let line = format!("send {}", "y".repeat(300));
    let (res, out) = run(&ch, &line);

    assert!(matches!(res, Err(ChannelError::InvalidArgument(_))));
    assert_eq!(out, "Failed to send (error: -22)\n");
}

#[test]
fn test_send_timeout_reports_status() {
    let (ch, _d) = setup(Duration::from_millis(20), false);
    let (res, out) = run(&ch, "send nobody");

    assert!(matches!(res, Err(ChannelError::Timeout(_))));
    assert_eq!(out, "Failed to send (error: -11)\n");
}

#[test]
fn test_read_prints_last_line() {
    let (ch, _d) = setup(Duration::from_secs(2), false);
    ch.device().inject(b"abc\r");
    ch.on_interrupt();

    let (res, out) = run(&ch, "read");
    assert!(res.is_ok());
    assert_eq!(out, "Last received message: abc\n");

    let (_, again) = run(&ch, "read");
    assert_eq!(again, out);
}

#[test]
fn test_read_before_any_line_is_empty() {
    let (ch, _d) = setup(Duration::from_secs(2), false);
    let (res, out) = run(&ch, "read");
    assert!(res.is_ok());
    assert_eq!(out, "Last received message: \n");
}

#[test]
fn test_read_surfaces_overflow() {
    let (ch, _d) = setup(Duration::from_secs(2), false);
    let mut burst = vec![b'z'; 140];
    burst.push(b'\n');
    ch.device().inject(&burst);
    ch.on_interrupt();

    let (res, out) = run(&ch, "read");
    match res {
        Err(ChannelError::Overflow { dropped }) => assert_eq!(dropped, 13),
        other => panic!("expected overflow, got {other:?}"),
    }
    assert_eq!(out, format!("Last received message: {}\n", "z".repeat(127)));
}

#[test]
fn test_stats_and_help() {
    let (ch, _d) = setup(Duration::from_secs(2), true);
    run(&ch, "send x").0.unwrap();

    let (_, stats) = run(&ch, "stats");
    assert!(stats.contains("frames sent:    1"));

    let (_, help) = run(&ch, "help");
    assert!(help.contains("send"));
    assert!(help.contains("read"));
}

#[test]
fn test_unknown_and_empty_lines() {
    let (ch, _d) = setup(Duration::from_secs(2), false);

    let (res, _) = run(&ch, "bogus arg");
    assert_eq!(res.unwrap_err().code(), -22);

    let (res, out) = run(&ch, "   ");
    assert!(res.is_ok());
    assert!(out.is_empty());
}

#[test]
fn test_send_write_failure_reports_status() {
    let (ch, _d) = setup(Duration::from_secs(2), true);
    ch.device().fail_writes(true);
    let (res, out) = run(&ch, "send lost");

    assert!(matches!(res, Err(ChannelError::Io(_))));
    assert_eq!(out, "Failed to send (error: -5)\n");
}
