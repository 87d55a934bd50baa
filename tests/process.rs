//! Process-level tests: the built binary under ejabberd-like stdio.
//!
//! ejabberd keeps the pipe to the bridge open for its whole life, so a
//! termination signal has to end the process without stdin ever closing.

#![cfg(unix)]

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use extauth_bridge::protocol::{build_frame, decode_reply, REPLY_SIZE};
use extauth_bridge::telemetry::LOG_FILE_NAME;

const EXIT_DEADLINE: Duration = Duration::from_secs(5);

fn spawn_bridge(log_dir: &Path, extra: &[&str]) -> (Child, ChildStdin) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_extauth-bridge"))
        .arg("http://127.0.0.1:9/auth/")
        .arg("-l")
        .arg(log_dir)
        .args(extra)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let stdin = child.stdin.take().unwrap();
    (child, stdin)
}

/// Send one `tryregister` and wait for its reply, so the session loop is up.
fn round_trip(child: &mut Child, stdin: &mut ChildStdin) {
    stdin.write_all(&build_frame(b"tryregister:a:b:c").unwrap()).unwrap();
    stdin.flush().unwrap();

    let mut reply = [0u8; REPLY_SIZE];
    child.stdout.as_mut().unwrap().read_exact(&mut reply).unwrap();
    assert_eq!(decode_reply(&reply), Some(true));
}

fn wait_with_deadline(child: &mut Child) -> ExitStatus {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if start.elapsed() > EXIT_DEADLINE {
            child.kill().ok();
            child.wait().ok();
            panic!("bridge still running {:?} after signal", EXIT_DEADLINE);
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn remaining_stdout(child: &mut Child) -> Vec<u8> {
    let mut rest = Vec::new();
    child.stdout.as_mut().unwrap().read_to_end(&mut rest).unwrap();
    rest
}

fn send_signal(child: &Child, signal: &str) {
    let status = Command::new("kill")
        .args(["-s", signal, &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());
}

fn assert_exits_on_signal(signal: &str) {
    let dir = tempfile::tempdir().unwrap();
    let (mut child, mut stdin) = spawn_bridge(dir.path(), &[]);

    round_trip(&mut child, &mut stdin);
    send_signal(&child, signal);

    // stdin stays open the whole time
    let status = wait_with_deadline(&mut child);
    assert!(status.success(), "{status:?}");
    assert!(remaining_stdout(&mut child).is_empty());

    let log = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
    assert!(log.contains("Terminating ejabberd auth bridge: interrupted"), "{log}");
    drop(stdin);
}

#[test]
fn test_sigterm_ends_process_with_stdin_open() {
    assert_exits_on_signal("TERM");
}

#[test]
fn test_sigint_ends_process_with_stdin_open() {
    assert_exits_on_signal("INT");
}

#[test]
fn test_exit_on_eof_ends_process_when_stdin_closes() {
    let dir = tempfile::tempdir().unwrap();
    let (mut child, mut stdin) = spawn_bridge(dir.path(), &["--exit-on-eof"]);

    round_trip(&mut child, &mut stdin);
    drop(stdin);

    let status = wait_with_deadline(&mut child);
    assert!(status.success(), "{status:?}");
    assert!(remaining_stdout(&mut child).is_empty());
}
