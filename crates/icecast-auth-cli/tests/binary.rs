//! Runs the `icecast-auth` binary as Icecast would, over real pipes.

use std::io::Write;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

fn spawn(args: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_icecast-auth"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

fn wait_with_deadline(child: &mut Child, deadline: Duration) -> Option<ExitStatus> {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    None
}

#[test]
fn exits_after_timeout_while_stdin_stays_open() {
    let mut child = spawn(&["--timeout-secs", "1"]);
    // keep our end of stdin open so the read never sees EOF
    let _stdin = child.stdin.take().unwrap();

    let status = wait_with_deadline(&mut child, Duration::from_secs(5));
    if status.is_none() {
        let _ = child.kill();
    }
    let status = status.expect("process still running after the timeout");
    assert!(!status.success());
}

#[test]
fn answers_on_stdout() {
    let mut child = spawn(&["--timeout-secs", "5"]);
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"Mountpoint: /live.mp3\n\n").unwrap();

    let output = child.wait_with_output().unwrap();
    drop(stdin);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "icecast-auth-message: 401 Unauthorized\n\n"
    );
}
