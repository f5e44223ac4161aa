//! Shared helpers for spawning the binary and waiting for it.

use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

pub fn get_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind to address")
        .local_addr()
        .unwrap()
        .port()
}

/// Guard that kills and waits on a child process when dropped.
pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        drop(self.0.kill());
        drop(self.0.wait());
    }
}

fn get_bin() -> &'static str {
    env!("CARGO_BIN_EXE_ipwatch")
}

/// Runs the binary to completion with the given args, capturing its output.
pub fn run_to_completion(args: &[&str]) -> Output {
    Command::new(get_bin())
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run ipwatch")
}

/// Spawn the binary in web mode, listening on `127.0.0.1:port`.
pub fn spawn_web(port: u16, targets: &[&str]) -> KillOnDrop {
    let port = port.to_string();
    let child = Command::new(get_bin())
        .args(["--web", "--bind", "127.0.0.1", "--port", &port])
        .args(targets)
        .stdout(Stdio::null())
        .spawn()
        .expect("failed to start ipwatch");
    KillOnDrop(child)
}

/// Block until a TCP listener is accepting on `127.0.0.1:port` or timeout.
pub async fn wait_for_listening(port: u16, timeout_secs: u64) {
    let start = Instant::now();
    while std::net::TcpStream::connect(("127.0.0.1", port)).is_err() {
        if start.elapsed() > Duration::from_secs(timeout_secs) {
            panic!("server did not start within timeout");
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
