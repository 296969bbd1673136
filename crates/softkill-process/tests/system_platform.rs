//! System platform tests against real child processes
//!
//! Each test spawns its own `sleep` child so pids never collide between
//! tests running in parallel.

#![cfg(unix)]

use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;

use softkill_process::{ProcessPlatform, SystemPlatform};

fn spawn_sleep() -> Child {
    Command::new("sleep").arg("30").spawn().expect("Failed to spawn sleep")
}

/// Wait until the child has exec'd and shows up under its own name
async fn wait_until_named(platform: &SystemPlatform, pid: u32, name: &str) {
    for _ in 0..50 {
        let found = platform.processes_by_name(name).unwrap();
        if found.iter().any(|p| p.pid() == pid) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    panic!("process {} never appeared as '{}'", pid, name);
}

#[tokio::test]
async fn test_lookup_by_name_and_id() {
    let platform = SystemPlatform::new();
    let mut child = spawn_sleep();
    let pid = child.id();

    wait_until_named(&platform, pid, "sleep").await;
    let by_id = platform.process_by_id(pid).unwrap().expect("child not found by id");
    assert_eq!(by_id.name(), "sleep");
    assert!(platform.is_alive(pid));

    child.kill().unwrap();
    child.wait().unwrap();
}

/// Copy `sleep` under a name longer than the kernel's comm limit and run it
fn spawn_long_named_sleep(dir: &Path, name: &str) -> Child {
    let source = ["/bin/sleep", "/usr/bin/sleep"]
        .into_iter()
        .map(Path::new)
        .find(|p| p.exists())
        .expect("no sleep binary");
    let target = dir.join(name);
    std::fs::copy(source, &target).unwrap();

    // A concurrent fork may briefly hold the fresh file open for writing
    for _ in 0..20 {
        match Command::new(&target).arg("30").spawn() {
            Ok(child) => return child,
            Err(e) if e.raw_os_error() == Some(26) => std::thread::sleep(Duration::from_millis(50)),
            Err(e) => panic!("Failed to spawn {}: {}", name, e),
        }
    }
    panic!("{} stayed busy", name);
}

#[tokio::test]
async fn test_lookup_by_name_longer_than_comm_limit() {
    let name = "softkill_long_named_sleeper";
    let dir = tempfile::tempdir().unwrap();
    let platform = SystemPlatform::new();
    let mut child = spawn_long_named_sleep(dir.path(), name);
    let pid = child.id();

    wait_until_named(&platform, pid, name).await;
    let by_id = platform.process_by_id(pid).unwrap().expect("child not found by id");
    assert_eq!(by_id.name(), name);

    child.kill().unwrap();
    child.wait().unwrap();
}

#[tokio::test]
async fn test_parent_of_child_is_this_process() {
    let platform = SystemPlatform::new();
    let mut child = spawn_sleep();
    let pid = child.id();

    let parent = platform.parent_of(pid).unwrap().expect("child has no parent");
    assert_eq!(parent.pid(), std::process::id());

    child.kill().unwrap();
    child.wait().unwrap();
}

#[tokio::test]
async fn test_interrupt_ends_sleep_and_wait_observes_exit() {
    let platform = SystemPlatform::new().with_poll_interval(Duration::from_millis(20));
    let mut child = spawn_sleep();
    let pid = child.id();
    wait_until_named(&platform, pid, "sleep").await;

    platform.send_interrupt(pid).unwrap();
    // The unreaped child is a zombie, which already counts as exited
    let exited = platform.wait_for_exit(pid, Duration::from_secs(5)).await.unwrap();
    assert!(exited);
    assert!(!platform.is_alive(pid));

    child.wait().unwrap();
}

#[tokio::test]
async fn test_wait_times_out_on_running_process() {
    let platform = SystemPlatform::new().with_poll_interval(Duration::from_millis(20));
    let mut child = spawn_sleep();
    let pid = child.id();

    let exited = platform.wait_for_exit(pid, Duration::from_millis(200)).await.unwrap();
    assert!(!exited);

    platform.terminate(pid).unwrap();
    assert!(platform.wait_for_exit(pid, Duration::from_secs(5)).await.unwrap());
    child.wait().unwrap();
}

#[tokio::test]
async fn test_terminating_exited_process_is_ok() {
    let platform = SystemPlatform::new();
    let mut child = spawn_sleep();
    let pid = child.id();
    child.kill().unwrap();
    child.wait().unwrap();

    assert!(platform.terminate(pid).is_ok());
    assert!(platform.send_interrupt(pid).is_ok());
    assert!(platform.wait_for_exit(pid, Duration::from_secs(1)).await.unwrap());
}
