//! End-to-end reaping of real child processes.
//!
//! `reap_children` waits on any child of this test binary, so every test
//! here holds `SERIAL` to keep other tests' children out of its way.

use log::{Level, LevelFilter, Log, Metadata, Record};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid as NixPid;
use std::process::{Child, Command};
use std::sync::{Mutex, MutexGuard, Once};
use std::time::{Duration, Instant};

use pidtree::reap_children;

/// Collects info-and-above log lines so tests can assert on them
struct CapturingLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.lines
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    lines: Mutex::new(Vec::new()),
};
static LOGGER_INIT: Once = Once::new();
static SERIAL: Mutex<()> = Mutex::new(());

fn setup() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    LOGGER_INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("logger already set");
        log::set_max_level(LevelFilter::Debug);
    });
    // Start from a clean slate: no leftover zombies, no old log lines
    reap_children();
    take_log_lines();
    guard
}

fn take_log_lines() -> Vec<String> {
    std::mem::take(&mut *LOGGER.lines.lock().unwrap_or_else(|e| e.into_inner()))
}

fn raw_pid(child: &Child) -> i32 {
    child.id() as i32
}

fn process_state(pid: i32) -> Option<char> {
    let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
    let (_, rest) = stat.rsplit_once(')')?;
    rest.split_whitespace().next()?.chars().next()
}

/// Block until `pid` has terminated and is waiting to be reaped
fn wait_for_zombie(pid: i32) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if process_state(pid) == Some('Z') {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("PID {} never became a zombie", pid);
}

#[test]
fn test_reap_classifies_exit_and_signal_leaves_running_child() {
    let _guard = setup();

    let exits = Command::new("sh").args(["-c", "exit 5"]).spawn().unwrap();
    let killed = Command::new("sleep").arg("30").spawn().unwrap();
    let mut running = Command::new("sleep").arg("30").spawn().unwrap();

    kill(NixPid::from_raw(raw_pid(&killed)), Signal::SIGTERM).unwrap();
    wait_for_zombie(raw_pid(&exits));
    wait_for_zombie(raw_pid(&killed));

    let code = reap_children();
    assert_eq!(code, 5, "Exit code of the normally exiting child should be returned");

    let lines = take_log_lines();
    let exit_line = format!("Child process {} had non-zero return value: 5", raw_pid(&exits));
    let signal_line = format!(
        "Child process {} exited from signal {}",
        raw_pid(&killed),
        Signal::SIGTERM as i32
    );
    assert!(lines.contains(&exit_line), "Missing exit log line in {:?}", lines);
    assert!(lines.contains(&signal_line), "Missing signal log line in {:?}", lines);

    let running_tag = format!("Child process {} ", raw_pid(&running));
    assert!(
        lines.iter().all(|line| !line.starts_with(&running_tag)),
        "Running child must not be logged: {:?}",
        lines
    );

    // Still alive and still ours to wait for
    assert!(kill(NixPid::from_raw(raw_pid(&running)), None).is_ok());
    assert_ne!(process_state(raw_pid(&running)), Some('Z'));

    running.kill().unwrap();
    running.wait().unwrap();
}

#[test]
fn test_reap_twice_is_idempotent() {
    let _guard = setup();

    let exits = Command::new("sh").args(["-c", "exit 3"]).spawn().unwrap();
    wait_for_zombie(raw_pid(&exits));

    assert_eq!(reap_children(), 3);
    assert_eq!(take_log_lines().len(), 1);

    assert_eq!(reap_children(), 0, "Nothing new to reap on the second call");
    assert!(take_log_lines().is_empty(), "Second call should log nothing");
    assert_eq!(process_state(raw_pid(&exits)), None, "Zombie should be gone");
}

#[test]
fn test_clean_exit_is_reaped_silently() {
    let _guard = setup();

    let clean = Command::new("sh").args(["-c", "exit 0"]).spawn().unwrap();
    wait_for_zombie(raw_pid(&clean));

    assert_eq!(reap_children(), 0);
    assert!(take_log_lines().is_empty(), "Exit code 0 is only logged at debug level");
    assert_eq!(process_state(raw_pid(&clean)), None, "Clean exit must still be reaped");
}

#[test]
fn test_last_non_zero_exit_wins() {
    let _guard = setup();

    let first = Command::new("sh").args(["-c", "exit 2"]).spawn().unwrap();
    wait_for_zombie(raw_pid(&first));
    let second = Command::new("sh").args(["-c", "exit 9"]).spawn().unwrap();
    wait_for_zombie(raw_pid(&second));

    let code = reap_children();
    let lines = take_log_lines();
    assert_eq!(lines.len(), 2, "Both non-zero exits should be logged: {:?}", lines);

    // Collection order is up to the kernel; the return value follows it
    let last_logged: i32 = lines
        .iter()
        .rev()
        .find_map(|line| line.split("had non-zero return value: ").nth(1))
        .and_then(|code| code.trim().parse().ok())
        .expect("an exit line was logged");
    assert_eq!(code, last_logged, "Return value should be the last collected exit code");
}

#[test]
fn test_reap_does_not_block_on_running_children() {
    let _guard = setup();

    let mut running = Command::new("sleep").arg("30").spawn().unwrap();

    let start = Instant::now();
    assert_eq!(reap_children(), 0);
    assert!(start.elapsed() < Duration::from_secs(1), "Reaper must not wait for live children");

    running.kill().unwrap();
    running.wait().unwrap();
}
