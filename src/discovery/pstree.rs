//! Legacy process tree discovery for kernels without child listings.
//!
//! Runs `pstree -A -l -p <pid>` and scrapes the `name(pid)` annotations out
//! of its ASCII diagram. Thread entries are printed as `{name}(tid)` and are
//! skipped. Every `-` of the diagram is read as a line break, so a deep
//! chain on one long line still splits into short tree nodes.

use log::{debug, warn};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};

use crate::constants::{PSTREE_ARGS, PSTREE_LINE_BUFFER, PSTREE_PROGRAM};
use crate::models::{DiscoveryError, Pid};

/// Scanner state while walking one output chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    /// Inside `(` after a process name, accumulating digits
    InPid { value: Pid, digits: usize },
    /// Inside `(` after `}`: a thread id, not a process
    InThreadCount,
}

/// Extract PIDs from one chunk of `pstree -p` output, appending them to
/// `pids` in left-to-right order.
///
/// Only `(digits)` groups directly following a name character count. A
/// group still open when the chunk ends, or interrupted by a non-digit,
/// is dropped and reported as malformed; every completed group before it
/// is kept.
pub fn scan_chunk(chunk: &[u8], pids: &mut Vec<Pid>) -> Result<(), DiscoveryError> {
    let mut state = ScanState::Scanning;
    let mut previous: Option<u8> = None;
    let mut malformed = false;

    for &byte in chunk.iter().take(PSTREE_LINE_BUFFER) {
        if byte == b'\n' {
            break;
        }

        state = match (state, byte) {
            (ScanState::Scanning, b'(') => match previous {
                Some(b'}') => ScanState::InThreadCount,
                Some(_) => ScanState::InPid { value: 0, digits: 0 },
                None => ScanState::Scanning,
            },
            (ScanState::Scanning, _) => ScanState::Scanning,
            (ScanState::InThreadCount, b')') => ScanState::Scanning,
            (ScanState::InThreadCount, _) => ScanState::InThreadCount,
            (ScanState::InPid { value, digits }, b')') if digits > 0 => {
                pids.push(value);
                ScanState::Scanning
            }
            (ScanState::InPid { value, digits }, b'0'..=b'9') => {
                let next = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(Pid::from(byte - b'0')));
                match next {
                    Some(value) => ScanState::InPid { value, digits: digits + 1 },
                    None => {
                        malformed = true;
                        ScanState::Scanning
                    }
                }
            }
            // A parenthesised word in a process name such as `(sd-pam)`
            (ScanState::InPid { digits: 0, .. }, _) => ScanState::Scanning,
            (ScanState::InPid { .. }, _) => {
                malformed = true;
                ScanState::Scanning
            }
        };
        previous = Some(byte);
    }

    if matches!(state, ScanState::InPid { digits, .. } if digits > 0) {
        malformed = true;
    }

    if malformed {
        return Err(DiscoveryError::MalformedExternalOutput {
            line: String::from_utf8_lossy(chunk).trim_end().to_string(),
        });
    }
    Ok(())
}

/// Reader that turns the `-` connectors of a tree diagram into newlines
struct DashesAsNewlines<R> {
    inner: R,
}

impl<R: Read> Read for DashesAsNewlines<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        for byte in &mut buf[..read] {
            if *byte == b'-' {
                *byte = b'\n';
            }
        }
        Ok(read)
    }
}

/// Parse a whole `pstree -p` listing.
///
/// The diagram is split at every `-` and newline, then consumed in chunks
/// of at most `PSTREE_LINE_BUFFER - 1` bytes, so only a single node name
/// longer than that can lose its PID group.
pub fn parse_pstree_output<R: Read>(reader: R) -> Vec<Pid> {
    let mut reader = BufReader::new(DashesAsNewlines { inner: reader });
    let mut pids = Vec::new();
    let mut chunk = Vec::with_capacity(PSTREE_LINE_BUFFER);

    loop {
        chunk.clear();
        let read = reader
            .by_ref()
            .take((PSTREE_LINE_BUFFER - 1) as u64)
            .read_until(b'\n', &mut chunk);

        match read {
            Ok(0) => break,
            Ok(_) => {
                if let Err(err) = scan_chunk(&chunk, &mut pids) {
                    debug!("{}; keeping {} PIDs parsed so far", err, pids.len());
                }
            }
            Err(err) => {
                debug!("Reading tree printer output failed: {}", err);
                break;
            }
        }
    }

    pids
}

/// Runs an external tree printer and scrapes PIDs from its output
#[derive(Debug, Clone)]
pub struct PstreeWalker {
    program: String,
    args: Vec<String>,
}

impl PstreeWalker {
    pub fn new() -> Self {
        Self::with_command(PSTREE_PROGRAM, PSTREE_ARGS.iter().copied())
    }

    /// Use a different program; the mother PID is appended as the last
    /// argument.
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn spawn(&self, mother: Pid) -> Result<Child, DiscoveryError> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(mother.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DiscoveryError::ExternalCommandLaunchFailure {
                program: self.program.clone(),
                source,
            })
    }

    /// Snapshot of `mother` and its descendants as printed by the tool.
    ///
    /// Returns an empty snapshot if the tool cannot be launched.
    pub fn walk(&self, mother: Pid) -> Vec<Pid> {
        let mut child = match self.spawn(mother) {
            Ok(child) => child,
            Err(err) => {
                warn!("{}", err);
                return Vec::new();
            }
        };

        let pids = match child.stdout.take() {
            Some(stdout) => parse_pstree_output(stdout),
            None => Vec::new(),
        };

        match child.wait() {
            Ok(status) if !status.success() => {
                debug!("{} for PID {} exited with {}", self.program, mother, status)
            }
            Ok(_) => {}
            Err(err) => debug!("Waiting for {} failed: {}", self.program, err),
        }

        pids
    }
}

impl Default for PstreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover the process tree of `mother` by scraping `pstree` output
pub fn discover_legacy(mother: Pid) -> Vec<Pid> {
    PstreeWalker::new().walk(mother)
}
