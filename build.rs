use std::env;
use std::process::Command;

/// Short hash of the checked-out commit, if built from a git tree
fn commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

/// Packaged builds pin the reported version through `VERSION`; an empty
/// value counts as unset
fn reported_version() -> String {
    env::var("VERSION")
        .ok()
        .filter(|version| !version.trim().is_empty())
        .or_else(|| env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_default()
}

fn main() {
    let hash = commit_hash().unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={}", hash);
    println!("cargo:rustc-env=PIDTREE_VERSION={}", reported_version());

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=VERSION");
}
