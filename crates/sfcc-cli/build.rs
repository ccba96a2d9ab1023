//! Embeds the package version and git revision into the binary.

use std::process::Command;

fn main() {
    // Paths are relative to this crate; the repository root is two levels up.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/");

    let package = env!("CARGO_PKG_VERSION");
    let version = match git_revision() {
        Some(rev) if rev.trim_start_matches('v') != package => format!("{package} ({rev})"),
        _ => package.to_string(),
    };

    println!("cargo:rustc-env=SFCC_CI_VERSION={version}");
}

fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let rev = String::from_utf8(output.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}
