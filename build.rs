use std::process::Command;

/// Build script that captures build metadata to expose at runtime through env vars.
///
/// This script captures:
/// - Git commit hash (short form)
/// - Build timestamp (UTC in RFC3339 format)
/// - Rust compiler version
fn main() {
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let build_time = chrono::Utc::now().to_rfc3339();

    let rustc_version = Command::new("rustc")
        .arg("--version")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|e| {
            eprintln!("Warning: Failed to get rustc version: {}", e);
            "unknown".to_string()
        });

    println!("cargo:rustc-env=LAN_DISCOVERY_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=LAN_DISCOVERY_BUILD_TIME_UTC={}", build_time);
    println!("cargo:rustc-env=LAN_DISCOVERY_RUSTC_VERSION={}", rustc_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=build.rs");
}
