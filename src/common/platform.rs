//! Client binary resolution for the current OS and architecture
//!
//! Release builds of the client are named `<prefix>-<os>-<arch>`, with an
//! `.exe` suffix on Windows.

use std::path::{Path, PathBuf};

use super::{Error, Result};

/// Normalized operating system names used in binary file names
fn os_tag(os: &str) -> Option<&'static str> {
    match os {
        "linux" => Some("linux"),
        "macos" | "darwin" => Some("macos"),
        "windows" => Some("windows"),
        _ => None,
    }
}

/// Normalized architecture names used in binary file names
fn arch_tag(arch: &str) -> Option<&'static str> {
    match arch {
        "x86_64" | "amd64" | "x64" => Some("x64"),
        "aarch64" | "arm64" => Some("arm64"),
        _ => None,
    }
}

/// Binary file name for an OS/architecture pair
pub fn binary_name(prefix: &str, os: &str, arch: &str) -> Result<String> {
    let os_lower = os.to_ascii_lowercase();
    let arch_lower = arch.to_ascii_lowercase();

    match (os_tag(&os_lower), arch_tag(&arch_lower)) {
        (Some("windows"), Some(arch)) => Ok(format!("{prefix}-windows-{arch}.exe")),
        (Some(os), Some(arch)) => Ok(format!("{prefix}-{os}-{arch}")),
        _ => Err(Error::unsupported_platform(os, arch)),
    }
}

/// Binary file name for the platform this harness was built for
pub fn current_binary_name(prefix: &str) -> Result<String> {
    binary_name(prefix, std::env::consts::OS, std::env::consts::ARCH)
}

/// Resolve the client binary inside `dist_root`, failing if it is missing
pub fn resolve_binary(dist_root: &Path, prefix: &str) -> Result<PathBuf> {
    let binary = dist_root.join(current_binary_name(prefix)?);
    if !binary.exists() {
        return Err(Error::BinaryNotFound(binary));
    }
    Ok(binary)
}
