//! Common utilities for integration tests.
//!
//! Integration tests that drive a demo binary share this module. It builds
//! the demo on first use and resolves the path of the compiled binary.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Result, ensure};

/// Build a demo binary if it hasn't been built yet.
///
/// Safe to call from several tests; once the binary exists this is a no-op.
pub fn ensure_demo_built(name: &str) -> Result<()> {
    if demo_binary(name).exists() {
        return Ok(());
    }

    ensure!(
        demo_source_dir().join(format!("{name}.rs")).exists(),
        "No demo named '{}' in demos/",
        name
    );

    eprintln!("Demo binary '{name}' not found, building...");

    let status = Command::new(env!("CARGO"))
        .args(["build", "--example", name])
        .current_dir(manifest_dir())
        .status()?;

    ensure!(
        status.success(),
        "cargo build --example {} failed with status: {}",
        name,
        status
    );

    Ok(())
}

/// Get the path to a demo binary, building it first if needed.
///
/// ```no_run
/// use common::get_demo_path;
///
/// let path = get_demo_path("echo_stdio").unwrap();
/// // path will be something like: /path/to/project/target/debug/examples/echo_stdio
/// ```
pub fn get_demo_path(name: &str) -> Result<PathBuf> {
    ensure_demo_built(name)?;

    let binary_path = demo_binary(name);
    ensure!(
        binary_path.exists(),
        "Demo binary '{}' not found at: {}",
        name,
        binary_path.display()
    );

    Ok(binary_path)
}

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn demo_source_dir() -> PathBuf {
    manifest_dir().join("demos")
}

/// Honours `CARGO_TARGET_DIR` so relocated build directories still work.
fn target_dir() -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| manifest_dir().join("target"))
}

fn demo_binary(name: &str) -> PathBuf {
    target_dir()
        .join("debug")
        .join("examples")
        .join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_binaries_live_under_examples() {
        let path = demo_binary("echo_stdio");
        assert!(path.parent().unwrap().ends_with("examples"));
    }

    #[test]
    fn unknown_demo_is_reported() {
        assert!(ensure_demo_built("no_such_demo").is_err());
    }
}
