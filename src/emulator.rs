use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use log::info;

use crate::error::{Result, RomError};

/// Starts `emulator <rom>` and returns the child's pid without waiting on it.
///
/// The emulator is probed with `--version` first so a missing or broken
/// install is reported before anything is spawned.
pub fn launch(emulator: &Path, rom: &Path) -> Result<u32> {
    if !rom.is_file() {
        return Err(RomError::open(
            rom,
            std::io::Error::new(ErrorKind::NotFound, "ROM file not found"),
        ));
    }

    let unavailable = |reason: String| RomError::EmulatorUnavailable {
        path: emulator.to_path_buf(),
        reason,
    };

    let status = Command::new(emulator)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| unavailable(e.to_string()))?;
    if !status.success() {
        return Err(unavailable(format!("version check {}", status)));
    }

    let child = Command::new(emulator)
        .arg(rom)
        .spawn()
        .map_err(|e| unavailable(e.to_string()))?;
    info!(
        "started {} for {} (pid {})",
        emulator.display(),
        rom.display(),
        child.id()
    );
    Ok(child.id())
}
