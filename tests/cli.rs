//! Runs the `rom_inspector` binary end to end.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::{tempdir, TempDir};

fn run(args: &[&Path], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_rom_inspector"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run rom_inspector");
    if let Some(mut input) = child.stdin.take() {
        // The binary may exit before reading any input.
        let _ = input.write_all(stdin.as_bytes());
    }
    child.wait_with_output().expect("Failed to wait on rom_inspector")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn gba_rom(dir: &TempDir) -> PathBuf {
    let mut rom = vec![0u8; 10000];
    rom[0xA0..0xAC].copy_from_slice(b"TESTGAME    ");
    rom[8192 + 40..8192 + 44].copy_from_slice(b"SAVE");
    let path = dir.path().join("test.gba");
    fs::write(&path, rom).expect("Failed to write ROM");
    path
}

#[test]
fn unknown_extension_exits_cleanly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, b"hello").unwrap();

    let output = run(&[path.as_path()], "");
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        format!("{} has an unknown extension.\n", path.display())
    );
}

#[test]
fn unopenable_path_fails() {
    let dir = tempdir().unwrap();
    let folder = dir.path().join("folder.gb");
    fs::create_dir(&folder).unwrap();

    let output = run(&[folder.as_path()], "5\n");
    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(!out.contains("ROM size"), "{}", out);
    assert!(!out.contains("What would you like to do?"), "{}", out);

    let missing = dir.path().join("missing.nes");
    assert!(!run(&[missing.as_path()], "").status.success());
}

#[test]
fn report_prints_size_then_header_then_scan() {
    let dir = tempdir().unwrap();
    let path = gba_rom(&dir);

    let output = run(&[Path::new("--no-menu"), path.as_path()], "");
    assert!(output.status.success());
    let out = stdout(&output);
    let size = out.find("ROM size: 10000 Bytes").expect("size line");
    let title = out.find("Game Title: TESTGAME").expect("title line");
    let scan = out
        .find("Search completed: 3 blocks processed.")
        .expect("scan line");
    let hit = out.find("Address: 0x00002000").expect("hit line");
    assert!(size < title && title < scan && scan < hit, "{}", out);
    assert!(!out.contains("What would you like to do?"));
}

#[test]
fn menu_looks_up_addresses_until_quit() {
    let dir = tempdir().unwrap();
    let path = gba_rom(&dir);

    let output = run(&[path.as_path()], "3\n0xA0\nFFFFFFFFFFFFFFFF\nxyz\nexit\n9\n5\n");
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("0x000000A0: 54 45 53 54 47 41 4D 45"), "{}", out);
    assert!(out.contains("The entered address is outside the ROM size."));
    assert!(out.contains("Invalid address. Please enter a valid hex address."));
    assert!(out.contains("Invalid selection. Please try again."));
    assert!(out.trim_end().ends_with("Program ended."), "{}", out);
}

#[test]
fn export_flag_writes_dump_file() {
    let dir = tempdir().unwrap();
    let path = gba_rom(&dir);

    let output = run(&[Path::new("--export"), path.as_path()], "");
    assert!(output.status.success());
    let dump = dir.path().join("test.gba_dump.hex");
    let text = fs::read_to_string(&dump).expect("dump written");
    assert_eq!(text.lines().count(), 625);
}
