//! End-to-end checks over ROM files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use rom_inspector::hexdump::{dump_path, export_dump, parse_dump};
use rom_inspector::inspect::{file_size, open_rom, read_at_path, LOOKUP_LEN};
use rom_inspector::session::{Command, Session};
use rom_inspector::{
    decode_file, require_variant, resolve_variant, scan_file, FieldValue, RomError, RomVariant,
};
use tempfile::{tempdir, TempDir};

fn write_rom(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("Failed to write ROM");
    path
}

fn gba_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 10000];
    rom[0xA0..0xAC].copy_from_slice(b"TESTGAME    ");
    rom[0xAC..0xB0].copy_from_slice(b"BTGE");
    rom[8192 + 100..8192 + 104].copy_from_slice(b"GAME");
    rom
}

#[test]
fn gba_file_decodes_and_scans() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_rom(&dir, "test.GBA", &gba_rom());

    let variant = resolve_variant(&path).expect("known extension");
    assert_eq!(variant, RomVariant::Gba);
    assert_eq!(file_size(&path).unwrap(), 10000);

    let record = decode_file(&path, variant).unwrap();
    assert_eq!(record.title(), Some("TESTGAME"));
    assert_eq!(record.get("game_code").and_then(FieldValue::as_str), Some("BTGE"));

    let report = scan_file(&path).unwrap();
    assert_eq!(report.blocks, 3);
    assert_eq!(report.hits.len(), 1);
    assert_eq!(report.hits[0].offset, 8192);
}

#[test]
fn nes_file_sizes() {
    let dir = tempdir().unwrap();
    let mut rom = vec![0u8; 16 + 2 * 16384 + 8192];
    rom[..8].copy_from_slice(b"NES\x1A\x02\x01\x01\x00");
    let path = write_rom(&dir, "game.nes", &rom);

    let record = decode_file(&path, RomVariant::Nes).unwrap();
    assert_eq!(record.get("magic_number").unwrap().to_string(), "NES\x1A");
    assert_eq!(record.get("prg_rom_blocks").unwrap().to_string(), "2 (32 KB)");
    assert_eq!(record.get("chr_rom_blocks").unwrap().to_string(), "1 (8 KB)");
    assert_eq!(record.get("flags6").unwrap().to_string(), "0x01");
}

#[test]
fn truncated_file_yields_no_record() {
    let dir = tempdir().unwrap();
    let path = write_rom(&dir, "short.sfc", &[0u8; 100]);
    match decode_file(&path, RomVariant::Snes) {
        Err(RomError::TruncatedHeader {
            variant,
            required,
            actual,
        }) => {
            assert_eq!(variant, RomVariant::Snes);
            assert_eq!(required, 512);
            assert_eq!(actual, 100);
        }
        other => panic!("expected truncation, got {:?}", other),
    }
}

#[test]
fn missing_file_is_file_not_found() {
    let missing = Path::new("/definitely/not/here.gb");
    assert!(matches!(
        decode_file(missing, RomVariant::Gb),
        Err(RomError::FileNotFound { .. })
    ));
    assert!(matches!(scan_file(missing), Err(RomError::FileNotFound { .. })));
    assert!(matches!(file_size(missing), Err(RomError::FileNotFound { .. })));
}

#[test]
fn directory_is_not_a_rom() {
    let dir = tempdir().unwrap();
    let fake = dir.path().join("folder.gb");
    fs::create_dir(&fake).unwrap();
    assert!(matches!(open_rom(&fake), Err(RomError::FileNotFound { .. })));
    assert!(matches!(file_size(&fake), Err(RomError::FileNotFound { .. })));
}

#[test]
fn open_rom_reports_size() {
    let dir = tempdir().unwrap();
    let path = write_rom(&dir, "sized.sfc", &[0u8; 777]);
    let (_, size) = open_rom(&path).unwrap();
    assert_eq!(size, 777);
}

#[test]
fn unknown_extension_is_not_decoded() {
    assert!(resolve_variant("rom.bin").is_none());
    assert!(matches!(
        require_variant("rom.bin"),
        Err(RomError::UnknownExtension(_))
    ));
}

#[test]
fn exported_dump_round_trips() {
    let dir = tempdir().unwrap();
    let bytes: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 251) as u8).collect();
    let path = write_rom(&dir, "dump.gb", &bytes);

    let out = export_dump(&path).unwrap();
    assert_eq!(out, dump_path(&path));
    assert_eq!(out.file_name().unwrap(), "dump.gb_dump.hex");

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), (5000 + 15) / 16);
    assert_eq!(parse_dump(&text).unwrap(), bytes);
}

#[test]
fn read_at_path_bounds() {
    let dir = tempdir().unwrap();
    let bytes: Vec<u8> = (0..100).collect();
    let path = write_rom(&dir, "rom.gbc", &bytes);

    for address in [0i64, 50, 84, 90, 99] {
        let end = (address as usize + LOOKUP_LEN).min(bytes.len());
        assert_eq!(
            read_at_path(&path, address, LOOKUP_LEN).unwrap(),
            bytes[address as usize..end].to_vec()
        );
    }
    for address in [-5i64, 100, 1000] {
        assert!(matches!(
            read_at_path(&path, address, LOOKUP_LEN),
            Err(RomError::OutOfRange { .. })
        ));
    }
}

#[test]
fn scripted_session_looks_up_addresses() {
    let dir = tempdir().unwrap();
    let bytes: Vec<u8> = (0..64).collect();
    let path = write_rom(&dir, "script.gba", &bytes);

    let mut session = Session::new();
    session.start();
    let mut found = Vec::new();
    for input in ["7", "3", "0x30", "nope", "0x40", "exit", "5"] {
        if let Command::Lookup(address) = session.handle(input) {
            found.push(read_at_path(&path, address, LOOKUP_LEN).map_err(|e| e.to_string()));
        }
    }
    assert!(session.is_done());
    assert_eq!(found.len(), 2);
    assert_eq!(found[0], Ok((0x30..0x40).collect::<Vec<u8>>()));
    assert!(found[1].is_err());
}
