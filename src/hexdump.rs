use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Result, RomError};
use crate::scan::fill_block;

pub const BYTES_PER_LINE: usize = 16;
const HEX_COLUMN_WIDTH: usize = 47;

/// `0x{address:08X}: {hex bytes, padded to 47} | {ascii}`
pub fn format_line(address: u64, bytes: &[u8]) -> String {
    let pairs = bytes
        .chunks(1)
        .map(hex::encode_upper)
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "0x{:08X}: {:<width$} | {}",
        address,
        pairs,
        printable(bytes),
        width = HEX_COLUMN_WIDTH
    )
}

/// Printable ASCII as-is, everything else as `.`.
pub fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '.' })
        .collect()
}

/// Writes one dump line per 16 bytes of `reader`. Returns the number of lines.
pub fn write_dump<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<u64> {
    let mut buf = [0u8; BYTES_PER_LINE];
    let mut address = 0u64;
    let mut lines = 0;
    loop {
        let len = fill_block(&mut reader, &mut buf)?;
        if len == 0 {
            break;
        }
        writeln!(writer, "{}", format_line(address, &buf[..len]))?;
        address += len as u64;
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}

/// `<path>_dump.hex`, next to the ROM.
pub fn dump_path(rom: impl AsRef<Path>) -> PathBuf {
    let mut name = OsString::from(rom.as_ref().as_os_str());
    name.push("_dump.hex");
    PathBuf::from(name)
}

/// Writes the dump of `rom` to [`dump_path`] and returns that path.
pub fn export_dump(rom: impl AsRef<Path>) -> Result<PathBuf> {
    let rom = rom.as_ref();
    let input = File::open(rom).map_err(|e| RomError::open(rom, e))?;
    let output = dump_path(rom);
    let writer = BufWriter::new(File::create(&output)?);
    let lines = write_dump(input, writer)?;
    info!("wrote {} lines to {}", lines, output.display());
    Ok(output)
}

/// Recovers the address and bytes of a dump line from its hex column.
pub fn parse_line(line: &str) -> Result<(u64, Vec<u8>)> {
    let invalid = || RomError::InvalidInput(line.to_string());
    let (address, rest) = line
        .strip_prefix("0x")
        .and_then(|l| l.split_once(": "))
        .ok_or_else(invalid)?;
    let address = u64::from_str_radix(address, 16).map_err(|_| invalid())?;
    let column = rest.get(..HEX_COLUMN_WIDTH).ok_or_else(invalid)?;
    if !rest[HEX_COLUMN_WIDTH..].starts_with(" | ") {
        return Err(invalid());
    }
    let digits: String = column.split_whitespace().collect();
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    if bytes.is_empty() || bytes.len() > BYTES_PER_LINE {
        return Err(invalid());
    }
    Ok((address, bytes))
}

/// Rebuilds the original bytes from a complete dump.
pub fn parse_dump(text: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    for line in text.lines().filter(|l| !l.is_empty()) {
        let (address, bytes) = parse_line(line)?;
        if address != data.len() as u64 {
            return Err(RomError::InvalidInput(line.to_string()));
        }
        data.extend_from_slice(&bytes);
    }
    Ok(data)
}
