use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Result, RomError};

/// Default number of bytes shown for an address lookup.
pub const LOOKUP_LEN: usize = 16;

/// Parses a hex address such as `1000`, `0x1000` or `-0x10`.
///
/// The sign is kept so that negative input is reported as out of range by
/// [`read_at`] rather than as malformed.
pub fn parse_address(input: &str) -> Result<i64> {
    let invalid = || RomError::InvalidInput(input.to_string());
    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .unwrap_or(unsigned);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    // Valid hex that does not fit saturates, so it is rejected as out of range.
    let address = match i64::from_str_radix(digits, 16) {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Ok(address)
}

/// Reads up to `length` bytes at `address`. The result is shorter than
/// `length` only when the end of the stream is reached.
pub fn read_at<R: Read + Seek>(reader: &mut R, address: i64, length: usize) -> Result<Vec<u8>> {
    let size = reader.seek(SeekFrom::End(0))?;
    let start = match u64::try_from(address) {
        Ok(start) if start < size => start,
        _ => return Err(RomError::OutOfRange { address, size }),
    };
    reader.seek(SeekFrom::Start(start))?;
    let mut bytes = Vec::with_capacity(length);
    reader.take(length as u64).read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Opens `path` for a single lookup.
pub fn read_at_path(path: impl AsRef<Path>, address: i64, length: usize) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| RomError::open(path, e))?;
    read_at(&mut file, address, length)
}

/// Opens `path` for reading and returns the handle with the file's size.
/// Anything other than a readable regular file is `FileNotFound`.
pub fn open_rom(path: impl AsRef<Path>) -> Result<(File, u64)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RomError::open(path, e))?;
    let meta = file.metadata().map_err(|e| RomError::open(path, e))?;
    if !meta.is_file() {
        return Err(RomError::open(
            path,
            io::Error::new(ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    Ok((file, meta.len()))
}

pub fn file_size(path: impl AsRef<Path>) -> Result<u64> {
    open_rom(path).map(|(_, size)| size)
}
