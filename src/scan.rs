use std::fs::File;
use std::io::{ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::Path;

use log::{debug, info};

use crate::error::{Result, RomError};

pub const BLOCK_SIZE: usize = 4096;
pub const MARKERS: [&[u8]; 2] = [b"SAVE", b"GAME"];
pub const EXCERPT_LEN: usize = 16;

/// A block that contains at least one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit {
    /// Start of the block, not of the match.
    pub offset: u64,
    /// Leading bytes of the block.
    pub excerpt: Vec<u8>,
    /// Absolute offset of the first marker in the block.
    pub match_offset: u64,
    pub marker: &'static [u8],
}

impl ScanHit {
    pub fn marker_str(&self) -> &'static str {
        // Markers are ASCII literals.
        std::str::from_utf8(self.marker).unwrap_or("?")
    }
}

/// Walks a stream block by block, yielding a hit for every block holding a marker.
///
/// Markers that straddle two blocks are not seen. The scanner is single-pass;
/// once it returns `None` (or an error) it stays exhausted.
pub struct MarkerScanner<R> {
    reader: R,
    buf: Box<[u8]>,
    offset: u64,
    blocks: u64,
    done: bool,
}

impl<R: Read> MarkerScanner<R> {
    pub fn new(reader: R) -> MarkerScanner<R> {
        MarkerScanner {
            reader,
            buf: vec![0; BLOCK_SIZE].into_boxed_slice(),
            offset: 0,
            blocks: 0,
            done: false,
        }
    }

    /// Blocks consumed so far.
    pub fn blocks_scanned(&self) -> u64 {
        self.blocks
    }

    /// Bytes consumed so far.
    pub fn bytes_scanned(&self) -> u64 {
        self.offset
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }
}

impl<R: Read> Iterator for MarkerScanner<R> {
    type Item = Result<ScanHit>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let len = match fill_block(&mut self.reader, &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(len) => len,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            let start = self.offset;
            let block = &self.buf[..len];
            self.offset += len as u64;
            self.blocks += 1;
            debug!("block {} at 0x{:08X}, {} bytes", self.blocks - 1, start, len);

            if let Some((pos, marker)) = first_marker(block) {
                let hit = ScanHit {
                    offset: start,
                    excerpt: block[..len.min(EXCERPT_LEN)].to_vec(),
                    match_offset: start + pos as u64,
                    marker,
                };
                debug!("marker {:?} in block at 0x{:08X}", hit.marker_str(), start);
                return Some(Ok(hit));
            }
        }
        None
    }
}

impl<R: Read> FusedIterator for MarkerScanner<R> {}

/// Fills `buf` unless the stream ends first. Returns the number of bytes read.
pub(crate) fn fill_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn first_marker(block: &[u8]) -> Option<(usize, &'static [u8])> {
    MARKERS
        .iter()
        .filter_map(|marker| find(block, marker).map(|pos| (pos, *marker)))
        .min_by_key(|(pos, _)| *pos)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub blocks: u64,
    pub bytes: u64,
    pub hits: Vec<ScanHit>,
}

/// Scans the whole stream. Never stops early, so `blocks` is always
/// `ceil(bytes / BLOCK_SIZE)`.
pub fn scan_for_markers<R: Read>(reader: R) -> Result<ScanReport> {
    let mut scanner = MarkerScanner::new(reader);
    let hits = scanner.by_ref().collect::<Result<Vec<_>>>()?;
    info!(
        "scan finished: {} blocks, {} hits",
        scanner.blocks_scanned(),
        hits.len()
    );
    Ok(ScanReport {
        blocks: scanner.blocks_scanned(),
        bytes: scanner.bytes_scanned(),
        hits,
    })
}

pub fn scan_file(path: impl AsRef<Path>) -> Result<ScanReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RomError::open(path, e))?;
    scan_for_markers(file)
}
