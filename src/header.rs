use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Result, RomError};
use crate::flags::{HeaderDetails, NesDetails, SnesDetails};
use crate::variant::RomVariant;

use FieldKind::{Ascii, Blocks, Bytes, Code, Int, IntOrDefault, Pow2Kib};

/// How the bytes of a header field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw byte run, hex-encoded contiguously.
    Bytes,
    /// Numeric code, rendered as `0x` followed by uppercase hex.
    Code,
    Ascii { trim: bool },
    Int,
    /// Count of fixed-size blocks.
    Blocks { kib: u64 },
    /// Integer where zero stands for `default`.
    IntOrDefault { default: u64 },
    /// Size given as an exponent, `2^value` KiB.
    Pow2Kib,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub offset: usize,
    pub len: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(
        name: &'static str,
        label: &'static str,
        offset: usize,
        len: usize,
        kind: FieldKind,
    ) -> FieldSpec {
        FieldSpec {
            name,
            label,
            offset,
            len,
            kind,
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

const TITLE: FieldKind = Ascii { trim: true };
const TEXT: FieldKind = Ascii { trim: false };

const GBA_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("entry", "Entry Point", 0x00, 4, Bytes),
    FieldSpec::new("logo", "Nintendo Logo", 0x04, 0x9C, Bytes),
    FieldSpec::new("title", "Game Title", 0xA0, 12, TITLE),
    FieldSpec::new("game_code", "Game Code", 0xAC, 4, TEXT),
    FieldSpec::new("maker", "Maker Code", 0xB0, 2, TEXT),
    FieldSpec::new("fixed", "Fixed Value", 0xB2, 1, Code),
    FieldSpec::new("unit", "Unit Code", 0xB3, 1, Code),
    FieldSpec::new("capacity", "Device Capacity", 0xB4, 1, Code),
    FieldSpec::new("version", "Software Version", 0xB7, 1, Int),
    FieldSpec::new("checksum", "Complement Check", 0xB8, 1, Code),
];

const GB_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("entry", "Entry Point", 0x100, 4, Bytes),
    FieldSpec::new("logo", "Nintendo Logo", 0x104, 48, Bytes),
    FieldSpec::new("title", "Game Title", 0x134, 16, TITLE),
    FieldSpec::new("maker", "Maker Code", 0x143, 1, Code),
    FieldSpec::new("fixed", "Fixed Value", 0x144, 1, Code),
    FieldSpec::new("unit", "Unit Code", 0x145, 1, Code),
    FieldSpec::new("capacity", "Device Capacity", 0x146, 1, Code),
    FieldSpec::new("version", "Software Version", 0x147, 1, Int),
];

const GBC_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("entry", "Entry Point", 0x100, 4, Bytes),
    FieldSpec::new("logo", "Nintendo Logo", 0x104, 48, Bytes),
    FieldSpec::new("title", "Game Title", 0x134, 16, TITLE),
    FieldSpec::new("maker", "Maker Code", 0x13F, 2, Code),
    FieldSpec::new("unit", "Unit Code", 0x144, 2, Code),
    FieldSpec::new("capacity", "Device Capacity", 0x146, 1, Code),
    FieldSpec::new("version", "Software Version", 0x14C, 1, Int),
    FieldSpec::new("fixed", "Fixed Value", 0x14D, 2, Code),
];

const NES_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("magic_number", "Magic Number (iNES)", 0, 4, TEXT),
    FieldSpec::new("prg_rom_blocks", "PRG-ROM (16 KB blocks)", 4, 1, Blocks { kib: 16 }),
    FieldSpec::new("chr_rom_blocks", "CHR-ROM (8 KB blocks)", 5, 1, Blocks { kib: 8 }),
    FieldSpec::new("flags6", "Flags 6 (Mapper, Mirroring, Battery)", 6, 1, Code),
    FieldSpec::new("flags7", "Flags 7 (Mapper, NES 2.0)", 7, 1, Code),
    FieldSpec::new("prg_ram_blocks", "PRG-RAM (8 KB blocks)", 8, 1, IntOrDefault { default: 8 }),
    FieldSpec::new("flags9", "Flags 9 (TV System)", 9, 1, Code),
    FieldSpec::new("flags10", "Flags 10 (TV System, PRG-RAM)", 10, 1, Code),
];

const SNES_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Game Title", 0x10, 16, TITLE),
    FieldSpec::new("makeup", "ROM Makeup (Speed/Type)", 0x25, 1, Code),
    FieldSpec::new("rom_size_exp", "ROM Size (2^N KB)", 0x27, 1, Pow2Kib),
    FieldSpec::new("sram_size_exp", "SRAM Size (2^N KB)", 0x28, 1, Pow2Kib),
    FieldSpec::new("license", "License Code", 0x29, 1, Code),
    FieldSpec::new("version", "Version", 0x2A, 1, Int),
    FieldSpec::new("checksum", "Checksum", 0x2C, 2, Bytes),
    FieldSpec::new("checksum_complement", "Checksum Complement", 0x2E, 2, Bytes),
];

/// Field table of a variant, in display order.
pub fn field_specs(variant: RomVariant) -> &'static [FieldSpec] {
    match variant {
        RomVariant::Gb => GB_FIELDS,
        RomVariant::Gbc => GBC_FIELDS,
        RomVariant::Gba => GBA_FIELDS,
        RomVariant::Nes => NES_FIELDS,
        RomVariant::Snes => SNES_FIELDS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bytes(Vec<u8>),
    Code(Vec<u8>),
    Ascii(String),
    Int(u64),
    /// `kib` is `None` when the size does not fit in 64 bits.
    Size { raw: u64, kib: Option<u64> },
}

impl FieldValue {
    fn decode(kind: FieldKind, bytes: &[u8]) -> FieldValue {
        match kind {
            FieldKind::Bytes => FieldValue::Bytes(bytes.to_vec()),
            FieldKind::Code => FieldValue::Code(bytes.to_vec()),
            FieldKind::Ascii { trim } => {
                let text = ascii_lossy(bytes);
                if trim {
                    FieldValue::Ascii(
                        text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
                            .to_string(),
                    )
                } else {
                    FieldValue::Ascii(text)
                }
            }
            FieldKind::Int => FieldValue::Int(le_value(bytes)),
            FieldKind::Blocks { kib } => {
                let raw = le_value(bytes);
                FieldValue::Size {
                    raw,
                    kib: raw.checked_mul(kib),
                }
            }
            FieldKind::IntOrDefault { default } => match le_value(bytes) {
                0 => FieldValue::Int(default),
                n => FieldValue::Int(n),
            },
            FieldKind::Pow2Kib => {
                let raw = le_value(bytes);
                let kib = u32::try_from(raw).ok().and_then(|n| 1u64.checked_shl(n));
                FieldValue::Size { raw, kib }
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Ascii(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Size { raw, .. } => Some(*raw),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Bytes(bytes) => f.write_str(&to_hex(bytes)),
            FieldValue::Code(bytes) => write!(f, "0x{}", to_hex(bytes)),
            FieldValue::Ascii(text) => f.write_str(text),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Size { raw, kib: Some(kib) } => write!(f, "{} ({} KB)", raw, kib),
            FieldValue::Size { raw, kib: None } => write!(f, "{} (2^{} KB)", raw, raw),
        }
    }
}

/// Uppercase hex with no separators.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// ASCII bytes pass through, anything above 0x7F becomes U+FFFD.
fn ascii_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
        .collect()
}

fn le_value(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .rev()
        .fold(0, |acc, &b| acc << 8 | b as u64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub spec: &'static FieldSpec,
    pub value: FieldValue,
}

/// Decoded header fields of one ROM, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    variant: RomVariant,
    fields: Vec<Field>,
    details: Option<HeaderDetails>,
}

impl HeaderRecord {
    pub fn variant(&self) -> RomVariant {
        self.variant
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.spec.name == name)
            .map(|field| &field.value)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(FieldValue::as_str)
    }

    pub fn details(&self) -> Option<&HeaderDetails> {
        self.details.as_ref()
    }
}

/// Reads the variant's header region from the current position of `reader`.
pub fn decode_header<R: Read>(reader: R, variant: RomVariant) -> Result<HeaderRecord> {
    let required = variant.header_size();
    let mut header = Vec::with_capacity(required);
    reader.take(required as u64).read_to_end(&mut header)?;
    if header.len() < required {
        return Err(RomError::TruncatedHeader {
            variant,
            required,
            actual: header.len(),
        });
    }

    let fields = field_specs(variant)
        .iter()
        .map(|spec| {
            debug_assert!(spec.end() <= required, "{} overruns header", spec.name);
            let value = FieldValue::decode(spec.kind, &header[spec.offset..spec.end()]);
            debug!("{} {}: {}", variant, spec.label, value);
            Field { spec, value }
        })
        .collect();

    let details = match variant {
        RomVariant::Nes => {
            let nes = NesDetails::from_header(&header[0..4], header[6], header[7]);
            if !nes.magic_ok {
                warn!("iNES magic missing, header may not be iNES");
            }
            Some(HeaderDetails::Nes(nes))
        }
        RomVariant::Snes => Some(HeaderDetails::Snes(SnesDetails::from_makeup(header[0x25]))),
        _ => None,
    };

    let record = HeaderRecord {
        variant,
        fields,
        details,
    };
    if let Some(title) = record.title() {
        info!("{} ROM title: {}", variant, title);
    }
    Ok(record)
}

/// Opens `path`, decodes its header and closes it again.
pub fn decode_file(path: impl AsRef<Path>, variant: RomVariant) -> Result<HeaderRecord> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RomError::open(path, e))?;
    decode_header(file, variant)
}
