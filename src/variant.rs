use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, RomError};

/// Console family a ROM file belongs to, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RomVariant {
    Gb,
    Gbc,
    Gba,
    Nes,
    Snes,
}

static EXTENSIONS: [(&str, RomVariant); 11] = [
    ("gb", RomVariant::Gb),
    ("gbc", RomVariant::Gbc),
    ("gba", RomVariant::Gba),
    ("nes", RomVariant::Nes),
    ("unf", RomVariant::Nes),
    ("fds", RomVariant::Nes),
    ("sfc", RomVariant::Snes),
    ("smc", RomVariant::Snes),
    ("fig", RomVariant::Snes),
    ("bs", RomVariant::Snes),
    ("st", RomVariant::Snes),
];

impl RomVariant {
    pub const ALL: [RomVariant; 5] = [
        RomVariant::Gb,
        RomVariant::Gbc,
        RomVariant::Gba,
        RomVariant::Nes,
        RomVariant::Snes,
    ];

    /// Number of leading bytes the decoder reads for this variant.
    pub fn header_size(self) -> usize {
        match self {
            RomVariant::Gb => 0x148,
            // Version and fixed value sit at 0x14C..0x14F.
            RomVariant::Gbc => 0x150,
            RomVariant::Gba => 192,
            RomVariant::Nes => 16,
            RomVariant::Snes => 512,
        }
    }

    pub fn extensions(self) -> impl Iterator<Item = &'static str> {
        EXTENSIONS
            .iter()
            .filter(move |(_, variant)| *variant == self)
            .map(|(ext, _)| *ext)
    }

    pub fn name(self) -> &'static str {
        match self {
            RomVariant::Gb => "GB",
            RomVariant::Gbc => "GBC",
            RomVariant::Gba => "GBA",
            RomVariant::Nes => "NES",
            RomVariant::Snes => "SNES",
        }
    }
}

impl fmt::Display for RomVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Picks the variant from the file extension, ignoring case. Does no I/O.
pub fn resolve_variant(path: impl AsRef<Path>) -> Option<RomVariant> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, variant)| *variant)
}

/// Like [`resolve_variant`], but as an error for callers that want one.
pub fn require_variant(path: impl AsRef<Path>) -> Result<RomVariant> {
    let path = path.as_ref();
    resolve_variant(path).ok_or_else(|| RomError::UnknownExtension(path.to_path_buf()))
}
