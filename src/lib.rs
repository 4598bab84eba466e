pub use error::{Result, RomError};
pub use header::{decode_file, decode_header, FieldValue, HeaderRecord};
pub use scan::{scan_file, scan_for_markers, ScanHit, ScanReport};
pub use variant::{require_variant, resolve_variant, RomVariant};

pub mod config;
pub mod emulator;
mod error;
pub mod flags;
pub mod header;
pub mod hexdump;
pub mod inspect;
pub mod scan;
pub mod session;
pub mod variant;
