use modular_bitfield::prelude::*;

#[bitfield(bits = 8)]
#[derive(Debug, Clone, Copy)]
struct Flags6 {
    vertical_mirroring: bool,
    battery: bool,
    trainer: bool,
    four_screen: bool,
    mapper_lo: B4,
}

#[bitfield(bits = 8)]
#[derive(Debug, Clone, Copy)]
struct Flags7 {
    vs_unisystem: bool,
    playchoice10: bool,
    nes2_id: B2,
    mapper_hi: B4,
}

#[bitfield(bits = 8)]
#[derive(Debug, Clone, Copy)]
struct Makeup {
    map_mode: B4,
    fast: bool,
    #[skip]
    __: B3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Breakdown of iNES header bytes 6 and 7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NesDetails {
    pub magic_ok: bool,
    pub mapper: u8,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub trainer: bool,
    pub vs_unisystem: bool,
    pub playchoice10: bool,
    pub nes2: bool,
}

impl NesDetails {
    pub fn from_header(magic: &[u8], flags6: u8, flags7: u8) -> NesDetails {
        let f6 = Flags6::from_bytes([flags6]);
        let f7 = Flags7::from_bytes([flags7]);
        let mirroring = if f6.four_screen() {
            Mirroring::FourScreen
        } else if f6.vertical_mirroring() {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        NesDetails {
            magic_ok: magic == b"NES\x1A",
            mapper: f7.mapper_hi() << 4 | f6.mapper_lo(),
            mirroring,
            battery: f6.battery(),
            trainer: f6.trainer(),
            vs_unisystem: f7.vs_unisystem(),
            playchoice10: f7.playchoice10(),
            nes2: f7.nes2_id() == 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Slow,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    LoRom,
    HiRom,
    SDd1,
    SA1,
    ExHiRom,
    Spc7110,
    Unknown(u8),
}

impl From<u8> for MapMode {
    fn from(val: u8) -> MapMode {
        match val {
            0 => MapMode::LoRom,
            1 => MapMode::HiRom,
            2 => MapMode::SDd1,
            3 => MapMode::SA1,
            4 => MapMode::ExHiRom,
            5 => MapMode::Spc7110,
            n => MapMode::Unknown(n),
        }
    }
}

/// Breakdown of the SNES makeup byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnesDetails {
    pub speed: Speed,
    pub map_mode: MapMode,
}

impl SnesDetails {
    pub fn from_makeup(makeup: u8) -> SnesDetails {
        let bits = Makeup::from_bytes([makeup]);
        SnesDetails {
            speed: if bits.fast() { Speed::Fast } else { Speed::Slow },
            map_mode: MapMode::from(bits.map_mode()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDetails {
    Nes(NesDetails),
    Snes(SnesDetails),
}
