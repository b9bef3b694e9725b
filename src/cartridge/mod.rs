// Cartridge module - iNES image parsing and cartridge data storage.
//
// A `Cartridge` is pure data: decoded PRG and CHR banks plus the header bits
// that govern mirroring and battery-backed save RAM. It does no bank
// switching itself; that's the mapper's job (see `mappers`), which reads the
// banks stored here and copies them into the Bus's memory windows.

pub mod mappers;

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// iNES file magic: `"NES"` followed by MS-DOS EOF.
pub const INES_MAGIC: [u8; 4] = *b"NES\x1A";

/// Size of one PRG-ROM bank as counted in the iNES header.
pub const PRG_BANK_SIZE: usize = 16 * 1024;

/// Size of one half of an 8KB iNES CHR bank. CHR banks are stored split into
/// 4KB halves since that's the granularity mappers switch at (CNROM
/// switches all 8KB at once, MMC1 can switch either 8KB or two independent
/// 4KB halves).
pub const CHR_HALF_BANK_SIZE: usize = 4 * 1024;

/// Nametable mirroring mode, as selected by the header or (for MMC1) by the
/// mapper's control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

#[derive(Debug)]
pub enum CartridgeError {
    BadMagic,
    ZeroPrgBanks,
    Truncated { expected: usize, actual: usize },
    Io(String),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::BadMagic => write!(f, "not an iNES image (bad magic bytes)"),
            CartridgeError::ZeroPrgBanks => write!(f, "header declares zero PRG-ROM banks"),
            CartridgeError::Truncated { expected, actual } => write!(
                f,
                "truncated iNES image: expected at least {expected} bytes, found {actual}"
            ),
            CartridgeError::Io(msg) => write!(f, "failed to read cartridge file: {msg}"),
        }
    }
}

impl Error for CartridgeError {}

/// A parsed iNES cartridge image: header fields plus the decoded PRG/CHR
/// bank data, ready to be handed to `mappers::create_mapper`.
pub struct Cartridge {
    /// 16KB PRG-ROM banks, in file order.
    pub prg_banks: Vec<[u8; PRG_BANK_SIZE]>,

    /// 4KB CHR-ROM/CHR-RAM half-banks, in file order. Two halves make up
    /// each 8KB iNES CHR bank. If the header declares zero CHR banks the
    /// cartridge uses CHR-RAM and this holds one zero-filled 8KB bank (two
    /// halves).
    pub chr_banks: Vec<[u8; CHR_HALF_BANK_SIZE]>,

    /// Mapper number (header flags 6/7, combined).
    pub mapper_id: u8,

    /// Nametable mirroring declared by the header. For mapper 1 (MMC1) this
    /// is only the power-on default; the mapper's control register can
    /// override it at runtime.
    pub mirroring: Mirroring,

    /// Whether the cartridge has battery-backed PRG-RAM (flags 6 bit 1).
    pub has_battery: bool,

    /// Four-screen VRAM layout (flags 6 bit 3). No mapper this emulator
    /// supports uses it; tracked for completeness of the header decode.
    pub four_screen: bool,

    /// Whether `chr_banks` is writable CHR-RAM rather than CHR-ROM.
    pub chr_is_ram: bool,
}

impl Cartridge {
    /// Parse a cartridge from raw iNES file bytes.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < 16 {
            return Err(CartridgeError::Truncated {
                expected: 16,
                actual: data.len(),
            });
        }
        if data[0..4] != INES_MAGIC {
            return Err(CartridgeError::BadMagic);
        }

        let prg_count = data[4] as usize;
        let chr_count = data[5] as usize;
        if prg_count == 0 {
            return Err(CartridgeError::ZeroPrgBanks);
        }

        let flags6 = data[6];
        let flags7 = data[7];

        let vertical = flags6 & 0x01 != 0;
        let has_battery = flags6 & 0x02 != 0;
        let trainer_present = flags6 & 0x04 != 0;
        let four_screen = flags6 & 0x08 != 0;
        let mapper_id = (flags7 & 0xF0) | (flags6 >> 4);

        let mirroring = if vertical {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mut offset = 16usize;
        if trainer_present {
            offset += 512;
        }

        let prg_size = prg_count * PRG_BANK_SIZE;
        if data.len() < offset + prg_size {
            return Err(CartridgeError::Truncated {
                expected: offset + prg_size,
                actual: data.len(),
            });
        }
        let mut prg_banks = Vec::with_capacity(prg_count);
        for i in 0..prg_count {
            let start = offset + i * PRG_BANK_SIZE;
            let mut bank = [0u8; PRG_BANK_SIZE];
            bank.copy_from_slice(&data[start..start + PRG_BANK_SIZE]);
            prg_banks.push(bank);
        }
        offset += prg_size;

        let chr_is_ram = chr_count == 0;
        let chr_banks = if chr_is_ram {
            vec![[0u8; CHR_HALF_BANK_SIZE]; 2]
        } else {
            let chr_size = chr_count * 8192;
            if data.len() < offset + chr_size {
                return Err(CartridgeError::Truncated {
                    expected: offset + chr_size,
                    actual: data.len(),
                });
            }
            let mut halves = Vec::with_capacity(chr_count * 2);
            for i in 0..chr_count {
                for half in 0..2 {
                    let start = offset + i * 8192 + half * CHR_HALF_BANK_SIZE;
                    let mut bank = [0u8; CHR_HALF_BANK_SIZE];
                    bank.copy_from_slice(&data[start..start + CHR_HALF_BANK_SIZE]);
                    halves.push(bank);
                }
            }
            halves
        };

        Ok(Cartridge {
            prg_banks,
            chr_banks,
            mapper_id,
            mirroring,
            has_battery,
            four_screen,
            chr_is_ram,
        })
    }

    /// Load and parse a cartridge from a `.nes` file on disk.
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = fs::read(path).map_err(|e| CartridgeError::Io(e.to_string()))?;
        Self::from_ines_bytes(&data)
    }
}
