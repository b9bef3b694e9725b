// Mappers module - bank-switching logic for the four iNES mappers this
// emulator supports (NROM, UxROM, CNROM, MMC1).
//
// Rather than a `Box<dyn Mapper>` trait object reading every PPU/CPU access
// through indirection, a mapper here is a plain enum: `load_initial` copies
// the cartridge's starting banks into the Bus once, and `monitor` re-copies
// a bank whenever it notices (via the Bus's write latch) that the CPU wrote
// to a bank-select register. The CPU and PPU never know a mapper exists;
// they just read flat Bus memory.

use super::{Cartridge, Mirroring, CHR_HALF_BANK_SIZE, PRG_BANK_SIZE};
use crate::bus::Bus;

#[derive(Debug)]
pub enum MapperError {
    UnsupportedMapper(u8),
}

impl std::fmt::Display for MapperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperError::UnsupportedMapper(num) => write!(f, "mapper {num} is not supported"),
        }
    }
}

impl std::error::Error for MapperError {}

#[derive(Debug, Default)]
pub struct UnromState {
    prg_bank: usize,
}

#[derive(Debug, Default)]
pub struct CnromState {
    chr_bank: usize,
}

/// MMC1 serial shift-register state. Bank-select writes to `$8000-$FFFF`
/// arrive one bit at a time; the fifth write latches the accumulated value
/// into one of four internal registers depending on which address range it
/// landed in.
#[derive(Debug)]
pub struct Mmc1State {
    shift: u8,
    count: u8,
    control: u8,
    chr0: u8,
    chr1: u8,
    prg: u8,
}

impl Mmc1State {
    fn new() -> Self {
        // Power-on default fixes the last PRG bank at $C000 and makes
        // $8000 the switchable window (control bits 2-3 = 0b11), which is
        // also the state the $80-bit reset forces it back into.
        Mmc1State {
            shift: 0,
            count: 0,
            control: 0x0C,
            chr0: 0,
            chr1: 0,
            prg: 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8, cart: &Cartridge, bus: &mut Bus) {
        if data & 0x80 != 0 {
            self.shift = 0;
            self.count = 0;
            self.control |= 0x0C;
            self.apply(cart, bus);
            return;
        }

        self.shift |= (data & 0x01) << self.count;
        self.count += 1;

        if self.count == 5 {
            let value = self.shift & 0x1F;
            match (addr >> 13) & 0x03 {
                0 => self.control = value,
                1 => self.chr0 = value,
                2 => self.chr1 = value,
                3 => self.prg = value,
                _ => unreachable!(),
            }
            self.shift = 0;
            self.count = 0;
            self.apply(cart, bus);
        }
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0x03 {
            2 => Mirroring::Vertical,
            // Real MMC1 also has two one-screen modes (0, 1); this
            // emulator only models horizontal/vertical, so both one-screen
            // selections and the horizontal selection (3) collapse to
            // horizontal.
            _ => Mirroring::Horizontal,
        }
    }

    fn apply(&mut self, cart: &Cartridge, bus: &mut Bus) {
        if self.control & 0x10 == 0 {
            let bank8k = (self.chr0 as usize & 0x1E) >> 1;
            copy_chr_8k(cart, bank8k, bus);
        } else {
            copy_chr_half(cart, self.chr0 as usize, bus, 0x0000);
            copy_chr_half(cart, self.chr1 as usize, bus, 0x1000);
        }

        let prg_bank = self.prg as usize & 0x0F;
        match (self.control >> 2) & 0x03 {
            0 | 1 => {
                let bank32 = prg_bank & !1;
                copy_prg_bank(cart, bank32, bus, 0x8000);
                copy_prg_bank(cart, bank32 + 1, bus, 0xC000);
            }
            2 => {
                copy_prg_bank(cart, 0, bus, 0x8000);
                copy_prg_bank(cart, prg_bank, bus, 0xC000);
            }
            3 => {
                copy_prg_bank(cart, prg_bank, bus, 0x8000);
                copy_prg_bank(cart, cart.prg_banks.len() - 1, bus, 0xC000);
            }
            _ => unreachable!(),
        }
    }
}

/// A cartridge mapper: owns whatever per-mapper bank-select state the
/// cartridge's mapper number needs, and knows how to install its banks
/// into the Bus.
pub enum Mapper {
    Nrom,
    Unrom(UnromState),
    Cnrom(CnromState),
    Mmc1(Mmc1State),
}

/// Copy one 16KB PRG bank into a Bus window at `$8000` or `$C000`.
fn copy_prg_bank(cart: &Cartridge, bank: usize, bus: &mut Bus, window: u16) {
    let bank = bank % cart.prg_banks.len();
    bus.main_memory_slice_mut(window, PRG_BANK_SIZE)
        .copy_from_slice(&cart.prg_banks[bank]);
}

/// Copy one 4KB CHR half-bank into a PPU pattern-table window (`$0000` or
/// `$1000`).
fn copy_chr_half(cart: &Cartridge, half: usize, bus: &mut Bus, window: u16) {
    let half = half % cart.chr_banks.len();
    bus.vram_slice_mut(window, CHR_HALF_BANK_SIZE)
        .copy_from_slice(&cart.chr_banks[half]);
}

/// Copy both halves of an 8KB CHR bank into `$0000` and `$1000`.
fn copy_chr_8k(cart: &Cartridge, bank8k: usize, bus: &mut Bus) {
    copy_chr_half(cart, bank8k * 2, bus, 0x0000);
    copy_chr_half(cart, bank8k * 2 + 1, bus, 0x1000);
}

impl Mapper {
    /// Copy the cartridge's power-on banks into the Bus. Must be called
    /// once before the CPU starts executing.
    pub fn load_initial(&mut self, cart: &Cartridge, bus: &mut Bus) {
        match self {
            Mapper::Nrom => {
                copy_prg_bank(cart, 0, bus, 0x8000);
                let last = cart.prg_banks.len() - 1;
                copy_prg_bank(cart, last, bus, 0xC000);
                copy_chr_8k(cart, 0, bus);
            }
            Mapper::Unrom(state) => {
                state.prg_bank = 0;
                copy_prg_bank(cart, 0, bus, 0x8000);
                let last = cart.prg_banks.len() - 1;
                copy_prg_bank(cart, last, bus, 0xC000);
                copy_chr_8k(cart, 0, bus);
            }
            Mapper::Cnrom(state) => {
                state.chr_bank = 0;
                copy_prg_bank(cart, 0, bus, 0x8000);
                let last = cart.prg_banks.len() - 1;
                copy_prg_bank(cart, last, bus, 0xC000);
                copy_chr_8k(cart, 0, bus);
            }
            Mapper::Mmc1(state) => {
                *state = Mmc1State::new();
                state.apply(cart, bus);
            }
        }
    }

    /// Inspect the Bus's write latch for a bank-select write and, if one
    /// occurred since the last call, apply it. Called once per CPU step
    /// alongside the PPU/APU/controller observers.
    pub fn monitor(&mut self, cart: &Cartridge, bus: &mut Bus) {
        let Some(addr) = bus.last_write_addr() else {
            return;
        };
        if !(0x8000..=0xFFFF).contains(&addr) {
            return;
        }
        let data = bus.last_write_data();

        match self {
            Mapper::Nrom => {}
            Mapper::Unrom(state) => {
                state.prg_bank = data as usize & 0x0F;
                copy_prg_bank(cart, state.prg_bank, bus, 0x8000);
            }
            Mapper::Cnrom(state) => {
                state.chr_bank = data as usize & 0x03;
                copy_chr_8k(cart, state.chr_bank, bus);
            }
            Mapper::Mmc1(state) => state.write(addr, data, cart, bus),
        }
    }

    /// Current nametable mirroring mode. Fixed for NROM/UxROM/CNROM;
    /// dynamic for MMC1, where it follows the control register.
    pub fn mirroring(&self, cart: &Cartridge) -> Mirroring {
        match self {
            Mapper::Mmc1(state) => state.mirroring(),
            _ => cart.mirroring,
        }
    }
}

/// Create the mapper implementation for a cartridge's header-declared
/// mapper number.
pub fn create_mapper(cart: &Cartridge) -> Result<Mapper, MapperError> {
    match cart.mapper_id {
        0 => Ok(Mapper::Nrom),
        1 => Ok(Mapper::Mmc1(Mmc1State::new())),
        2 => Ok(Mapper::Unrom(UnromState::default())),
        3 => Ok(Mapper::Cnrom(CnromState::default())),
        n => Err(MapperError::UnsupportedMapper(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::CHR_HALF_BANK_SIZE;

    fn cart_with_prg_banks(n: usize) -> Cartridge {
        let mut prg_banks = Vec::with_capacity(n);
        for i in 0..n {
            let mut bank = [0u8; PRG_BANK_SIZE];
            bank[0] = i as u8;
            prg_banks.push(bank);
        }
        Cartridge {
            prg_banks,
            chr_banks: vec![[0u8; CHR_HALF_BANK_SIZE]; 2],
            mapper_id: 0,
            mirroring: Mirroring::Horizontal,
            has_battery: false,
            four_screen: false,
            chr_is_ram: true,
        }
    }

    #[test]
    fn nrom_mirrors_single_bank_to_both_windows() {
        let cart = cart_with_prg_banks(1);
        let mut bus = Bus::new();
        let mut mapper = create_mapper(&cart).unwrap();
        mapper.load_initial(&cart, &mut bus);
        assert_eq!(bus.read_raw(0x8000), 0);
        assert_eq!(bus.read_raw(0xC000), 0);
    }

    #[test]
    fn unrom_switches_low_bank_on_write() {
        let mut cart = cart_with_prg_banks(4);
        cart.mapper_id = 2;
        let mut bus = Bus::new();
        let mut mapper = create_mapper(&cart).unwrap();
        mapper.load_initial(&cart, &mut bus);
        assert_eq!(bus.read_raw(0x8000), 0);
        assert_eq!(bus.read_raw(0xC000), 3); // fixed to last bank

        bus.write(0x8000, 2);
        mapper.monitor(&cart, &mut bus);
        assert_eq!(bus.read_raw(0x8000), 2);
        assert_eq!(bus.read_raw(0xC000), 3); // unchanged
    }

    #[test]
    fn cnrom_switches_chr_bank_on_write() {
        let mut cart = cart_with_prg_banks(1);
        cart.mapper_id = 3;
        cart.chr_is_ram = false;
        cart.chr_banks = (0..4)
            .map(|i| {
                let mut half = [0u8; CHR_HALF_BANK_SIZE];
                half[0] = i;
                half
            })
            .collect();
        let mut bus = Bus::new();
        let mut mapper = create_mapper(&cart).unwrap();
        mapper.load_initial(&cart, &mut bus);
        assert_eq!(bus.vram_read(0x0000), 0);

        bus.write(0x8000, 1);
        mapper.monitor(&cart, &mut bus);
        assert_eq!(bus.vram_read(0x0000), 2);
        assert_eq!(bus.vram_read(0x1000), 3);
    }

    #[test]
    fn mmc1_requires_five_writes_to_latch_a_register() {
        let mut cart = cart_with_prg_banks(4);
        cart.mapper_id = 1;
        let mut bus = Bus::new();
        let mut mapper = create_mapper(&cart).unwrap();
        mapper.load_initial(&cart, &mut bus);

        // select PRG bank 1, fix-last-prg mode already default (control=0x0C)
        for bit in [1, 0, 0, 0, 0] {
            bus.write(0xE000, bit);
            mapper.monitor(&cart, &mut bus);
        }
        assert_eq!(bus.read_raw(0x8000), 1);
        assert_eq!(bus.read_raw(0xC000), 3);
    }

    #[test]
    fn mmc1_reset_bit_restores_fix_last_prg_mode() {
        let mut cart = cart_with_prg_banks(4);
        cart.mapper_id = 1;
        let mut bus = Bus::new();
        let mut mapper = create_mapper(&cart).unwrap();
        mapper.load_initial(&cart, &mut bus);

        // switch to 32KB mode (control bits 2-3 = 0)
        for bit in [0, 0, 0, 0, 0] {
            bus.write(0x8000, bit);
            mapper.monitor(&cart, &mut bus);
        }
        bus.write(0x8000, 0x80);
        mapper.monitor(&cart, &mut bus);
        if let Mapper::Mmc1(state) = &mapper {
            assert_eq!(state.control & 0x0C, 0x0C);
        } else {
            panic!("expected MMC1 mapper");
        }
    }

    #[test]
    fn unsupported_mapper_number_errors() {
        let mut cart = cart_with_prg_banks(1);
        cart.mapper_id = 99;
        assert!(matches!(
            create_mapper(&cart),
            Err(MapperError::UnsupportedMapper(99))
        ));
    }
}
