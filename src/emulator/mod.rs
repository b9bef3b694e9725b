// Emulator module - Main emulator coordinator
//
// `Emulator` owns every collaborator (`Cpu`, `Bus`, `Ppu`, `Apu`,
// `ControllerPort`, the loaded `Cartridge`/`Mapper`) and drives the System
// clock: `step()` runs exactly one CPU instruction and brings every other
// collaborator forward in lockstep with it, following the same
// observe-the-Bus protocol each collaborator already implements on its own.

mod config;
mod recent_roms;

pub use config::{AudioConfig, EmulatorConfig, HotkeyConfig, SpeedMode, VideoConfig};
pub use recent_roms::{RecentRomEntry, RecentRomsList};

use crate::apu::Apu;
use crate::bus::Bus;
use crate::cartridge::mappers::{create_mapper, Mapper, MapperError};
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::{Cpu, CpuError};
use crate::input::{Controller, ControllerPort};
use crate::ppu::Ppu;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Errors raised while loading a cartridge into the emulator.
#[derive(Debug)]
pub enum EmulatorError {
    Cartridge(CartridgeError),
    Mapper(MapperError),
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorError::Cartridge(e) => write!(f, "{e}"),
            EmulatorError::Mapper(e) => write!(f, "{e}"),
        }
    }
}

impl Error for EmulatorError {}

impl From<CartridgeError> for EmulatorError {
    fn from(e: CartridgeError) -> Self {
        EmulatorError::Cartridge(e)
    }
}

impl From<MapperError> for EmulatorError {
    fn from(e: MapperError) -> Self {
        EmulatorError::Mapper(e)
    }
}

/// Main emulator structure
///
/// Coordinates all NES components and provides high-level functionality for
/// running games and managing configuration.
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    ppu: Ppu,
    apu: Apu,
    controller: ControllerPort,

    /// Currently loaded cartridge data and the mapper installed for it.
    cartridge: Option<Cartridge>,
    mapper: Option<Mapper>,

    config: EmulatorConfig,
    rom_path: Option<PathBuf>,
    paused: bool,
    speed_mode: SpeedMode,

    /// Frame timing for speed control; set on `resume()`.
    #[allow(dead_code)]
    last_frame_time: Option<Instant>,
}

impl Emulator {
    /// Create a new emulator instance
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// ```
    pub fn new() -> Self {
        Emulator {
            cpu: Cpu::new(),
            bus: Bus::new(),
            ppu: Ppu::new(),
            apu: Apu::new(),
            controller: ControllerPort::new(),
            cartridge: None,
            mapper: None,
            config: EmulatorConfig::load_or_default(),
            rom_path: None,
            paused: false,
            speed_mode: SpeedMode::Normal,
            last_frame_time: None,
        }
    }

    /// Load a ROM file
    ///
    /// Parses the iNES image, picks and installs the appropriate mapper,
    /// resets every collaborator to power-on state, and records the ROM in
    /// the recent-ROMs list.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.load_rom("game.nes").expect("Failed to load ROM");
    /// ```
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EmulatorError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        let mut mapper = create_mapper(&cartridge)?;

        self.bus.reset();
        mapper.load_initial(&cartridge, &mut self.bus);
        self.ppu.set_mirroring(mapper.mirroring(&cartridge));

        self.cartridge = Some(cartridge);
        self.mapper = Some(mapper);
        self.rom_path = Some(path.to_path_buf());

        let mut recent_roms = RecentRomsList::load_or_default();
        recent_roms.add(path);
        let _ = recent_roms.save();

        self.reset();
        Ok(())
    }

    /// Reset the emulator
    ///
    /// Resets every collaborator to power-on state and re-installs the
    /// loaded cartridge's starting banks, as if pressing the reset button.
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.reset();
    /// ```
    pub fn reset(&mut self) {
        if let (Some(mapper), Some(cartridge)) = (self.mapper.as_mut(), self.cartridge.as_ref()) {
            mapper.load_initial(cartridge, &mut self.bus);
            self.ppu.set_mirroring(mapper.mirroring(cartridge));
        }
        self.cpu.reset(&mut self.bus);
        self.ppu.reset();
        self.apu.reset();
        self.controller.reset();
        self.bus.clear_latches();
        self.paused = false;
    }

    /// Replace the controller-1 button snapshot the hardware-facing port
    /// reads from. A second controller port is out of scope.
    pub fn set_controller_state(&mut self, controller: Controller) {
        self.controller.set_controller(controller);
    }

    /// Run one CPU instruction (or DMA/interrupt service step) and bring the
    /// PPU, APU, controller port, and mapper forward in lockstep: one APU
    /// `tick`, one controller observation, one mapper `monitor`, one PPU
    /// observation tick, then `3N - 1` additional PPU ticks with no register
    /// observation, where `N` is the number of CPU cycles the step took. A
    /// write to `$4014` observed during the step arms the CPU's OAM-DMA,
    /// which then runs across the following `step()` calls.
    ///
    /// Returns the number of CPU cycles consumed and whether a PPU frame
    /// became ready (entered vblank) during the step.
    ///
    /// # Errors
    /// Propagates `CpuError::InvalidOpcode` if the instruction stream hits
    /// an undocumented opcode; this is session-fatal and the caller should
    /// unload the cartridge.
    pub fn step(&mut self) -> Result<(u8, bool), CpuError> {
        if self.ppu.take_nmi_request() {
            self.cpu.request_nmi();
        }
        if self.apu.take_irq_request() {
            self.cpu.request_irq();
        }

        let cycles = self.cpu.step(&mut self.bus)?;

        if self.bus.last_write_addr() == Some(0x4014) {
            self.cpu.request_dma(self.bus.last_write_data());
        }

        self.apu.tick(&mut self.bus, cycles as u32);
        self.controller.observe(&mut self.bus);
        if let (Some(mapper), Some(cartridge)) = (self.mapper.as_mut(), self.cartridge.as_ref()) {
            mapper.monitor(cartridge, &mut self.bus);
        }

        let mut frame_ready = self.ppu.tick(&mut self.bus, true);
        for _ in 0..(cycles as u32).saturating_mul(3).saturating_sub(1) {
            frame_ready |= self.ppu.tick(&mut self.bus, false);
        }

        self.bus.clear_latches();
        Ok((cycles, frame_ready))
    }

    /// Run CPU steps until a PPU frame completes.
    pub fn run_frame(&mut self) -> Result<(), CpuError> {
        loop {
            let (_, frame_ready) = self.step()?;
            if frame_ready {
                return Ok(());
            }
        }
    }

    /// Set speed mode
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::{Emulator, SpeedMode};
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.set_speed_mode(SpeedMode::FastForward2x);
    /// ```
    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.last_frame_time = Some(Instant::now());
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    /// The PPU's 256x240 palette-index frame buffer.
    pub fn frame(&self) -> &[u8] {
        self.ppu.frame()
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }

    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }

    pub fn is_rom_loaded(&self) -> bool {
        self.cartridge.is_some()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
