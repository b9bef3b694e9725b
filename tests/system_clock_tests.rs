// System clock integration tests.
//
// Black-box scenarios driven through `Emulator::step()` / raw `Cpu`+`Bus`,
// built from hand-assembled byte sequences rather than full commercial
// ROMs, covering the end-to-end behaviours the CPU/PPU/mapper/controller
// observers are each individually unit-tested against.

use nes_rs::cpu::Cpu;
use nes_rs::{Bus, Emulator};
use std::path::PathBuf;

/// Build a minimal one-bank NROM iNES image. `vectors` sets bytes at
/// `$FFFA-$FFFB` (NMI) and `$FFFC-$FFFD` (reset), both mirrored from the
/// single PRG bank at offset `$3FFA..$3FFE`.
fn nrom_image(nmi_vector: u16, reset_vector: u16, program: &[(u16, u8)]) -> Vec<u8> {
    let mut data = vec![0u8; 16];
    data[0..4].copy_from_slice(b"NES\x1A");
    data[4] = 1; // 1 PRG bank
    data[5] = 1; // 1 CHR bank
    let mut prg = vec![0u8; 16 * 1024];
    for &(addr, value) in program {
        prg[(addr - 0x8000) as usize] = value;
    }
    let [nmi_lo, nmi_hi] = nmi_vector.to_le_bytes();
    prg[0x3FFA] = nmi_lo;
    prg[0x3FFB] = nmi_hi;
    let [reset_lo, reset_hi] = reset_vector.to_le_bytes();
    prg[0x3FFC] = reset_lo;
    prg[0x3FFD] = reset_hi;
    data.extend(prg);
    data.extend(vec![0u8; 8192]);
    data
}

fn mmc1_image() -> Vec<u8> {
    let mut data = vec![0u8; 16];
    data[0..4].copy_from_slice(b"NES\x1A");
    data[4] = 2; // 2 PRG banks so bank-select is observable
    data[5] = 1;
    data[6] = 0x10; // mapper number low nibble = 1 (MMC1)
    data.extend(vec![0u8; 2 * 16 * 1024]);
    data.extend(vec![0u8; 8192]);
    data
}

fn write_temp(name: &str, data: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Scenario 1: minimal NROM reset. LDA #$42; STA $0200; BRK. After three
/// `step()` calls, mainMemory[$0200] == 0x42 and A == 0x42.
#[test]
fn minimal_nrom_reset_runs_lda_sta_brk() {
    let data = nrom_image(
        0x0000,
        0x8000,
        &[
            (0x8000, 0xA9), // LDA #$42
            (0x8001, 0x42),
            (0x8002, 0x8D), // STA $0200
            (0x8003, 0x00),
            (0x8004, 0x02),
            (0x8005, 0x00), // BRK
        ],
    );
    let path = write_temp("system_clock_minimal_nrom.nes", &data);

    let mut emulator = Emulator::new();
    emulator.load_rom(&path).unwrap();

    for _ in 0..3 {
        emulator.step().unwrap();
    }

    assert_eq!(emulator.bus().peek(0x0200), 0x42);
    assert_eq!(emulator.cpu().a, 0x42);

    std::fs::remove_file(&path).ok();
}

/// Scenario 2: branch page-cross timing. BNE +2 from $80FE with Z == false
/// consumes 4 cycles (2 base + 1 taken + 1 page-cross) and lands at $8102.
#[test]
fn branch_taken_across_page_boundary_costs_four_cycles() {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();

    bus.write(0x80FE, 0xD0); // BNE
    bus.write(0x80FF, 0x02); // +2

    cpu.pc = 0x80FE;
    cpu.set_flag(0b0000_0010, false); // Z clear: branch is taken

    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cycles, 4);
    assert_eq!(cpu.pc, 0x8102);
}

/// Scenario 3: OAM-DMA stall. Writing $02 to $4014 (via STA $4014) initiates
/// a DMA copying mainMemory[$0200..$02FF] into OAM[0..255]; after the next
/// 257 `step()` calls the OAM contents match the source and no further user
/// instruction has executed.
#[test]
fn oam_dma_copies_source_page_and_stalls_the_cpu() {
    let data = nrom_image(
        0x0000,
        0x8000,
        &[
            (0x8000, 0xA9), // LDA #$02
            (0x8001, 0x02),
            (0x8002, 0x8D), // STA $4014
            (0x8003, 0x14),
            (0x8004, 0x40),
            (0x8005, 0xEA), // NOP, must not run until DMA drains
        ],
    );
    let path = write_temp("system_clock_oam_dma.nes", &data);

    let mut emulator = Emulator::new();
    emulator.load_rom(&path).unwrap();

    for i in 0..256u16 {
        emulator.bus_mut().write_raw(0x0200 + i, i as u8);
    }

    emulator.step().unwrap(); // LDA #$02
    emulator.step().unwrap(); // STA $4014, arms the DMA
    assert_eq!(emulator.cpu().pc, 0x8005, "STA should have advanced PC once");

    for _ in 0..257 {
        emulator.step().unwrap();
    }

    assert_eq!(
        emulator.cpu().pc,
        0x8005,
        "no user instruction should have executed during the DMA"
    );
    for i in 0..256u16 {
        assert_eq!(emulator.bus().oam_read(i as u8), i as u8);
    }
}

/// Scenario 4: vblank NMI. With NMI-enable set, running `step()` until the
/// PPU reaches scanline 241 must cause the CPU to next handle an NMI: PC
/// jumps to the word at $FFFA/$FFFB, with B clear and I set in the pushed
/// flags.
#[test]
fn vblank_entry_triggers_nmi_service() {
    let data = nrom_image(0x9000, 0x8000, &[(0x8000, 0xEA)]); // NOP loop
    let path = write_temp("system_clock_vblank_nmi.nes", &data);

    let mut emulator = Emulator::new();
    emulator.load_rom(&path).unwrap();
    emulator.bus_mut().write(0x2000, 0x80); // enable NMI on vblank

    loop {
        let (_, frame_ready) = emulator.step().unwrap();
        if frame_ready {
            break;
        }
    }

    emulator.step().unwrap();

    assert_eq!(emulator.cpu().pc, 0x9000, "CPU should jump to the NMI vector");
    assert!(emulator.cpu().get_interrupt_disable());
}

/// Scenario 5: MMC1 shift protocol. Five writes of $01 to $8000 load
/// 0b11111 into the control register, which selects horizontal mirroring
/// (bits 0-1 == 0b11). A subsequent write of $80 resets the shift register
/// and OR's the control register with $0C (bits 2-3); since those bits
/// were already set, the OR is a no-op and mirroring stays Horizontal.
#[test]
fn mmc1_shift_register_loads_control_then_resets() {
    use nes_rs::{create_mapper, Cartridge, Mirroring};

    let data = mmc1_image();
    let cartridge = Cartridge::from_ines_bytes(&data).unwrap();
    let mut mapper = create_mapper(&cartridge).unwrap();
    let mut bus = Bus::new();
    mapper.load_initial(&cartridge, &mut bus);

    assert_eq!(mapper.mirroring(&cartridge), Mirroring::Horizontal); // power-on default control = 0x0C

    for _ in 0..5 {
        bus.write(0x8000, 0x01);
        mapper.monitor(&cartridge, &mut bus);
        bus.clear_latches();
    }
    assert_eq!(mapper.mirroring(&cartridge), Mirroring::Horizontal);

    bus.write(0x8000, 0x80); // reset bit
    mapper.monitor(&cartridge, &mut bus);
    assert_eq!(mapper.mirroring(&cartridge), Mirroring::Horizontal);
}

/// Scenario 6: controller strobe. Writing 1 then 0 to $4016 latches button
/// states; reading $4016 eight times returns A, B, Select, Start, Up, Down,
/// Left, Right in order.
#[test]
fn controller_strobe_shifts_out_buttons_in_order() {
    use nes_rs::{Controller, ControllerPort};

    let mut port = ControllerPort::new();
    let mut controller = Controller::new();
    controller.a = true;
    controller.start = true;
    controller.right = true;
    port.set_controller(controller);

    let mut bus = Bus::new();
    bus.write(0x4016, 0x01);
    port.observe(&mut bus);
    bus.clear_latches();
    bus.write(0x4016, 0x00);
    port.observe(&mut bus);
    bus.clear_latches();

    let expected = [true, false, false, true, false, false, false, true];
    for &want in expected.iter() {
        bus.read(0x4016);
        port.observe(&mut bus);
        bus.clear_latches();
        assert_eq!(bus.peek(0x4016) & 0x01, want as u8);
    }
}
