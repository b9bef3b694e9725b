// PPU Benchmarks
// Performance benchmarks for PPU rendering operations

use criterion::{criterion_group, criterion_main, Criterion};
use nes_rs::cartridge::mappers::create_mapper;
use nes_rs::{Bus, Cartridge, Ppu};
use std::hint::black_box;

/// Build a minimal NROM iNES image with a CHR-ROM test pattern, and install
/// it on a fresh Bus the same way `Emulator::load_rom` does.
fn setup_ppu() -> (Ppu, Bus) {
    let mut data = vec![0u8; 16];
    data[0..4].copy_from_slice(b"NES\x1A");
    data[4] = 1; // 1 PRG bank
    data[5] = 1; // 1 CHR bank
    data.extend(vec![0u8; 16 * 1024]);
    data.extend(vec![0xAA; 8 * 1024]); // CHR-ROM test pattern

    let cartridge = Cartridge::from_ines_bytes(&data).unwrap();
    let mut mapper = create_mapper(&cartridge).unwrap();

    let mut bus = Bus::new();
    mapper.load_initial(&cartridge, &mut bus);

    let mut ppu = Ppu::new();
    ppu.set_mirroring(mapper.mirroring(&cartridge));
    (ppu, bus)
}

/// Benchmark a full frame of PPU ticks (the hot path during emulation).
/// One frame = 262 scanlines * 341 PPU cycles = 89,342 ticks.
fn bench_ppu_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_rendering");
    group.sample_size(20);

    group.bench_function("full_frame_via_tick", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        bus.write(0x2001, 0b0001_1110); // PPUMASK: show background and sprites

        b.iter(|| {
            for _ in 0..89_342 {
                ppu.tick(black_box(&mut bus), false);
            }
            black_box(ppu.frame());
        });
    });

    group.finish();
}

/// Benchmark PPU tick execution at different granularities.
fn bench_ppu_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_tick");

    group.bench_function("single_tick", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        b.iter(|| {
            black_box(ppu.tick(&mut bus, false));
        });
    });

    group.bench_function("single_tick_with_observation", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        b.iter(|| {
            black_box(ppu.tick(&mut bus, true));
        });
    });

    group.bench_function("scanline_341_cycles", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        b.iter(|| {
            for _ in 0..341 {
                ppu.tick(&mut bus, false);
            }
        });
    });

    group.finish();
}

/// Benchmark PPU register access patterns via Bus writes/reads (the same
/// path the CPU drives through during normal emulation).
fn bench_ppu_registers(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_registers");

    group.bench_function("ppuctrl_write", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        b.iter(|| {
            bus.write(black_box(0x2000), black_box(0b1001_0000));
            ppu.tick(&mut bus, true);
        });
    });

    group.bench_function("ppudata_write_sequence", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        b.iter(|| {
            bus.write(0x2006, 0x20); // High byte
            ppu.tick(&mut bus, true);
            bus.write(0x2006, 0x00); // Low byte
            ppu.tick(&mut bus, true);

            for i in 0..32u8 {
                bus.write(0x2007, i);
                ppu.tick(&mut bus, true);
            }
        });
    });

    group.finish();
}

/// Benchmark OAM (Object Attribute Memory) access patterns via OAMADDR/OAMDATA.
fn bench_ppu_oam(c: &mut Criterion) {
    let mut group = c.benchmark_group("ppu_oam");

    group.bench_function("oam_write", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        b.iter(|| {
            bus.write(0x2003, 0); // Set OAM address to 0
            ppu.tick(&mut bus, true);
            for i in 0..=255u8 {
                bus.write(0x2004, i);
                ppu.tick(&mut bus, true);
            }
        });
    });

    group.bench_function("oam_read", |b| {
        let (mut ppu, mut bus) = setup_ppu();
        b.iter(|| {
            ppu.tick(&mut bus, true);
            black_box(bus.peek(0x2004));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ppu_rendering,
    bench_ppu_tick,
    bench_ppu_registers,
    bench_ppu_oam
);
criterion_main!(benches);
