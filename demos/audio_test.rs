// Audio system test example
//
// Demonstrates driving the audio system from the APU: write directly to
// the APU's registers through a Bus, tick the APU forward, then pull one
// output sample per output-rate tick. Run with:
//
//   cargo run --example audio_test --features audio

use nes_rs::apu::Apu;
use nes_rs::audio::{AudioConfig, AudioSystem};
use nes_rs::Bus;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("NES Audio System Test");
    println!("====================\n");

    let audio_config = AudioConfig::new()
        .with_sample_rate(48000)
        .with_buffer_size(4096);

    println!("Initializing audio system...");
    let mut audio_system = AudioSystem::new(audio_config)?;
    println!("Audio system initialized!\n");

    let mut apu = Apu::new();
    let mut bus = Bus::new();

    // Enable pulse channel 1 only.
    bus.write(0x4015, 0x01);
    apu.tick(&mut bus, 0);
    bus.clear_latches();

    // Duty 50%, constant volume, volume 15.
    bus.write(0x4000, 0b1011_1111);
    apu.tick(&mut bus, 0);
    bus.clear_latches();

    // Timer for a 440 Hz tone (A4): (1789773 / (16 * 440)) - 1 = 253.
    let timer: u16 = 253;
    bus.write(0x4002, (timer & 0xFF) as u8);
    apu.tick(&mut bus, 0);
    bus.clear_latches();
    bus.write(0x4003, ((timer >> 8) & 0x07) as u8);
    apu.tick(&mut bus, 0);
    bus.clear_latches();

    println!("Playing 440 Hz tone (A4 note) for 3 seconds...");
    println!("You should hear a pure tone from your speakers/headphones.\n");

    let sample_rate = 48_000u64;
    let cpu_clock_hz = 1_789_773.0;
    let cycles_per_sample = (cpu_clock_hz / sample_rate as f64).round() as u32;
    let total_samples = sample_rate * 3;

    for sample in 0..total_samples {
        apu.tick(&mut bus, cycles_per_sample);
        bus.clear_latches();
        audio_system.generate_sample(&apu);

        if sample % sample_rate == 0 {
            let second = sample / sample_rate;
            let stats = audio_system.stats();
            println!(
                "Second {}: Buffer {}% full, {} samples generated",
                second,
                (stats.buffer_fullness() * 100.0) as u32,
                stats.samples_generated
            );
        }

        if audio_system.is_buffer_nearly_full() {
            thread::sleep(Duration::from_micros(10));
        }
    }

    println!("\nAudio test completed!");
    println!("\nFinal statistics:");
    let stats = audio_system.stats();
    println!("  Samples generated: {}", stats.samples_generated);
    println!(
        "  Buffer utilization: {:.1}%",
        stats.buffer_fullness() * 100.0
    );

    println!("\nWaiting for audio buffer to drain...");
    while audio_system.buffer_len() > 0 {
        thread::sleep(Duration::from_millis(10));
    }

    println!("Done!");
    Ok(())
}
