// NES Emulator - Main Entry Point
//
// Pass a ROM path to load and run it in a window; with no argument, run
// the demo display window with the test pattern instead.

use nes_rs::display::{run_display, run_emulator, WindowConfig};
use nes_rs::input::InputConfig;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "cli-logging")]
    env_logger::try_init().ok();

    println!("NES Emulator (nes-rs) v0.1.0");
    println!("==============================");
    println!();

    // Load or create input configuration
    let config_path = "input_config.toml";
    let _input_config = InputConfig::load_or_default(config_path);
    println!("Input configuration loaded from '{}'", config_path);
    println!();

    // Create window configuration
    // Default: 3x scale, 60 FPS, VSync enabled
    let config = WindowConfig::new()
        .with_scale(3) // 768x720 window (256x240 * 3)
        .with_fps(60) // 60 FPS (NTSC)
        .with_vsync(true); // Enable VSync for smooth display

    let rom_path = std::env::args().nth(1).map(PathBuf::from);

    println!("Press the close button or Ctrl+C to exit.");
    println!();

    match rom_path {
        Some(rom_path) => {
            println!("Loading ROM: {}", rom_path.display());
            run_emulator(config, rom_path)?;
        }
        None => {
            println!("No ROM path given, running display test pattern.");
            run_display(config)?;
        }
    }

    println!("Display window closed.");
    Ok(())
}
