// Audio module - NES APU audio output and mixing
//
// This module provides:
// - Oscillator-based APU mixing driven by `Apu::audio_registers`
// - Cross-platform audio output using cpal
// - Audio buffering and playback statistics
//
// The APU computes each channel's waveform parameters (period, amplitude,
// duty, on/off) directly at the output sample rate, so there's no separate
// NES-clock-rate mixing stage to resample down from: one call to
// `AudioSystem::generate_sample` produces exactly one output-rate sample.
//
// # Usage
//
// ```no_run
// use nes_rs::audio::{AudioSystem, AudioConfig};
// use nes_rs::apu::Apu;
//
// let audio_config = AudioConfig::new().with_sample_rate(48000);
// let mut audio_system = AudioSystem::new(audio_config).unwrap();
//
// let apu = Apu::new();
// // ... run the APU forward via Emulator::step() ...
//
// // Once per output sample:
// audio_system.generate_sample(&apu);
// ```

pub mod mixer;
pub mod output;
pub mod resampler;

pub use mixer::Mixer;
pub use output::{AudioConfig, AudioOutput, AudioOutputBuilder};
pub use resampler::{sample_rates, AudioBuffer, Resampler};

use crate::apu::Apu;

/// Complete audio system for NES emulation
///
/// Combines the oscillator mixer and cpal output into a single interface.
pub struct AudioSystem {
    /// APU mixer
    mixer: Mixer,

    /// Audio output
    output: AudioOutput,

    /// Statistics
    samples_generated: u64,
}

impl AudioSystem {
    /// Create a new audio system
    ///
    /// # Arguments
    ///
    /// * `config` - Audio configuration
    ///
    /// # Returns
    ///
    /// Result containing the AudioSystem or an error message
    pub fn new(config: AudioConfig) -> Result<Self, String> {
        let output = AudioOutput::new(config)?;

        Ok(Self {
            mixer: Mixer::new(),
            output,
            samples_generated: 0,
        })
    }

    /// Create a new audio system with default configuration (48 kHz, mono)
    pub fn new_default() -> Result<Self, String> {
        Self::new(AudioConfig::new())
    }

    /// Generate one output sample from the APU's current state and push it
    /// to the output buffer. Call this once per output sample (e.g. from the
    /// cpal callback's cadence, or a timer matched to the output sample
    /// rate) rather than once per CPU or APU cycle.
    pub fn generate_sample(&mut self, apu: &Apu) {
        let registers = apu.audio_registers(self.output.config().sample_rate);
        let sample = self.mixer.mix(&registers);
        let _ = self.output.push_sample(sample);
        self.samples_generated += 1;
    }

    /// Set the master volume
    ///
    /// # Arguments
    ///
    /// * `volume` - Volume level (0.0 = mute, 1.0 = full volume)
    pub fn set_volume(&mut self, volume: f32) {
        self.mixer.set_volume(volume);
    }

    /// Get the current volume
    pub fn volume(&self) -> f32 {
        self.mixer.volume()
    }

    /// Get the number of samples in the output buffer
    pub fn buffer_len(&self) -> usize {
        self.output.buffer_len()
    }

    /// Get the output buffer capacity
    pub fn buffer_capacity(&self) -> usize {
        self.output.buffer_capacity()
    }

    /// Check if the buffer is nearly full
    pub fn is_buffer_nearly_full(&self) -> bool {
        self.output.is_buffer_nearly_full()
    }

    /// Clear the audio buffer
    pub fn clear_buffer(&self) {
        self.output.clear_buffer();
    }

    /// Get audio statistics
    pub fn stats(&self) -> AudioStats {
        AudioStats {
            samples_generated: self.samples_generated,
            buffer_len: self.output.buffer_len(),
            buffer_capacity: self.output.buffer_capacity(),
        }
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.samples_generated = 0;
    }

    /// Pause audio playback
    pub fn pause(&self) -> Result<(), String> {
        self.output.pause()
    }

    /// Resume audio playback
    pub fn resume(&self) -> Result<(), String> {
        self.output.resume()
    }
}

/// Audio statistics
#[derive(Debug, Clone, Copy)]
pub struct AudioStats {
    /// Total output samples generated
    pub samples_generated: u64,

    /// Current buffer length
    pub buffer_len: usize,

    /// Buffer capacity
    pub buffer_capacity: usize,
}

impl AudioStats {
    /// Get buffer fullness as a percentage (0.0 - 1.0)
    pub fn buffer_fullness(&self) -> f32 {
        if self.buffer_capacity == 0 {
            0.0
        } else {
            self.buffer_len as f32 / self.buffer_capacity as f32
        }
    }
}
