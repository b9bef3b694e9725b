// Audio mixer - synthesizes samples from the APU's published oscillator
// parameters.
//
// The APU doesn't publish per-sample waveform data; it publishes, per
// channel, a period (in output samples) and an on/off amplitude pair
// (`ChannelAudio`). The mixer is the thing that turns that into an actual
// waveform: a phase accumulator per channel, advanced by one sample per
// `mix()` call, that emits the negative amplitude for the first part of the
// period and the positive amplitude for the rest. For square channels the
// split point is set by the duty cycle; for triangle it's always the
// midpoint. A channel reporting `silent` contributes nothing to the mix.

use crate::apu::{AudioRegisters, ChannelAudio};

/// Synthesizes and mixes square0/square1/triangle into a single sample.
pub struct Mixer {
    /// Volume control (0.0 = mute, 1.0 = full volume)
    volume: f32,
    square0_phase: f32,
    square1_phase: f32,
    triangle_phase: f32,
}

impl Mixer {
    /// Create a new mixer with full volume
    pub fn new() -> Self {
        Mixer {
            volume: 1.0,
            square0_phase: 0.0,
            square1_phase: 0.0,
            triangle_phase: 0.0,
        }
    }

    /// Create a new mixer with specified volume
    pub fn with_volume(volume: f32) -> Self {
        let mut mixer = Self::new();
        mixer.volume = volume.clamp(0.0, 1.0);
        mixer
    }

    /// Set the master volume
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Get the current volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Advance every channel's oscillator by one sample and mix the result.
    ///
    /// Active (non-silent) channels are averaged together so the output
    /// stays in roughly [-1.0, 1.0] regardless of how many channels are
    /// sounding at once, then scaled by the master volume.
    pub fn mix(&mut self, registers: &AudioRegisters) -> f32 {
        let square0 = Self::advance_square(&mut self.square0_phase, &registers.square0);
        let square1 = Self::advance_square(&mut self.square1_phase, &registers.square1);
        let triangle = Self::advance_triangle(&mut self.triangle_phase, &registers.triangle);

        let active: Vec<f32> = [square0, square1, triangle].into_iter().flatten().collect();
        if active.is_empty() {
            return 0.0;
        }

        let mixed = active.iter().sum::<f32>() / active.len() as f32;
        (mixed * self.volume).clamp(-1.0, 1.0)
    }

    /// One sample of a square oscillator: negative amplitude for the part
    /// of the period selected by `duty`, positive for the rest.
    fn advance_square(phase: &mut f32, channel: &ChannelAudio) -> Option<f32> {
        if channel.silent || channel.period_samples <= 0.0 {
            *phase = 0.0;
            return None;
        }

        let threshold = match channel.duty {
            0 => channel.period_samples / 8.0,
            1 => channel.period_samples / 4.0,
            _ => channel.period_samples / 2.0,
        };
        let sample = if *phase < threshold {
            channel.amplitude_negative
        } else {
            channel.amplitude_positive
        };

        *phase = (*phase + 1.0) % channel.period_samples;
        Some(sample)
    }

    /// One sample of a triangle oscillator: negative amplitude for the
    /// first half of the period, positive for the second.
    fn advance_triangle(phase: &mut f32, channel: &ChannelAudio) -> Option<f32> {
        if channel.silent || channel.period_samples <= 0.0 {
            *phase = 0.0;
            return None;
        }

        let half = channel.period_samples / 2.0;
        let sample = if *phase < half {
            channel.amplitude_negative
        } else {
            channel.amplitude_positive
        };

        *phase = (*phase + 1.0) % channel.period_samples;
        Some(sample)
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
