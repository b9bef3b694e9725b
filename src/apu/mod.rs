// APU module - Audio Processing Unit (Ricoh 2A03) implementation.
//
// Square/triangle channels only: the noise and DMC channels and the second
// controller port are explicitly out of scope. Like the PPU and the cartridge
// mapper, the APU never intercepts CPU reads/writes directly; it observes the
// Bus's last-write latch once per CPU step for addresses in `$4000-$4017`
// and updates its channel state accordingly.

pub mod channels;
pub mod components;
pub mod constants;

use crate::bus::Bus;
use channels::{PulseChannel, TriangleChannel};
use constants::CPU_CLOCK_HZ;
use components::{FrameCounter, FrameEvent};

/// Derived oscillator parameters for one channel, published for the audio
/// collaborator to read. A simplified, symmetric-square oscillator model
/// stands in for bit-exact analogue synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelAudio {
    /// Samples per waveform period at the published sample rate, or 0 if
    /// the channel has no well-defined frequency right now.
    pub period_samples: f32,
    pub amplitude_positive: f32,
    pub amplitude_negative: f32,
    pub duty: u8,
    pub silent: bool,
}

impl ChannelAudio {
    fn silent() -> Self {
        ChannelAudio {
            period_samples: 0.0,
            amplitude_positive: 0.0,
            amplitude_negative: 0.0,
            duty: 0,
            silent: true,
        }
    }
}

/// Shared audio-parameters record: one oscillator snapshot per channel plus
/// the sample rate they were derived against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioRegisters {
    pub square0: ChannelAudio,
    pub square1: ChannelAudio,
    pub triangle: ChannelAudio,
    pub sample_rate: u32,
}

/// Audio Processing Unit state.
pub struct Apu {
    square0: PulseChannel,
    square1: PulseChannel,
    triangle: TriangleChannel,
    frame: FrameCounter,
    irq_pending: bool,
    square_cycle_parity: bool,
}

impl Apu {
    pub fn new() -> Self {
        Apu {
            square0: PulseChannel::new(1),
            square1: PulseChannel::new(2),
            triangle: TriangleChannel::new(),
            frame: FrameCounter::new(),
            irq_pending: false,
            square_cycle_parity: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether the APU has a frame IRQ outstanding. Polled once per CPU step
    /// by the System clock, same protocol as `Ppu::take_nmi_request`.
    pub fn take_irq_request(&mut self) -> bool {
        let pending = self.irq_pending;
        self.irq_pending = false;
        pending
    }

    /// Advance the APU by `cpu_cycles` CPU cycles, observing any register
    /// write or `$4015` read that happened on the Bus since the last call.
    pub fn tick(&mut self, bus: &mut Bus, cpu_cycles: u32) {
        self.observe(bus);

        for _ in 0..cpu_cycles {
            self.square_cycle_parity = !self.square_cycle_parity;
            if self.square_cycle_parity {
                self.square0.clock_timer();
                self.square1.clock_timer();
            }
            self.triangle.clock_timer();

            for event in self.frame.clock() {
                self.apply_frame_event(event);
            }
        }
    }

    fn apply_frame_event(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::QuarterFrame => {
                self.square0.clock_envelope();
                self.square1.clock_envelope();
                self.triangle.clock_linear_counter();
            }
            FrameEvent::HalfFrame => {
                self.square0.clock_envelope();
                self.square1.clock_envelope();
                self.triangle.clock_linear_counter();
                self.square0.clock_length_counter();
                self.square0.clock_sweep();
                self.square1.clock_length_counter();
                self.square1.clock_sweep();
                self.triangle.clock_length_counter();
            }
            FrameEvent::SetIrq => {
                self.irq_pending = true;
            }
        }
    }

    fn observe(&mut self, bus: &mut Bus) {
        if let Some(addr) = bus.last_read_addr() {
            if addr == 0x4015 {
                self.frame.clear_irq();
            }
        }

        let Some(addr) = bus.last_write_addr() else {
            return;
        };
        if !(0x4000..=0x4017).contains(&addr) {
            return;
        }
        let data = bus.last_write_data();

        match addr {
            0x4000 => self.square0.write_register_0(data),
            0x4001 => self.square0.write_register_1(data),
            0x4002 => self.square0.write_register_2(data),
            0x4003 => self.square0.write_register_3(data),

            0x4004 => self.square1.write_register_0(data),
            0x4005 => self.square1.write_register_1(data),
            0x4006 => self.square1.write_register_2(data),
            0x4007 => self.square1.write_register_3(data),

            0x4008 => self.triangle.write_register_0(data),
            0x4009 => self.triangle.write_register_1(data),
            0x400A => self.triangle.write_register_2(data),
            0x400B => self.triangle.write_register_3(data),

            // $400C-$400F (noise) and $4010-$4013 (DMC) are not implemented.
            0x4015 => {
                self.square0.set_enabled(data & 0x01 != 0);
                self.square1.set_enabled(data & 0x02 != 0);
                self.triangle.set_enabled(data & 0x04 != 0);
            }
            0x4017 => {
                for event in self.frame.write_control(data) {
                    self.apply_frame_event(event);
                }
            }
            _ => {}
        }
    }

    /// Snapshot the current oscillator state for each channel at `sample_rate`.
    pub fn audio_registers(&self, sample_rate: u32) -> AudioRegisters {
        AudioRegisters {
            square0: self.square_audio(&self.square0, sample_rate),
            square1: self.square_audio(&self.square1, sample_rate),
            triangle: self.triangle_audio(sample_rate),
            sample_rate,
        }
    }

    fn square_audio(&self, channel: &PulseChannel, sample_rate: u32) -> ChannelAudio {
        let period = channel.timer.period;
        if !channel.is_active()
            || channel.sweep.is_muting(period)
            || !(8..=0x7FF).contains(&period)
        {
            return ChannelAudio::silent();
        }

        let frequency = CPU_CLOCK_HZ as f32 / (16.0 * (period as f32 + 1.0));
        let volume = channel.envelope.volume() as f32 / 15.0;
        ChannelAudio {
            period_samples: sample_rate as f32 / frequency,
            amplitude_positive: volume * 0.5,
            amplitude_negative: -volume * 0.5,
            duty: channel.duty,
            silent: false,
        }
    }

    fn triangle_audio(&self, sample_rate: u32) -> ChannelAudio {
        let period = self.triangle.timer.period;
        if !self.triangle.is_active() || !(2..=0x7FF).contains(&period) {
            return ChannelAudio::silent();
        }

        let frequency = CPU_CLOCK_HZ as f32 / (32.0 * (period as f32 + 1.0));
        ChannelAudio {
            period_samples: sample_rate as f32 / frequency,
            amplitude_positive: 0.5,
            amplitude_negative: -0.5,
            duty: 0,
            silent: false,
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}
