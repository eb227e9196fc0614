//! YM2151 (OPM) chip emulation
//!
//! The chip owns the 256-byte register file, eight FM channels, the LFO, and
//! the (inert) timers, and exposes the block sample loop drivers pull from.
//!
//! # Register map
//!
//! | Address | Meaning |
//! |---------|---------|
//! | 0x01 | LFO frequency index (low 4 bits) |
//! | 0x08 | Key control: bit 7 key-on, bits 0-2 channel |
//! | 0x0F | Noise enable/frequency (stored, inert) |
//! | 0x10-0x17 | Channel frequency word, low byte |
//! | 0x18-0x1F | Channel frequency word, high byte |
//! | 0x20-0x27 | Channel algorithm (bits 0-2) / feedback (bits 3-5) |
//! | 0x40-0x5F | Operator DT1 (bits 4-6) / MUL (bits 0-3) |
//! | 0x60-0x7F | Operator total level (bits 0-6) |
//! | 0x80-0x9F | Operator KS (bits 6-7) / AR (bits 0-4) |
//! | 0xA0-0xBF | Operator AM enable (bit 7) / DR (bits 0-4) |
//! | 0xC0-0xDF | Operator DT2 (bits 6-7) / SR (bits 0-4) |
//! | 0xE0-0xFF | Operator SL (bits 4-7) / RR (bits 0-3) |
//!
//! Writing either half of a frequency pair immediately re-publishes the
//! combined 14-bit word to the channel. Undecoded addresses are stored for
//! read-back and have no effect.
//!
//! # Example
//!
//! ```
//! use ym2151::Ym2151;
//! use ym2151::Ym2151Backend;
//!
//! let mut chip = Ym2151::new();
//! chip.write_register(0x20, 0x07); // Channel 0: algorithm 7
//! chip.write_register(0x10, 0xB8); // Frequency low byte (440 Hz)
//! chip.write_register(0x18, 0x01); // Frequency high byte
//! chip.write_register(0x60, 0x00); // Operator 0 wide open
//! chip.write_register(0x08, 0x80); // Key on channel 0
//!
//! let mut buffer = [0.0f32; 512];
//! chip.generate(&mut buffer);
//! ```

use crate::backend::Ym2151Backend;
use crate::channel::Channel;
use crate::lfo::{Lfo, LfoWaveform};
use crate::registers::{self, RegisterFile};

/// Number of FM channels
pub const CHANNEL_COUNT: usize = 8;

/// Default chip clock in Hz (NTSC arcade boards)
pub const DEFAULT_CLOCK: u32 = 3_579_545;

/// Default host sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Timer A/B state
///
/// The registers that would program these have no address in this map, so the
/// fields only ever change on reset. They are kept so the read-side surface
/// (overflow flags) exists for drivers that poll it.
#[derive(Debug, Clone, Copy, Default)]
#[allow(dead_code)]
struct Timers {
    timer_a_value: u16,
    timer_b_value: u8,
    timer_a_enabled: bool,
    timer_b_enabled: bool,
    timer_a_overflow: bool,
    timer_b_overflow: bool,
}

impl Timers {
    /// Advance one sample; counting is not implemented, so overflow flags
    /// never set themselves
    #[inline]
    fn advance(&mut self) {}

    #[inline]
    fn overflow_flags(&self) -> (bool, bool) {
        (self.timer_a_overflow, self.timer_b_overflow)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// YM2151 (OPM) FM synthesis chip
///
/// Eight channels of four operators each; programmed through 8-bit register
/// writes, rendered in blocks of `f32` samples. A chip instance is not
/// thread-safe: serialize register writes and generation externally.
#[derive(Debug, Clone)]
pub struct Ym2151 {
    registers: RegisterFile,
    channels: [Channel; CHANNEL_COUNT],
    clock: u32,
    sample_rate: u32,
    lfo: Lfo,
    timers: Timers,
    output_scale: f32,
}

impl Ym2151 {
    /// Create a chip with the default clock (3.579545 MHz)
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_CLOCK)
    }

    /// Create a chip with a custom clock frequency
    ///
    /// The clock is stored for rate scaling by future pitch decoders; the
    /// linear frequency-word model renders identically at any clock.
    pub fn with_clock(clock_hz: u32) -> Self {
        let mut chip = Self {
            registers: RegisterFile::new(),
            channels: Default::default(),
            clock: clock_hz,
            sample_rate: DEFAULT_SAMPLE_RATE,
            lfo: Lfo::new(),
            timers: Timers::default(),
            output_scale: 1.0,
        };
        chip.reset();
        chip
    }

    /// Reset the chip to power-on state
    ///
    /// Clears every register to 0, resets all channels and the LFO, and
    /// clears timer state. Sample rate and output scale are preserved.
    pub fn reset(&mut self) {
        self.registers.reset();
        for channel in &mut self.channels {
            channel.reset();
        }
        self.lfo.reset();
        self.timers.reset();
    }

    /// Chip clock frequency in Hz
    #[inline]
    pub fn clock(&self) -> u32 {
        self.clock
    }

    /// Host sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Set the host sample rate in Hz (propagates to every channel)
    pub fn set_sample_rate(&mut self, rate: u32) {
        self.sample_rate = rate.max(1);
        for channel in &mut self.channels {
            channel.set_sample_rate(self.sample_rate);
        }
    }

    /// Set the global output scale applied to the mixed sample (default 1.0)
    pub fn set_output_scale(&mut self, scale: f32) {
        self.output_scale = scale;
    }

    /// Current output scale
    #[inline]
    pub fn output_scale(&self) -> f32 {
        self.output_scale
    }

    /// Write a byte to a register address
    ///
    /// The raw byte is stored first so every address round-trips on read,
    /// then the decoded portion (if any) is routed into channel, operator,
    /// or LFO state. Takes effect from the next generated sample.
    pub fn set_register(&mut self, addr: u8, value: u8) {
        self.registers.write(addr, value);

        match addr {
            registers::LFO_FREQUENCY => self.lfo.set_frequency(value & 0x0F),
            registers::KEY_CONTROL => {
                // Bits 3-5 carry a per-slot mask on real hardware; any key
                // event here gates all four operators of the channel.
                let channel = (value & 0x07) as usize;
                if value & 0x80 != 0 {
                    self.channels[channel].key_on();
                } else {
                    self.channels[channel].key_off();
                }
            }
            0x10..=0x17 | 0x18..=0x1F => {
                let channel = registers::channel_of(addr);
                let word = self.frequency_word(channel);
                self.channels[channel].set_frequency(word);
            }
            0x20..=0x27 => {
                let channel = registers::channel_of(addr);
                self.channels[channel].set_algorithm(value & 0x07);
                self.channels[channel].set_feedback((value >> 3) & 0x07);
            }
            0x40..=0xFF => self.set_operator_register(addr, value),
            // 0x0F (noise) and everything else: stored only.
            _ => {}
        }
    }

    /// Decode a write into one of the six per-operator parameter banks
    fn set_operator_register(&mut self, addr: u8, value: u8) {
        let channel = registers::channel_of(addr);
        let slot = registers::operator_of(addr);
        let op = self.channels[channel].operator_mut(slot);
        let mut params = *op.parameters();

        match addr & 0xE0 {
            0x40 => {
                params.detune1 = (value >> 4) & 0x07;
                params.multiplier = value & 0x0F;
            }
            0x60 => {
                params.total_level = value & 0x7F;
            }
            0x80 => {
                params.key_scale = (value >> 6) & 0x03;
                params.attack_rate = value & 0x1F;
            }
            0xA0 => {
                params.am_sensitivity = (value >> 7) & 0x01;
                params.decay_rate = value & 0x1F;
            }
            0xC0 => {
                params.detune2 = (value >> 6) & 0x03;
                params.sustain_rate = value & 0x1F;
            }
            0xE0 => {
                params.sustain_level = (value >> 4) & 0x0F;
                params.release_rate = value & 0x0F;
            }
            _ => unreachable!("operator bank dispatch covers 0x40-0xFF"),
        }

        op.set_parameters(params);
    }

    /// Read back the last byte written to an address
    #[inline]
    pub fn get_register(&self, addr: u8) -> u8 {
        self.registers.read(addr)
    }

    /// Combined 14-bit frequency word of a channel from its register pair
    #[inline]
    fn frequency_word(&self, channel: usize) -> u16 {
        let low = self.registers.read(registers::FREQ_LOW_BASE + channel as u8) as u16;
        let high = self.registers.read(registers::FREQ_HIGH_BASE + channel as u8) as u16;
        (high << 8) | low
    }

    /// Borrow a channel (index masked to 0-7)
    #[inline]
    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index & 0x07]
    }

    /// Mutably borrow a channel (index masked to 0-7)
    ///
    /// This is the direct driver path to channel and operator state, next to
    /// the register interface.
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut Channel {
        &mut self.channels[index & 0x07]
    }

    /// Select the LFO waveform
    pub fn set_lfo_waveform(&mut self, waveform: LfoWaveform) {
        self.lfo.set_waveform(waveform);
    }

    /// Set LFO amplitude / pitch modulation depths
    pub fn set_lfo_depths(&mut self, am_depth: f32, pm_depth: f32) {
        self.lfo.set_depths(am_depth, pm_depth);
    }

    /// Current LFO waveform value, computed on demand
    pub fn lfo_value(&self) -> f32 {
        self.lfo.value()
    }

    /// Timer A / timer B overflow flags (never set; timers are inert)
    pub fn timer_overflow_flags(&self) -> (bool, bool) {
        self.timers.overflow_flags()
    }

    /// Fill the buffer with the next samples of the mixed chip output
    ///
    /// Per sample: advance the timers and the LFO, pull one sample from each
    /// of the eight channels, sum, scale, store. An empty buffer is a no-op.
    /// Allocation-free.
    pub fn generate(&mut self, buffer: &mut [f32]) {
        let sample_rate = self.sample_rate as f32;
        for slot in buffer.iter_mut() {
            self.timers.advance();
            self.lfo.advance(sample_rate);

            let mut mix = 0.0;
            for channel in &mut self.channels {
                mix += channel.produce_sample();
            }
            *slot = mix * self.output_scale;
        }
    }
}

impl Default for Ym2151 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ym2151Backend for Ym2151 {
    fn new() -> Self {
        Ym2151::new()
    }

    fn with_clock(clock_hz: u32) -> Self {
        Ym2151::with_clock(clock_hz)
    }

    fn reset(&mut self) {
        Ym2151::reset(self)
    }

    fn write_register(&mut self, addr: u8, value: u8) {
        self.set_register(addr, value)
    }

    fn read_register(&self, addr: u8) -> u8 {
        self.get_register(addr)
    }

    fn set_sample_rate(&mut self, rate: u32) {
        Ym2151::set_sample_rate(self, rate)
    }

    fn generate(&mut self, buffer: &mut [f32]) {
        Ym2151::generate(self, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chip_defaults() {
        let chip = Ym2151::new();
        assert_eq!(chip.clock(), DEFAULT_CLOCK);
        assert_eq!(chip.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert_eq!(chip.output_scale(), 1.0);
    }

    #[test]
    fn test_register_round_trip() {
        let mut chip = Ym2151::new();
        chip.set_register(0x20, 0xFF);
        assert_eq!(chip.get_register(0x20), 0xFF, "raw byte must round-trip");
        // Decoded fields are masked even though the stored byte is not.
        assert_eq!(chip.channel(0).algorithm(), 7);
        assert_eq!(chip.channel(0).feedback(), 7);
    }

    #[test]
    fn test_undefined_register_is_stored_and_inert() {
        let mut chip = Ym2151::new();
        chip.set_register(0x0F, 0xAB);
        chip.set_register(0x3C, 0xCD);
        assert_eq!(chip.get_register(0x0F), 0xAB);
        assert_eq!(chip.get_register(0x3C), 0xCD);

        let mut buffer = [0.0f32; 256];
        chip.generate(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_frequency_pair_republishes_on_either_half() {
        let mut chip = Ym2151::new();
        chip.set_register(0x13, 0xB8);
        assert_eq!(chip.channel(3).frequency(), 0x00B8);
        chip.set_register(0x1B, 0x01);
        assert_eq!(chip.channel(3).frequency(), 0x01B8);
        chip.set_register(0x13, 0x00);
        assert_eq!(chip.channel(3).frequency(), 0x0100);
    }

    #[test]
    fn test_key_control_routes_to_channel() {
        let mut chip = Ym2151::new();
        chip.set_register(0x08, 0x80 | 0x05);
        assert!(chip.channel(5).is_key_on());
        assert!(!chip.channel(0).is_key_on());

        chip.set_register(0x08, 0x05);
        assert!(!chip.channel(5).is_key_on());
    }

    #[test]
    fn test_key_control_slot_mask_ignored() {
        let mut chip = Ym2151::new();
        // Slot mask bits set: still keys the whole channel.
        chip.set_register(0x08, 0x80 | 0x38 | 0x02);
        assert!(chip.channel(2).is_key_on());
        for op in 0..4 {
            assert!(!chip.channel(2).operator(op).is_idle());
        }
    }

    #[test]
    fn test_operator_register_decode() {
        let mut chip = Ym2151::new();

        // Channel 2, operator 1: DT1=3, MUL=5
        chip.set_register(0x40 + 8 + 2, (3 << 4) | 5);
        let params = *chip.channel(2).operator(1).parameters();
        assert_eq!(params.detune1, 3);
        assert_eq!(params.multiplier, 5);

        // Channel 0, operator 3: TL=0x46
        chip.set_register(0x60 + 8 * 3, 0xC6);
        assert_eq!(chip.channel(0).operator(3).parameters().total_level, 0x46);

        // Channel 7, operator 0: KS=2, AR=17
        chip.set_register(0x80 + 7, (2 << 6) | 17);
        let params = *chip.channel(7).operator(0).parameters();
        assert_eq!(params.key_scale, 2);
        assert_eq!(params.attack_rate, 17);

        // Channel 1, operator 2: AM on, DR=9
        chip.set_register(0xA0 + 8 * 2 + 1, 0x80 | 9);
        let params = *chip.channel(1).operator(2).parameters();
        assert_eq!(params.am_sensitivity, 1);
        assert_eq!(params.decay_rate, 9);

        // Channel 4, operator 1: DT2=2, SR=20
        chip.set_register(0xC0 + 8 + 4, (2 << 6) | 20);
        let params = *chip.channel(4).operator(1).parameters();
        assert_eq!(params.detune2, 2);
        assert_eq!(params.sustain_rate, 20);

        // Channel 6, operator 3: SL=10, RR=12
        chip.set_register(0xE0 + 8 * 3 + 6, (10 << 4) | 12);
        let params = *chip.channel(6).operator(3).parameters();
        assert_eq!(params.sustain_level, 10);
        assert_eq!(params.release_rate, 12);
    }

    #[test]
    fn test_reset_clears_registers_and_output() {
        let mut chip = Ym2151::new();
        chip.set_register(0x20, 0x3F);
        chip.set_register(0x10, 0xB8);
        chip.set_register(0x18, 0x01);
        chip.set_register(0x60, 0x00);
        chip.set_register(0x08, 0x80);
        let mut buffer = [0.0f32; 64];
        chip.generate(&mut buffer);

        chip.reset();
        for addr in 0..=255u8 {
            assert_eq!(chip.get_register(addr), 0, "register {addr:#04x} not cleared");
        }
        let mut buffer = [0.0f32; 1000];
        chip.generate(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0), "reset chip must be silent");
    }

    #[test]
    fn test_channel_index_masked() {
        let mut chip = Ym2151::new();
        chip.channel_mut(9).set_frequency(123);
        assert_eq!(chip.channel(1).frequency(), 123);
    }

    #[test]
    fn test_generate_empty_buffer_is_noop() {
        let mut chip = Ym2151::new();
        chip.generate(&mut []);
    }

    #[test]
    fn test_set_sample_rate_propagates() {
        let mut chip = Ym2151::new();
        chip.set_sample_rate(48_000);
        assert_eq!(chip.sample_rate(), 48_000);

        // A tone still renders at the new rate, proving the channels
        // picked it up.
        chip.set_register(0x20, 0x07);
        chip.set_register(0x10, 0xB8);
        chip.set_register(0x18, 0x01);
        chip.set_register(0x60, 0x00);
        chip.set_register(0x08, 0x80);
        let mut buffer = [0.0f32; 4800];
        chip.generate(&mut buffer);
        assert!(buffer.iter().any(|&s| s.abs() > 0.1));
    }

    #[test]
    fn test_output_scale_applies() {
        let mut chip = Ym2151::new();
        chip.set_register(0x20, 0x07);
        chip.set_register(0x10, 0xB8);
        chip.set_register(0x18, 0x01);
        chip.set_register(0x60, 0x00);
        chip.set_register(0x08, 0x80);

        let mut reference = [0.0f32; 512];
        chip.generate(&mut reference);

        let mut chip = Ym2151::new();
        chip.set_output_scale(0.5);
        chip.set_register(0x20, 0x07);
        chip.set_register(0x10, 0xB8);
        chip.set_register(0x18, 0x01);
        chip.set_register(0x60, 0x00);
        chip.set_register(0x08, 0x80);

        let mut scaled = [0.0f32; 512];
        chip.generate(&mut scaled);

        for (r, s) in reference.iter().zip(scaled.iter()) {
            assert!((r * 0.5 - s).abs() < 1e-6);
        }
    }

    #[test]
    fn test_lfo_register_and_surface() {
        let mut chip = Ym2151::new();
        chip.set_register(0x01, 0xFF);
        assert_eq!(chip.get_register(0x01), 0xFF);

        chip.set_lfo_waveform(LfoWaveform::Square);
        assert_eq!(chip.lfo_value(), 1.0, "square LFO at phase 0 reads 1");

        chip.set_lfo_depths(0.5, 0.25);
        let mut buffer = [0.0f32; 64];
        chip.generate(&mut buffer);
        // LFO advanced; square stays 1 until mid-cycle.
        assert_eq!(chip.lfo_value(), 1.0);
    }

    #[test]
    fn test_timers_stay_inert() {
        let mut chip = Ym2151::new();
        let mut buffer = [0.0f32; 4096];
        chip.generate(&mut buffer);
        assert_eq!(chip.timer_overflow_flags(), (false, false));
    }
}
