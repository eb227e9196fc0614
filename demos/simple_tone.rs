//! Simple FM tone rendered to a WAV file
//!
//! Programs channel 0 with a two-stack patch (algorithm 4: op0 modulates
//! op1, op2 modulates op3), keys it for one second, and writes three seconds
//! of audio including the release tail to `ym2151_tone.wav`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example simple_tone
//! ```

use ym2151::export::{write_samples_to_wav, ExportConfig};
use ym2151::{Ym2151, Ym2151Backend};

const SAMPLE_RATE: u32 = 44_100;
const CHANNEL: u8 = 0;

fn main() -> ym2151::Result<()> {
    let mut chip = Ym2151::new();
    chip.set_sample_rate(SAMPLE_RATE);

    // Algorithm 4, no feedback: two modulator->carrier stacks.
    chip.set_register(0x20 + CHANNEL, 4);

    // Modulators (op0, op2): partially attenuated, fast attack, no decay.
    for op in [0u8, 2] {
        chip.set_register(0x60 + op * 8 + CHANNEL, 0x50); // TL
        chip.set_register(0x80 + op * 8 + CHANNEL, 0x1F); // AR = 31
        chip.set_register(0xA0 + op * 8 + CHANNEL, 0x00); // DR = 0
        chip.set_register(0xC0 + op * 8 + CHANNEL, 0x00); // SR = 0
        chip.set_register(0xE0 + op * 8 + CHANNEL, 0x0F); // RR = 15
    }

    // Carriers (op1, op3): full level, gentle decay, mid release.
    for op in [1u8, 3] {
        chip.set_register(0x60 + op * 8 + CHANNEL, 0x00); // TL = 0 (loudest)
        chip.set_register(0x80 + op * 8 + CHANNEL, 0x1F); // AR = 31
        chip.set_register(0xA0 + op * 8 + CHANNEL, 0x05); // DR = 5
        chip.set_register(0xC0 + op * 8 + CHANNEL, 0x05); // SR = 5
        chip.set_register(0xE0 + op * 8 + CHANNEL, 0x0F); // RR = 15
    }

    // A4 = 440 Hz; the frequency word is a plain Hz value split across the
    // low/high register pair.
    let freq_word: u16 = 440;
    chip.set_register(0x10 + CHANNEL, (freq_word & 0xFF) as u8);
    chip.set_register(0x18 + CHANNEL, (freq_word >> 8) as u8);

    // Key on, hold for one second, key off, let the release ring out.
    let mut samples = Vec::with_capacity(3 * SAMPLE_RATE as usize);
    chip.set_register(0x08, 0x80 | CHANNEL);
    samples.extend(chip.generate_samples(SAMPLE_RATE as usize));

    chip.set_register(0x08, CHANNEL);
    samples.extend(chip.generate_samples(2 * SAMPLE_RATE as usize));

    let config = ExportConfig::mono().normalize(true);
    write_samples_to_wav(&samples, "ym2151_tone.wav", config)?;

    println!("Wrote ym2151_tone.wav (3 seconds, A4 with release tail)");
    Ok(())
}
