//! C-major scale with a piano-ish FM patch, rendered to a WAV file
//!
//! Plays C4 through B4 on channel 0, each note gated on for 80% of its slot
//! and released for the remaining 20%, and writes the result to
//! `ym2151_piano_scale.wav`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example piano_scale
//! ```

use ym2151::export::{write_samples_to_wav, ExportConfig};
use ym2151::{Ym2151, Ym2151Backend};

const SAMPLE_RATE: u32 = 44_100;
const CHANNEL: u8 = 0;
const NOTE_DURATION: f32 = 0.5;

/// Equal-tempered note frequency, A4 (MIDI 69) = 440 Hz
fn note_to_frequency(note: i32) -> f32 {
    440.0 * 2.0f32.powf((note - 69) as f32 / 12.0)
}

/// Program a bright two-stack patch with a percussive carrier envelope
fn setup_piano_voice(chip: &mut Ym2151) {
    // Algorithm 4, no feedback.
    chip.set_register(0x20 + CHANNEL, 4);

    // Modulators (op0, op2) add a little brightness.
    for op in [0u8, 2] {
        chip.set_register(0x40 + op * 8 + CHANNEL, 0x01); // MUL = 1
        chip.set_register(0x60 + op * 8 + CHANNEL, 0x60); // TL: mostly attenuated
        chip.set_register(0x80 + op * 8 + CHANNEL, 0x1F); // AR = 31
        chip.set_register(0xA0 + op * 8 + CHANNEL, 0x08); // DR = 8
        chip.set_register(0xC0 + op * 8 + CHANNEL, 0x04); // SR = 4
        chip.set_register(0xE0 + op * 8 + CHANNEL, 0x0F); // RR = 15
    }

    // Carriers (op1, op3) carry the body of the note.
    for op in [1u8, 3] {
        chip.set_register(0x40 + op * 8 + CHANNEL, 0x01); // MUL = 1
        chip.set_register(0x60 + op * 8 + CHANNEL, 0x00); // TL = 0 (loudest)
        chip.set_register(0x80 + op * 8 + CHANNEL, 0x1F); // AR = 31
        chip.set_register(0xA0 + op * 8 + CHANNEL, 0x06); // DR = 6
        chip.set_register(0xC0 + op * 8 + CHANNEL, 0x06); // SR = 6
        chip.set_register(0xE0 + op * 8 + CHANNEL, 0x0F); // RR = 15
    }
}

/// Render one note: retune, key on for 80% of the slot, release for 20%
fn play_note(chip: &mut Ym2151, note: i32, samples: &mut Vec<f32>) {
    let freq_word = note_to_frequency(note).round() as u16;
    chip.set_register(0x10 + CHANNEL, (freq_word & 0xFF) as u8);
    chip.set_register(0x18 + CHANNEL, (freq_word >> 8) as u8);

    let slot = (NOTE_DURATION * SAMPLE_RATE as f32) as usize;
    let gate = slot * 4 / 5;

    chip.set_register(0x08, 0x80 | CHANNEL);
    samples.extend(chip.generate_samples(gate));

    chip.set_register(0x08, CHANNEL);
    samples.extend(chip.generate_samples(slot - gate));
}

fn main() -> ym2151::Result<()> {
    let mut chip = Ym2151::new();
    chip.set_sample_rate(SAMPLE_RATE);
    setup_piano_voice(&mut chip);

    // C4 D4 E4 F4 G4 A4 B4
    let notes = [60, 62, 64, 65, 67, 69, 71];
    let names = ["C", "D", "E", "F", "G", "A", "B"];

    let mut samples = Vec::with_capacity(notes.len() * (NOTE_DURATION * SAMPLE_RATE as f32) as usize);
    for (&note, name) in notes.iter().zip(names) {
        println!("Playing {name}4 ({:.1} Hz)", note_to_frequency(note));
        play_note(&mut chip, note, &mut samples);
    }

    let config = ExportConfig::mono().normalize(true);
    write_samples_to_wav(&samples, "ym2151_piano_scale.wav", config)?;

    println!("Wrote ym2151_piano_scale.wav ({} notes)", notes.len());
    Ok(())
}
