//! YM2151 (OPM) FM Synthesis Chip Emulator
//!
//! A software emulation of the Yamaha YM2151 four-operator FM sound chip as a
//! pure audio source: host code writes byte values to 8-bit register
//! addresses and pulls blocks of `f32` PCM samples. All per-channel and
//! per-operator state (phase accumulators, envelope generators, modulation
//! routing) is maintained internally.
//!
//! # Features
//! - 8 FM channels of 4 sine operators each
//! - The 8 hard-wired OPM modulation algorithms with operator-0 self-feedback
//! - Four-stage envelope generators driven from register-programmed rates
//! - LFO with triangle, sawtooth, square, and random waveforms
//! - Register-level programming with full read-back of every address
//! - WAV export (16-bit PCM / 32-bit float) through the `export` module
//!
//! This is a perceptual emulation, not a bit-exact one: the sine table, phase
//! accumulator, and envelope curves are floating-point approximations tuned
//! to sound right at arbitrary sample rates. Timers, CSM mode, and the noise
//! generator are accepted at the register level but have no audible effect.
//!
//! # Quick start
//! ```
//! use ym2151::Ym2151;
//!
//! let mut chip = Ym2151::new();
//! chip.set_register(0x20, 0x07); // Channel 0: algorithm 7, no feedback
//! chip.set_register(0x10, 0xB8); // Frequency word 0x01B8 = 440 Hz
//! chip.set_register(0x18, 0x01);
//! chip.set_register(0x60, 0x00); // Operator 0 total level: loudest
//! chip.set_register(0x08, 0x80); // Key on channel 0
//!
//! let mut buffer = [0.0f32; 1024];
//! chip.generate(&mut buffer);
//! ```
//!
//! A chip instance is single-threaded: register writes and sample generation
//! must be externally serialized. Generation is allocation-free.

#![warn(missing_docs)]

mod backend;
mod channel;
mod chip;
mod envelope;
mod lfo;
mod operator;
pub mod registers;
mod tables;

pub mod export;

/// Error types for emulator operations
///
/// The synthesis core itself has no recoverable failures; these errors come
/// from the file-export layer and from driver-side configuration.
#[derive(thiserror::Error, Debug)]
pub enum Ym2151Error {
    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Ym2151Error {
    /// Converts a String into `Ym2151Error::Other`.
    fn from(msg: String) -> Self {
        Ym2151Error::Other(msg)
    }
}

impl From<&str> for Ym2151Error {
    /// Converts a string slice into `Ym2151Error::Other`.
    fn from(msg: &str) -> Self {
        Ym2151Error::Other(msg.to_string())
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, Ym2151Error>;

// Public API exports
pub use backend::Ym2151Backend;
pub use channel::{Channel, OPERATORS_PER_CHANNEL};
pub use chip::{Ym2151, CHANNEL_COUNT, DEFAULT_CLOCK, DEFAULT_SAMPLE_RATE};
pub use envelope::{EnvelopeGenerator, EnvelopeStage};
pub use lfo::{Lfo, LfoWaveform};
pub use operator::{FmParameters, Operator};
