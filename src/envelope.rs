//! Operator envelope generator
//!
//! Four-stage amplitude envelope (Attack, Decay, Sustain, Release) plus an
//! Idle resting state. Levels live in [0, 1] and move by a per-stage fraction
//! of the remaining headroom (attack) or of the current level (the decaying
//! stages), so the curves are exponential-ish without a hardware rate table.
//!
//! Register rates are 5-bit (attack/decay/sustain) or 4-bit (release) raw
//! values; each stage scales its raw rate by a fixed factor chosen so that
//! mid-range settings produce musically useful times at 44.1 kHz.

/// Per-sample scale factor applied to the raw 5-bit attack rate
pub const ATTACK_RATE_FACTOR: f32 = 0.001;
/// Per-sample scale factor applied to the raw 5-bit decay rate
pub const DECAY_RATE_FACTOR: f32 = 0.0001;
/// Per-sample scale factor applied to the raw 5-bit sustain rate
pub const SUSTAIN_RATE_FACTOR: f32 = 0.00005;
/// Per-sample scale factor applied to the raw 4-bit release rate
pub const RELEASE_RATE_FACTOR: f32 = 0.0002;

/// Level below which a decaying envelope is considered finished
pub const LEVEL_EPSILON: f32 = 1e-3;

/// Attack is considered complete above this level
const ATTACK_DONE: f32 = 0.99;

/// Maximum raw attack rate; keys on straight to full level
const INSTANT_ATTACK_RATE: u8 = 31;

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    /// At rest, level pinned to 0
    #[default]
    Idle,
    /// Rising toward full level after key-on
    Attack,
    /// Falling from full level toward the sustain level
    Decay,
    /// Slow fall (or hold, at rate 0) at the sustain level
    Sustain,
    /// Falling toward silence after key-off
    Release,
}

/// Four-stage envelope generator
///
/// Rates are configured from an operator's raw register values via
/// [`EnvelopeGenerator::configure`]; the stage machine then advances one step
/// per audio sample through [`EnvelopeGenerator::step`].
#[derive(Debug, Clone, Default)]
pub struct EnvelopeGenerator {
    stage: EnvelopeStage,
    level: f32,
    attack_rate: f32,
    decay_rate: f32,
    sustain_rate: f32,
    release_rate: f32,
    /// Level at which Decay hands over to Sustain (1 - sl/15)
    sustain_threshold: f32,
    /// Raw attack rate of 31 skips the attack ramp entirely
    instant_attack: bool,
}

impl EnvelopeGenerator {
    /// Create an envelope generator at rest with all rates zero
    pub fn new() -> Self {
        Self {
            sustain_threshold: 1.0,
            ..Self::default()
        }
    }

    /// Derive per-sample rates from raw register values
    ///
    /// # Arguments
    ///
    /// * `attack` - raw attack rate (0-31)
    /// * `decay` - raw decay rate (0-31)
    /// * `sustain` - raw sustain rate (0-31)
    /// * `sustain_level` - sustain level (0-15, 0 sustains at full level)
    /// * `release` - raw release rate (0-15)
    pub fn configure(&mut self, attack: u8, decay: u8, sustain: u8, sustain_level: u8, release: u8) {
        self.attack_rate = attack as f32 * ATTACK_RATE_FACTOR;
        self.decay_rate = decay as f32 * DECAY_RATE_FACTOR;
        self.sustain_rate = sustain as f32 * SUSTAIN_RATE_FACTOR;
        self.release_rate = release as f32 * RELEASE_RATE_FACTOR;
        self.sustain_threshold = 1.0 - sustain_level as f32 / 15.0;
        self.instant_attack = attack >= INSTANT_ATTACK_RATE;
    }

    /// Enter the attack stage
    ///
    /// At the maximum attack rate the ramp is skipped: the level jumps to 1
    /// and the envelope lands directly in Decay. The current level is kept
    /// otherwise, so retriggering mid-decay attacks from where it left off.
    pub fn key_on(&mut self) {
        if self.instant_attack {
            self.level = 1.0;
            self.stage = EnvelopeStage::Decay;
        } else {
            self.stage = EnvelopeStage::Attack;
        }
    }

    /// Enter the release stage from any stage
    pub fn key_off(&mut self) {
        self.stage = EnvelopeStage::Release;
    }

    /// Advance the envelope by one sample
    pub fn step(&mut self) {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.level += (1.0 - self.level) * self.attack_rate;
                if self.level > ATTACK_DONE {
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.level -= self.level * self.decay_rate;
                if self.level <= self.sustain_threshold {
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level -= self.level * self.sustain_rate;
                if self.level < LEVEL_EPSILON {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
            EnvelopeStage::Release => {
                self.level -= self.level * self.release_rate;
                if self.level < LEVEL_EPSILON {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }
        self.level = self.level.clamp(0.0, 1.0);
    }

    /// Current envelope level in [0, 1]
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current stage
    #[inline]
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Whether the envelope is at rest
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.stage == EnvelopeStage::Idle
    }

    /// Return to the resting state with level 0 (rates are left untouched)
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }
}
