//! FM operator
//!
//! One operator is a sine oscillator with a phase-modulation input and its own
//! envelope generator. Four of them, wired by the channel's algorithm, make an
//! FM voice.

use std::f32::consts::TAU;

use crate::envelope::{EnvelopeGenerator, EnvelopeStage};
use crate::tables;

/// Detune-1 contribution per step (radians)
const DETUNE1_STEP: f32 = 0.05;
/// Detune-2 contribution per step (radians)
const DETUNE2_STEP: f32 = 0.1;

/// Per-operator FM parameter set
///
/// Values are the raw register-width quantities; [`FmParameters::masked`]
/// clamps each field to its hardware bit width. Total level is attenuation:
/// 0 is loudest, 127 silences the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmParameters {
    /// Detune 1 (0-7)
    pub detune1: u8,
    /// Frequency multiplier (0-15, 0 meaning x0.5)
    pub multiplier: u8,
    /// Total level attenuation (0-127, 0 loudest)
    pub total_level: u8,
    /// Key scale (0-3)
    pub key_scale: u8,
    /// Attack rate (0-31)
    pub attack_rate: u8,
    /// AM sensitivity (0-3)
    pub am_sensitivity: u8,
    /// Decay rate (0-31)
    pub decay_rate: u8,
    /// Detune 2 (0-3)
    pub detune2: u8,
    /// Sustain rate (0-31)
    pub sustain_rate: u8,
    /// Sustain level (0-15)
    pub sustain_level: u8,
    /// Release rate (0-15)
    pub release_rate: u8,
    /// SSG-EG flag (accepted, no audible effect)
    pub ssg_eg: bool,
}

impl FmParameters {
    /// Power-on parameter set: silent, fastest attack, mid release
    pub fn power_on() -> Self {
        Self {
            detune1: 0,
            multiplier: 1,
            total_level: 127,
            key_scale: 0,
            attack_rate: 31,
            am_sensitivity: 0,
            decay_rate: 0,
            detune2: 0,
            sustain_rate: 0,
            sustain_level: 0,
            release_rate: 15,
            ssg_eg: false,
        }
    }

    /// Clamp every field to its register bit width
    pub fn masked(self) -> Self {
        Self {
            detune1: self.detune1 & 0x07,
            multiplier: self.multiplier & 0x0F,
            total_level: self.total_level & 0x7F,
            key_scale: self.key_scale & 0x03,
            attack_rate: self.attack_rate & 0x1F,
            am_sensitivity: self.am_sensitivity & 0x03,
            decay_rate: self.decay_rate & 0x1F,
            detune2: self.detune2 & 0x03,
            sustain_rate: self.sustain_rate & 0x1F,
            sustain_level: self.sustain_level & 0x0F,
            release_rate: self.release_rate & 0x0F,
            ssg_eg: self.ssg_eg,
        }
    }
}

impl Default for FmParameters {
    fn default() -> Self {
        Self::power_on()
    }
}

/// One sinusoidal FM operator
#[derive(Debug, Clone)]
pub struct Operator {
    params: FmParameters,
    envelope: EnvelopeGenerator,
    /// Effective phase of the last evaluation, kept normalized to [0, 2π)
    phase: f32,
}

impl Operator {
    /// Create an operator with power-on parameters, at rest
    pub fn new() -> Self {
        let mut op = Self {
            params: FmParameters::power_on(),
            envelope: EnvelopeGenerator::new(),
            phase: 0.0,
        };
        op.apply_envelope_rates();
        op
    }

    /// Restore power-on parameters and clear phase and envelope
    pub fn reset(&mut self) {
        self.params = FmParameters::power_on();
        self.envelope.reset();
        self.apply_envelope_rates();
        self.phase = 0.0;
    }

    /// Replace the full parameter set
    ///
    /// Fields are masked to their register widths; envelope rates are
    /// re-derived immediately and take effect from the next sample.
    pub fn set_parameters(&mut self, params: FmParameters) {
        self.params = params.masked();
        self.apply_envelope_rates();
    }

    /// Current parameter set
    #[inline]
    pub fn parameters(&self) -> &FmParameters {
        &self.params
    }

    fn apply_envelope_rates(&mut self) {
        self.envelope.configure(
            self.params.attack_rate,
            self.params.decay_rate,
            self.params.sustain_rate,
            self.params.sustain_level,
            self.params.release_rate,
        );
    }

    /// Start the attack stage
    #[inline]
    pub fn key_on(&mut self) {
        self.envelope.key_on();
    }

    /// Start the release stage
    #[inline]
    pub fn key_off(&mut self) {
        self.envelope.key_off();
    }

    /// Advance the envelope by one sample
    #[inline]
    pub fn step_envelope(&mut self) {
        self.envelope.step();
    }

    /// Current envelope level in [0, 1]
    #[inline]
    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    /// Current envelope stage
    #[inline]
    pub fn envelope_stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    /// Whether the envelope is at rest (the operator contributes nothing)
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.envelope.is_idle()
    }

    /// Effective phase of the last evaluation, in [0, 2π)
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Evaluate the operator for one sample
    ///
    /// `phase` is the owning channel's accumulator; `modulation` is the sum of
    /// upstream operator outputs this tick (or the feedback term for operator
    /// 0). The effective phase is `phase × multiplier + detune + modulation`
    /// wrapped into [0, 2π); arbitrarily large modulation is absorbed by the
    /// wrap. The result is bounded by the envelope level.
    pub fn produce_sample(&mut self, phase: f32, modulation: f32) -> f32 {
        let detune =
            self.params.detune1 as f32 * DETUNE1_STEP + self.params.detune2 as f32 * DETUNE2_STEP;
        let multiplier = if self.params.multiplier == 0 {
            0.5
        } else {
            self.params.multiplier as f32
        };

        self.phase = (phase * multiplier + detune + modulation).rem_euclid(TAU);

        tables::sine(self.phase) * self.envelope.level() * self.attenuation()
    }

    /// Static output gain from the total-level field (0 -> 1.0, 127 -> 0.0)
    #[inline]
    fn attenuation(&self) -> f32 {
        1.0 - self.params.total_level as f32 / 127.0
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self::new()
    }
}
