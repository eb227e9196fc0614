//! Low-frequency oscillator
//!
//! The LFO runs far below audio rate and exists to modulate operator amplitude
//! and pitch. Its phase lives in [0, 1); the waveform value is computed on
//! demand from the phase, except for the random waveform which redraws a
//! uniform value on every tick.

/// LFO waveform selected by the 2-bit waveform index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoWaveform {
    /// Rises 0 to 1 over the first half of the cycle, falls back over the second
    #[default]
    Triangle,
    /// Equal to the phase itself
    Sawtooth,
    /// 1 for the first half of the cycle, 0 for the second
    Square,
    /// Uniform [0, 1) value redrawn each tick
    Random,
}

impl LfoWaveform {
    /// Convert a raw waveform index (masked to 0-3)
    pub fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => LfoWaveform::Triangle,
            1 => LfoWaveform::Sawtooth,
            2 => LfoWaveform::Square,
            _ => LfoWaveform::Random,
        }
    }
}

/// Deterministic 15-bit LCG, same recurrence the power-on randomizer of the
/// reference PSG core uses
fn next_random(seed: &mut u32) -> f32 {
    *seed = seed.wrapping_mul(214013).wrapping_add(2531011);
    ((*seed >> 16) & 0x7FFF) as f32 / 32768.0
}

/// Low-frequency oscillator state
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Phase in [0, 1)
    phase: f32,
    /// 4-bit frequency index from register 0x01; 0 freezes the phase
    frequency: u8,
    waveform: LfoWaveform,
    /// Amplitude modulation depth (coupling into operators is driver territory)
    am_depth: f32,
    /// Pitch modulation depth (coupling into operators is driver territory)
    pm_depth: f32,
    random_level: f32,
    seed: u32,
}

impl Lfo {
    /// Create an LFO at phase 0 with the triangle waveform
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            frequency: 0,
            waveform: LfoWaveform::Triangle,
            am_depth: 0.0,
            pm_depth: 0.0,
            random_level: 0.0,
            seed: 1,
        }
    }

    /// Reset phase, frequency, waveform, and depths
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.frequency = 0;
        self.waveform = LfoWaveform::Triangle;
        self.am_depth = 0.0;
        self.pm_depth = 0.0;
        self.random_level = 0.0;
        self.seed = 1;
    }

    /// Set the 4-bit frequency index
    #[inline]
    pub fn set_frequency(&mut self, index: u8) {
        self.frequency = index & 0x0F;
    }

    /// Current frequency index
    #[inline]
    pub fn frequency(&self) -> u8 {
        self.frequency
    }

    /// Select the waveform
    #[inline]
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform
    #[inline]
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Set amplitude and pitch modulation depths
    #[inline]
    pub fn set_depths(&mut self, am_depth: f32, pm_depth: f32) {
        self.am_depth = am_depth;
        self.pm_depth = pm_depth;
    }

    /// Amplitude modulation depth
    #[inline]
    pub fn am_depth(&self) -> f32 {
        self.am_depth
    }

    /// Pitch modulation depth
    #[inline]
    pub fn pm_depth(&self) -> f32 {
        self.pm_depth
    }

    /// Current phase in [0, 1)
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance one sample at the given host rate
    ///
    /// The phase step is `frequency × 0.01 / sample_rate`; frequency index 0
    /// leaves the phase untouched. The random waveform redraws here so its
    /// value changes per tick, not per read.
    pub fn advance(&mut self, sample_rate: f32) {
        if self.frequency > 0 {
            self.phase += self.frequency as f32 * 0.01 / sample_rate;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
        if self.waveform == LfoWaveform::Random {
            self.random_level = next_random(&mut self.seed);
        }
    }

    /// Waveform value for the current phase, in [0, 1]
    pub fn value(&self) -> f32 {
        match self.waveform {
            LfoWaveform::Triangle => {
                if self.phase < 0.5 {
                    self.phase * 2.0
                } else {
                    2.0 - self.phase * 2.0
                }
            }
            LfoWaveform::Sawtooth => self.phase,
            LfoWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            LfoWaveform::Random => self.random_level,
        }
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_from_index_masks() {
        assert_eq!(LfoWaveform::from_index(0), LfoWaveform::Triangle);
        assert_eq!(LfoWaveform::from_index(1), LfoWaveform::Sawtooth);
        assert_eq!(LfoWaveform::from_index(2), LfoWaveform::Square);
        assert_eq!(LfoWaveform::from_index(3), LfoWaveform::Random);
        assert_eq!(LfoWaveform::from_index(6), LfoWaveform::Square);
    }

    #[test]
    fn test_zero_frequency_freezes_phase() {
        let mut lfo = Lfo::new();
        for _ in 0..1000 {
            lfo.advance(44_100.0);
        }
        assert_eq!(lfo.phase(), 0.0);
    }

    #[test]
    fn test_phase_wraps_below_one() {
        let mut lfo = Lfo::new();
        lfo.set_frequency(15);
        // Low rate makes the step large enough to wrap quickly.
        for _ in 0..10_000 {
            lfo.advance(100.0);
            assert!(
                (0.0..1.0).contains(&lfo.phase()),
                "phase {} escaped [0, 1)",
                lfo.phase()
            );
        }
    }

    #[test]
    fn test_triangle_shape() {
        let mut lfo = Lfo::new();
        lfo.set_waveform(LfoWaveform::Triangle);
        lfo.phase = 0.25;
        assert!((lfo.value() - 0.5).abs() < 1e-6);
        lfo.phase = 0.5;
        assert!((lfo.value() - 1.0).abs() < 1e-6);
        lfo.phase = 0.75;
        assert!((lfo.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sawtooth_is_phase() {
        let mut lfo = Lfo::new();
        lfo.set_waveform(LfoWaveform::Sawtooth);
        lfo.phase = 0.375;
        assert_eq!(lfo.value(), 0.375);
    }

    #[test]
    fn test_square_halves() {
        let mut lfo = Lfo::new();
        lfo.set_waveform(LfoWaveform::Square);
        lfo.phase = 0.2;
        assert_eq!(lfo.value(), 1.0);
        lfo.phase = 0.7;
        assert_eq!(lfo.value(), 0.0);
    }

    #[test]
    fn test_random_stays_in_unit_interval_and_varies() {
        let mut lfo = Lfo::new();
        lfo.set_waveform(LfoWaveform::Random);
        lfo.set_frequency(1);
        let mut seen_distinct = false;
        let mut previous = None;
        for _ in 0..100 {
            lfo.advance(44_100.0);
            let value = lfo.value();
            assert!((0.0..1.0).contains(&value));
            if let Some(prev) = previous {
                if prev != value {
                    seen_distinct = true;
                }
            }
            previous = Some(value);
        }
        assert!(seen_distinct, "random waveform should vary tick to tick");
    }
}
