//! Backend trait abstraction for YM2151 chip implementations
//!
//! Drivers (WAV exporters, players, sequencers) talk to the chip through this
//! trait, so an alternative implementation (a bit-exact core, a wrapped
//! hardware part) can be swapped in without touching driver code.

/// Common interface for YM2151 chip backends
///
/// # Example
///
/// ```
/// use ym2151::{Ym2151, Ym2151Backend};
///
/// fn render<B: Ym2151Backend>(chip: &mut B) -> Vec<f32> {
///     chip.write_register(0x10, 0xB8); // Channel 0 frequency low (440 Hz)
///     chip.write_register(0x18, 0x01); // Channel 0 frequency high
///     chip.write_register(0x20, 0x07); // Algorithm 7, feedback 0
///     chip.write_register(0x60, 0x00); // Operator 0 total level: loudest
///     chip.write_register(0x08, 0x80); // Key on channel 0
///     chip.generate_samples(1024)
/// }
///
/// let mut chip = Ym2151::new();
/// let samples = render(&mut chip);
/// assert_eq!(samples.len(), 1024);
/// ```
pub trait Ym2151Backend: Send {
    /// Create a backend with the default chip clock (3.579545 MHz) and
    /// 44.1 kHz sample rate
    fn new() -> Self
    where
        Self: Sized;

    /// Create a backend with a custom chip clock frequency in Hz
    fn with_clock(clock_hz: u32) -> Self
    where
        Self: Sized;

    /// Reset the backend: clear registers, silence every channel
    fn reset(&mut self);

    /// Write a byte to an 8-bit register address
    ///
    /// Every address stores its value for read-back; only decoded addresses
    /// change synthesis state. The effect is visible from the next sample.
    fn write_register(&mut self, addr: u8, value: u8);

    /// Read back the last byte written to an address (0 after reset)
    fn read_register(&self, addr: u8) -> u8;

    /// Set the host sample rate in Hz
    fn set_sample_rate(&mut self, rate: u32);

    /// Fill the buffer with the next samples of the mixed chip output
    fn generate(&mut self, buffer: &mut [f32]);

    /// Generate `count` samples into a fresh vector
    ///
    /// Convenience wrapper over [`Ym2151Backend::generate`]; prefer the
    /// slice form in hot paths to avoid the allocation.
    fn generate_samples(&mut self, count: usize) -> Vec<f32> {
        let mut samples = vec![0.0; count];
        self.generate(&mut samples);
        samples
    }
}
