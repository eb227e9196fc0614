//! WAV file export

use std::path::Path;

use crate::backend::Ym2151Backend;
use crate::Result;

use super::{apply_fade_out, mono_to_stereo, normalize_samples, BitDepth, ExportConfig};

/// Render `sample_count` samples from the chip to a 16-bit mono WAV file
///
/// # Example
///
/// ```no_run
/// use ym2151::export::export_to_wav;
/// use ym2151::{Ym2151, Ym2151Backend};
///
/// # fn main() -> ym2151::Result<()> {
/// let mut chip = Ym2151::new();
/// chip.write_register(0x20, 0x07);
/// chip.write_register(0x10, 0xB8);
/// chip.write_register(0x18, 0x01);
/// chip.write_register(0x60, 0x00);
/// chip.write_register(0x08, 0x80);
///
/// export_to_wav(&mut chip, 44_100, "tone.wav")?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<B: Ym2151Backend, P: AsRef<Path>>(
    chip: &mut B,
    sample_count: usize,
    output_path: P,
) -> Result<()> {
    export_to_wav_with_config(chip, sample_count, output_path, ExportConfig::default())
}

/// Render samples from the chip to a WAV file with custom configuration
///
/// The chip renders at the config's sample rate; normalization and fade-out
/// run on the mono block before any stereo duplication.
pub fn export_to_wav_with_config<B: Ym2151Backend, P: AsRef<Path>>(
    chip: &mut B,
    sample_count: usize,
    output_path: P,
    config: ExportConfig,
) -> Result<()> {
    chip.set_sample_rate(config.sample_rate);

    let mut samples = chip.generate_samples(sample_count);

    if config.normalize {
        normalize_samples(&mut samples);
    }
    if config.fade_out_duration > 0.0 {
        apply_fade_out(&mut samples, config.fade_out_duration, config.sample_rate);
    }

    let final_samples = if config.channels == 2 {
        mono_to_stereo(&samples)
    } else {
        samples
    };

    write_wav_file(output_path.as_ref(), &final_samples, &config)
}

/// Write an already-rendered mono sample block to a WAV file
///
/// For drivers that interleave register writes with generation and therefore
/// render their own buffer. Normalization and fade-out from the config are
/// applied, then the block is written (duplicated to stereo if configured).
pub fn write_samples_to_wav<P: AsRef<Path>>(
    samples: &[f32],
    output_path: P,
    config: ExportConfig,
) -> Result<()> {
    let mut samples = samples.to_vec();

    if config.normalize {
        normalize_samples(&mut samples);
    }
    if config.fade_out_duration > 0.0 {
        apply_fade_out(&mut samples, config.fade_out_duration, config.sample_rate);
    }

    let final_samples = if config.channels == 2 {
        mono_to_stereo(&samples)
    } else {
        samples
    };

    write_wav_file(output_path.as_ref(), &final_samples, &config)
}

/// Write samples to disk in the configured WAV format
fn write_wav_file(path: &Path, samples: &[f32], config: &ExportConfig) -> Result<()> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: match config.bit_depth {
            BitDepth::Int16 => 16,
            BitDepth::Float32 => 32,
        },
        sample_format: match config.bit_depth {
            BitDepth::Int16 => hound::SampleFormat::Int,
            BitDepth::Float32 => hound::SampleFormat::Float,
        },
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| format!("Failed to create WAV file: {e}"))?;

    match config.bit_depth {
        BitDepth::Int16 => {
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(value)
                    .map_err(|e| format!("Failed to write sample: {e}"))?;
            }
        }
        BitDepth::Float32 => {
            for &sample in samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| format!("Failed to write sample: {e}"))?;
            }
        }
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV file: {e}"))?;

    Ok(())
}
