use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::constants::OUTPUT_WAV_BITS;
use crate::error::{FirError, Result};

/// Scale `samples` so the peak maps to `i16::MAX`
///
/// `round(y / max|y| * 32767)`, rounding half away from zero.
///
/// # Errors
/// * `FirError::DegenerateInput` if the sequence is empty or silent
/// * `FirError::InvalidSpec` if it contains NaN or infinity
pub fn normalize_to_i16(samples: &[f64]) -> Result<Vec<i16>> {
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(FirError::InvalidSpec(
            "cannot normalize non-finite samples".to_string(),
        ));
    }

    let peak = samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    if peak == 0.0 {
        return Err(FirError::DegenerateInput(format!(
            "cannot normalize {} silent samples for audio output",
            samples.len()
        )));
    }

    let full_scale = i16::MAX as f64;
    Ok(samples
        .iter()
        .map(|&s| (s / peak * full_scale).round() as i16)
        .collect())
}

/// Write a filtered float signal as a normalized mono 16-bit WAV
pub fn save_wav<P: AsRef<Path>>(path: P, samples: &[f64], sample_rate: u32) -> Result<()> {
    let normalized = normalize_to_i16(samples)?;
    write_wav_i16(path, &normalized, sample_rate)
}

/// Write already normalized samples as a mono 16-bit WAV
pub fn write_wav_i16<P: AsRef<Path>>(
    path: P,
    normalized: &[i16],
    sample_rate: u32,
) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: OUTPUT_WAV_BITS,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;

    for &sample in normalized {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    log::info!(
        "Wrote {} ({} samples at {} Hz)",
        path.as_ref().display(),
        normalized.len(),
        sample_rate
    );
    Ok(())
}
