use std::f64::consts::PI;
use std::path::Path;

/// Integer sine tone, `amplitude` in sample units
pub fn generate_tone(
    freq_hz: f64,
    sample_rate: u32,
    num_samples: usize,
    amplitude: f64,
) -> Vec<i32> {
    generate_mixture(&[(freq_hz, amplitude)], sample_rate, num_samples)
}

/// Sum of integer sine tones given as `(frequency_hz, amplitude)` pairs
pub fn generate_mixture(tones: &[(f64, f64)], sample_rate: u32, num_samples: usize) -> Vec<i32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            tones
                .iter()
                .map(|&(freq, amplitude)| amplitude * (2.0 * PI * freq * t).sin())
                .sum::<f64>()
                .round() as i32
        })
        .collect()
}

/// Write a mono 16-bit PCM WAV
pub fn save_mono_wav<P: AsRef<Path>>(
    path: P,
    samples: &[i32],
    sample_rate: u32,
) -> hound::Result<()> {
    use hound::{WavSpec, WavWriter};

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for &sample in samples {
        writer.write_sample(sample as i16)?;
    }

    writer.finalize()?;
    Ok(())
}

/// Root-mean-square of a slice
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_tone_length() {
        let signal = generate_tone(1000.0, 8000, 800, 100.0);
        assert_eq!(signal.len(), 800);
        assert_eq!(signal[0], 0);
        assert_eq!(signal[2], 100);
    }
}
