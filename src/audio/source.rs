use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;

use super::AudioSignal;
use crate::error::{FirError, Result};

/// Load a mono integer PCM WAV file
///
/// # Errors
/// * `FirError::FileNotFound` if `path` does not exist
/// * `FirError::UnsupportedFormat` for multi-channel or floating-point files
/// * `FirError::Wav` if the container cannot be decoded
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioSignal> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FirError::FileNotFound(path.to_path_buf()));
    }

    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(FirError::UnsupportedFormat(format!(
            "expected mono WAV file, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_format != hound::SampleFormat::Int {
        return Err(FirError::UnsupportedFormat(
            "floating-point WAV samples are not supported".to_string(),
        ));
    }

    let samples = read_samples(reader)?;

    log::info!(
        "Loaded {}: {} samples at {} Hz, {}-bit",
        path.display(),
        samples.len(),
        spec.sample_rate,
        spec.bits_per_sample
    );

    AudioSignal::new(samples, spec.sample_rate, spec.bits_per_sample)
}

fn read_samples(mut reader: WavReader<BufReader<File>>) -> Result<Vec<i32>> {
    let samples = reader
        .samples::<i32>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(samples)
}
