use iir_filters::filter::{DirectForm2Transposed, Filter};
use iir_filters::filter_design::{FilterType as IirFilterType, butter};
use iir_filters::sos::zpk2sos;

use crate::constants::{DECIMATION_CUTOFF_FRACTION, DECIMATION_FILTER_ORDER};
use crate::error::{FirError, Result};

/// Zero-phase anti-aliased decimation for display purposes
///
/// An order-8 Butterworth low-pass at 0.8 of the decimated Nyquist frequency
/// is run forward and then backward over an odd-reflected, padded copy of the
/// input, so the result is not shifted in time. Every `factor`-th sample of
/// the filtered signal is kept.
///
/// Returns the decimated samples and the decimated sample rate
/// (`sample_rate / factor`, rounded down). A factor of 1 returns the input
/// unchanged.
///
/// # Errors
/// * `FirError::InvalidSpec` for a zero factor or a factor that leaves no
///   usable sample rate
/// * `FirError::FilterDesign` if the Butterworth design fails
pub fn decimate(samples: &[f64], factor: usize, sample_rate: u32) -> Result<(Vec<f64>, u32)> {
    if factor == 0 {
        return Err(FirError::InvalidSpec(
            "decimation factor must be at least 1".to_string(),
        ));
    }
    if factor == 1 {
        return Ok((samples.to_vec(), sample_rate));
    }

    let decimated_rate = sample_rate / factor as u32;
    if decimated_rate == 0 {
        return Err(FirError::InvalidSpec(format!(
            "decimation by {} leaves no samples per second at {} Hz",
            factor, sample_rate
        )));
    }
    if samples.is_empty() {
        return Ok((Vec::new(), decimated_rate));
    }

    let cutoff_hz = DECIMATION_CUTOFF_FRACTION * (sample_rate as f64 / 2.0) / factor as f64;
    let filtered = filtfilt_lowpass(samples, cutoff_hz, sample_rate as f64)?;

    log::debug!(
        "Decimated {} samples by {} ({} Hz -> {} Hz, anti-alias cutoff {:.1} Hz)",
        samples.len(),
        factor,
        sample_rate,
        decimated_rate,
        cutoff_hz
    );

    Ok((
        filtered.into_iter().step_by(factor).collect(),
        decimated_rate,
    ))
}

fn design_lowpass(cutoff_hz: f64, sample_rate: f64) -> Result<DirectForm2Transposed> {
    let zpk = butter(
        DECIMATION_FILTER_ORDER,
        IirFilterType::LowPass(cutoff_hz),
        sample_rate,
    )
    .map_err(|e| FirError::FilterDesign(format!("{:?}", e)))?;

    let sos = zpk2sos(&zpk, None).map_err(|e| FirError::FilterDesign(format!("{:?}", e)))?;

    Ok(DirectForm2Transposed::new(&sos))
}

/// Forward-backward low-pass with odd-reflection padding at both ends
fn filtfilt_lowpass(samples: &[f64], cutoff_hz: f64, sample_rate: f64) -> Result<Vec<f64>> {
    let n = samples.len();
    let sections = (DECIMATION_FILTER_ORDER as usize).div_ceil(2);
    let padlen = (3 * (2 * sections + 1)).min(n - 1);

    let first = samples[0];
    let last = samples[n - 1];

    let mut padded = Vec::with_capacity(n + 2 * padlen);
    padded.extend((1..=padlen).rev().map(|i| 2.0 * first - samples[i]));
    padded.extend_from_slice(samples);
    padded.extend((1..=padlen).map(|i| 2.0 * last - samples[n - 1 - i]));

    let mut forward = design_lowpass(cutoff_hz, sample_rate)?;
    for sample in padded.iter_mut() {
        *sample = forward.filter(*sample);
    }

    let mut backward = design_lowpass(cutoff_hz, sample_rate)?;
    for sample in padded.iter_mut().rev() {
        *sample = backward.filter(*sample);
    }

    Ok(padded[padlen..padlen + n].to_vec())
}
