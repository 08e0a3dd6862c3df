use std::io::{self, Write};

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

use crate::config::{HeatClamp, SpectrogramConfig};
use crate::error::{FirError, Result};
use crate::signal_processing::decimate;

/// Time-frequency magnitude grid
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Segment centers in seconds
    pub times: Vec<f64>,
    /// Bin frequencies in Hz, DC to Nyquist of the analysed rate
    pub frequencies: Vec<f64>,
    /// `magnitudes[f][t]`, one row per frequency bin
    pub magnitudes: Vec<Vec<f64>>,
    /// Sample rate after decimation
    pub sample_rate: u32,
}

impl Spectrogram {
    /// Largest magnitude in the grid (0.0 for an empty grid)
    pub fn peak(&self) -> f64 {
        self.magnitudes
            .iter()
            .flatten()
            .fold(0.0f64, |acc, &m| acc.max(m))
    }

    /// Write the grid as CSV: a header of segment times, then one row per bin
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "frequency_hz")?;
        for t in &self.times {
            write!(writer, ",{:.6}", t)?;
        }
        writeln!(writer)?;

        for (freq, row) in self.frequencies.iter().zip(&self.magnitudes) {
            write!(writer, "{:.3}", freq)?;
            for m in row {
                write!(writer, ",{:.6e}", m)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

/// Compute a diagnostic spectrogram
///
/// The signal is decimated first (see [`decimate`]), then split into
/// segments of `segment_len` samples advancing by `segment_len - overlap`.
/// Each segment has its mean removed, is windowed, and transformed; the
/// magnitude of each bin is divided by the window sum. A signal shorter than
/// one segment is zero-padded into a single segment. Finally every value is
/// clamped to `[0, limit]` per the configured [`HeatClamp`].
///
/// # Errors
/// `FirError::InvalidSpec` for a zero segment length, an overlap not smaller
/// than the segment, a zero decimation factor, or a non-finite clamp limit.
pub fn compute_spectrogram(
    samples: &[f64],
    sample_rate: u32,
    config: &SpectrogramConfig,
) -> Result<Spectrogram> {
    let nperseg = config.segment_len;
    let overlap = config.overlap();
    if nperseg == 0 {
        return Err(FirError::InvalidSpec(
            "spectrogram segment length must be positive".to_string(),
        ));
    }
    if overlap >= nperseg {
        return Err(FirError::InvalidSpec(format!(
            "spectrogram overlap {} must be smaller than the segment length {}",
            overlap, nperseg
        )));
    }

    let (decimated, rate) = decimate(samples, config.decimation_factor, sample_rate)?;

    let limit = match config.heat_clamp {
        HeatClamp::Fixed { max } => max,
        HeatClamp::PeakFraction { fraction } => {
            fraction * decimated.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
        }
    };
    if !limit.is_finite() {
        return Err(FirError::InvalidSpec(format!(
            "spectrogram clamp limit must be finite, got {}",
            limit
        )));
    }
    let limit = limit.max(0.0);

    let bins = nperseg / 2 + 1;
    let frequencies: Vec<f64> = (0..bins)
        .map(|k| k as f64 * rate as f64 / nperseg as f64)
        .collect();

    if decimated.is_empty() {
        return Ok(Spectrogram {
            times: Vec::new(),
            frequencies,
            magnitudes: vec![Vec::new(); bins],
            sample_rate: rate,
        });
    }

    let step = nperseg - overlap;
    let segments = if decimated.len() >= nperseg {
        (decimated.len() - nperseg) / step + 1
    } else {
        1
    };

    let window = config.window.coefficients(nperseg);
    let window_sum: f64 = window.iter().sum();
    let norm = if window_sum > 0.0 { window_sum } else { 1.0 };

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nperseg);

    let mut times = Vec::with_capacity(segments);
    let mut magnitudes = vec![Vec::with_capacity(segments); bins];
    let mut buffer = vec![Complex::new(0.0, 0.0); nperseg];

    for seg in 0..segments {
        let start = seg * step;
        let end = (start + nperseg).min(decimated.len());
        let segment = &decimated[start..end];
        let mean = segment.iter().sum::<f64>() / segment.len() as f64;

        for (i, slot) in buffer.iter_mut().enumerate() {
            let value = segment.get(i).map_or(0.0, |&s| s - mean);
            *slot = Complex::new(value * window[i], 0.0);
        }
        fft.process(&mut buffer);

        for (row, bin) in magnitudes.iter_mut().zip(buffer.iter()) {
            row.push((bin.norm() / norm).clamp(0.0, limit));
        }
        times.push((start as f64 + nperseg as f64 / 2.0) / rate as f64);
    }

    log::debug!(
        "Spectrogram: {} segments x {} bins at {} Hz, clamp {:.3}",
        segments,
        bins,
        rate,
        limit
    );

    Ok(Spectrogram {
        times,
        frequencies,
        magnitudes,
        sample_rate: rate,
    })
}
