use std::f64::consts::PI;
use std::fmt;

use num_complex::Complex64;

use crate::error::{FirError, Result};
use crate::signal_processing::Window;

/// Response shape of a windowed-sinc design
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// Unity gain at DC
    LowPass,
    /// Unity gain at Nyquist (spectral inversion of the low-pass prototype)
    #[default]
    HighPass,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::LowPass => f.write_str("low-pass"),
            FilterType::HighPass => f.write_str("high-pass"),
        }
    }
}

/// Validated windowed-sinc filter parameters
///
/// Construction through [`FilterSpec::new`] is the only way to obtain one, so
/// every `FilterSpec` in circulation has an odd tap count of at least 3 and a
/// cutoff strictly inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    taps: usize,
    cutoff: f64,
    filter_type: FilterType,
    window: Window,
}

impl FilterSpec {
    /// Validate filter parameters
    ///
    /// # Arguments
    /// * `taps` - Number of coefficients (odd, at least 3)
    /// * `cutoff` - Cutoff normalized to Nyquist, strictly between 0 and 1
    /// * `filter_type` - Low-pass or high-pass
    /// * `window` - Smoothing window for the truncated sinc
    ///
    /// # Errors
    /// Returns `FirError::InvalidSpec` for an even or too-small tap count or a
    /// cutoff outside (0, 1).
    pub fn new(taps: usize, cutoff: f64, filter_type: FilterType, window: Window) -> Result<Self> {
        if taps < 3 {
            return Err(FirError::InvalidSpec(format!(
                "tap count must be at least 3, got {}",
                taps
            )));
        }
        if taps.is_multiple_of(2) {
            return Err(FirError::InvalidSpec(format!(
                "tap count must be odd for a linear-phase design, got {}",
                taps
            )));
        }
        if !cutoff.is_finite() || cutoff <= 0.0 || cutoff >= 1.0 {
            return Err(FirError::InvalidSpec(format!(
                "normalized cutoff must lie strictly between 0 and 1, got {}",
                cutoff
            )));
        }

        Ok(Self {
            taps,
            cutoff,
            filter_type,
            window,
        })
    }

    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Cutoff as a fraction of the Nyquist frequency
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn window(&self) -> Window {
        self.window
    }
}

/// Real-valued FIR taps produced by [`design_fir`]
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    taps: Vec<f64>,
}

impl CoefficientSet {
    /// Wrap externally supplied taps
    pub fn new(taps: Vec<f64>) -> Self {
        Self { taps }
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.taps
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        self.taps.len().saturating_sub(1) / 2
    }

    /// Check `h[i] == h[T-1-i]` within `tolerance`
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.taps.len();
        (0..n / 2).all(|i| (self.taps[i] - self.taps[n - 1 - i]).abs() <= tolerance)
    }

    /// Magnitude response at `freq`, normalized so 1.0 is Nyquist
    pub fn magnitude_response(&self, freq: f64) -> f64 {
        self.taps
            .iter()
            .enumerate()
            .map(|(k, &h)| Complex64::from_polar(h, -PI * freq * k as f64))
            .sum::<Complex64>()
            .norm()
    }
}

/// Design a windowed-sinc FIR filter
///
/// The ideal low-pass `c·sinc(c·m)` is sampled at `m = k - (T-1)/2` and
/// multiplied by the window. A high-pass is obtained by spectral inversion
/// (negate every tap, add one at the center). The result is scaled to unity
/// gain at DC for low-pass and at Nyquist for high-pass.
///
/// # Errors
/// Returns `FirError::InvalidSpec` if the pass-band gain vanishes, which
/// happens only for extreme cutoffs combined with very short filters.
pub fn design_fir(spec: &FilterSpec) -> Result<CoefficientSet> {
    let taps = spec.taps();
    let center = (taps - 1) / 2;
    let cutoff = spec.cutoff();
    let window = spec.window().coefficients(taps);

    let mut h: Vec<f64> = window
        .iter()
        .enumerate()
        .map(|(k, w)| {
            let m = k as f64 - center as f64;
            cutoff * sinc(cutoff * m) * w
        })
        .collect();

    if spec.filter_type() == FilterType::HighPass {
        for tap in h.iter_mut() {
            *tap = -*tap;
        }
        h[center] += 1.0;
    }

    // Gain at the band the filter is meant to pass: e^{-j·0·k} or e^{-jπ(k-center)}
    let gain: f64 = match spec.filter_type() {
        FilterType::LowPass => h.iter().sum(),
        FilterType::HighPass => h
            .iter()
            .enumerate()
            .map(|(k, &tap)| if (k + center).is_multiple_of(2) { tap } else { -tap })
            .sum(),
    };

    if !gain.is_finite() || gain.abs() < f64::EPSILON {
        return Err(FirError::InvalidSpec(format!(
            "{} design with {} taps at cutoff {} has no pass-band gain to normalize",
            spec.filter_type(),
            taps,
            cutoff
        )));
    }

    for tap in h.iter_mut() {
        *tap /= gain;
    }

    log::debug!(
        "Designed {} FIR: {} taps, cutoff {:.4} x Nyquist, {} window, pass-band gain {:.6} before scaling",
        spec.filter_type(),
        taps,
        cutoff,
        spec.window(),
        gain
    );

    Ok(CoefficientSet::new(h))
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}
