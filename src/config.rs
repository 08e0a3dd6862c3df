//! Configuration for the golden-reference pipeline.
//!
//! Every section has a `Default` matching the reference hardware workflow
//! (99-tap high-pass at 2.8 kHz, 16-bit coefficients, 32-bit data path).
//! A TOML file may override any subset of fields:
//!
//! ```toml
//! [filter]
//! taps = 63
//! cutoff = "3khz"
//!
//! [fixed_point]
//! coeff_bits = 12
//! input_scaling = { mode = "rescale", bits = 16 }
//!
//! [export]
//! output_dir = "hls/data"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COEFF_BITS, DEFAULT_CUTOFF_HZ, DEFAULT_DECIMATION_FACTOR, DEFAULT_INPUT_BITS,
    DEFAULT_MAX_HEAT, DEFAULT_OUTPUT_BITS, DEFAULT_SEGMENT_LEN, DEFAULT_TAPS,
};
use crate::error::{FirError, Result};
use crate::signal_processing::{FilterType, Window};

/// Filter cutoff frequency
///
/// Either an absolute frequency or a value already normalized to Nyquist.
///
/// # Parsing formats
/// - `2800hz` or `2800Hz` - frequency in Hz
/// - `2.8khz` or `2.8kHz` - frequency in kHz
/// - `0.127` - bare number below 1.0, normalized to Nyquist
/// - `2800` - bare number of 1.0 or more, frequency in Hz
///
/// # Example
/// ```
/// use goldenfir::config::CutoffFrequency;
///
/// let cutoff: CutoffFrequency = "2.8khz".parse().unwrap();
/// assert!((cutoff.normalized(44100) - 2800.0 / 22050.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CutoffRepr", into = "String")]
pub enum CutoffFrequency {
    Hz(f64),
    Normalized(f64),
}

impl CutoffFrequency {
    /// Cutoff as a fraction of Nyquist for the given sample rate
    pub fn normalized(&self, sample_rate: u32) -> f64 {
        match *self {
            CutoffFrequency::Hz(hz) => hz / (sample_rate as f64 / 2.0),
            CutoffFrequency::Normalized(c) => c,
        }
    }
}

impl Default for CutoffFrequency {
    fn default() -> Self {
        CutoffFrequency::Hz(DEFAULT_CUTOFF_HZ)
    }
}

impl fmt::Display for CutoffFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutoffFrequency::Hz(hz) => write!(f, "{}hz", hz),
            CutoffFrequency::Normalized(c) => write!(f, "{}", c),
        }
    }
}

impl From<CutoffFrequency> for String {
    fn from(cutoff: CutoffFrequency) -> Self {
        cutoff.to_string()
    }
}

impl FromStr for CutoffFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();

        let parse = |num: &str| -> std::result::Result<f64, String> {
            let value: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid cutoff: {}", s))?;
            if !value.is_finite() || value <= 0.0 {
                return Err("cutoff must be positive".to_string());
            }
            Ok(value)
        };

        if let Some(num) = lower.strip_suffix("khz") {
            return Ok(Self::Hz(parse(num)? * 1000.0));
        }
        if let Some(num) = lower.strip_suffix("hz") {
            return Ok(Self::Hz(parse(num)?));
        }

        let value = parse(&lower)?;
        if value < 1.0 {
            Ok(Self::Normalized(value))
        } else {
            Ok(Self::Hz(value))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CutoffRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<CutoffRepr> for CutoffFrequency {
    type Error = String;

    fn try_from(repr: CutoffRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            CutoffRepr::Number(n) => n.to_string().parse(),
            CutoffRepr::Text(s) => s.parse(),
        }
    }
}

/// How raw input samples enter the integer convolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum InputScaling {
    /// Samples are promoted unchanged into a `bits`-wide register (scale 1)
    PassThrough { bits: u32 },
    /// Samples are quantized with their own maximum-magnitude scale
    Rescale { bits: u32 },
}

impl InputScaling {
    pub fn bits(&self) -> u32 {
        match *self {
            InputScaling::PassThrough { bits } | InputScaling::Rescale { bits } => bits,
        }
    }
}

impl Default for InputScaling {
    fn default() -> Self {
        InputScaling::PassThrough {
            bits: DEFAULT_INPUT_BITS,
        }
    }
}

/// Conversion from the accumulator to the narrower output register
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputCast {
    /// Keep the low bits (two's-complement truncation)
    #[default]
    Wrap,
    /// Clamp to the output range
    Saturate,
    /// Fail with `OverflowDetected` when a value does not fit
    Checked,
}

/// Spectrogram heat-map clamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum HeatClamp {
    /// Clamp magnitudes to `[0, max]`
    Fixed { max: f64 },
    /// Clamp to `fraction` times the peak absolute (decimated) sample
    PeakFraction { fraction: f64 },
}

impl Default for HeatClamp {
    fn default() -> Self {
        HeatClamp::Fixed {
            max: DEFAULT_MAX_HEAT,
        }
    }
}

/// Complete pipeline configuration
///
/// # Example
/// ```
/// use goldenfir::config::PipelineConfig;
///
/// let mut config = PipelineConfig::default();
/// config.filter.taps = 63;
/// config.fixed_point.coeff_bits = 12;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source audio
    pub input: InputConfig,
    /// Windowed-sinc design parameters
    pub filter: FilterConfig,
    /// Integer widths of the golden path
    pub fixed_point: FixedPointConfig,
    /// Where artifacts are written
    pub export: ExportConfig,
    /// Diagnostic spectrogram parameters
    pub spectrogram: SpectrogramConfig,
    /// Non-fatal notice handling
    pub diagnostics: DiagnosticsConfig,
}

impl PipelineConfig {
    /// Parse a TOML document; missing sections and fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FirError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FirError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Source audio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Mono PCM WAV file to filter
    pub path: Option<PathBuf>,
}

/// Windowed-sinc design configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Number of taps (odd, at least 3)
    pub taps: usize,
    /// Cutoff, absolute or normalized to Nyquist
    pub cutoff: CutoffFrequency,
    /// Low-pass or high-pass
    pub filter_type: FilterType,
    /// Smoothing window
    pub window: Window,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            taps: DEFAULT_TAPS,
            cutoff: CutoffFrequency::default(),
            filter_type: FilterType::HighPass,
            window: Window::Hamming,
        }
    }
}

/// Integer widths of the golden path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedPointConfig {
    /// Coefficient width; the largest tap maps to `2^(bits-1) - 1`
    pub coeff_bits: u32,
    /// Input sample handling
    pub input_scaling: InputScaling,
    /// Accumulator width; `None` derives `coeff + input + ceil(log2(taps))`
    pub accumulator_bits: Option<u32>,
    /// Width of the golden output register
    pub output_bits: u32,
    /// Accumulator to output conversion
    pub output_cast: OutputCast,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            coeff_bits: DEFAULT_COEFF_BITS,
            input_scaling: InputScaling::default(),
            accumulator_bits: None,
            output_bits: DEFAULT_OUTPUT_BITS,
            output_cast: OutputCast::Wrap,
        }
    }
}

/// Artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory all artifacts are written to (created if missing)
    pub output_dir: PathBuf,
    /// Quantized input samples, one integer per line
    pub input_file: String,
    /// Quantized coefficients, one integer per line
    pub coeffs_file: String,
    /// Golden output, one integer per line
    pub golden_file: String,
    /// 16-bit WAV of the floating-point filter output
    pub filtered_wav: Option<String>,
    /// JSON run report
    pub report_file: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            input_file: "input.dat".to_string(),
            coeffs_file: "coeffs.dat".to_string(),
            golden_file: "golden_output.dat".to_string(),
            filtered_wav: Some("hpf_sw.wav".to_string()),
            report_file: None,
        }
    }
}

/// Diagnostic spectrogram configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramConfig {
    /// Write CSV spectrograms of the raw and filtered signals
    pub enabled: bool,
    /// Integer decimation before analysis (1 disables decimation)
    pub decimation_factor: usize,
    /// Samples per analysis segment
    pub segment_len: usize,
    /// Overlap between segments; `None` uses `segment_len / 8`
    pub overlap: Option<usize>,
    /// Analysis window
    pub window: Window,
    /// Magnitude clamp applied to the grid
    pub heat_clamp: HeatClamp,
    /// CSV file name for the unfiltered signal, inside the output directory
    pub raw_csv: String,
    /// CSV file name for the float-filtered signal, inside the output directory
    pub filtered_csv: String,
}

impl SpectrogramConfig {
    pub fn overlap(&self) -> usize {
        self.overlap.unwrap_or(self.segment_len / 8)
    }
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            decimation_factor: DEFAULT_DECIMATION_FACTOR,
            segment_len: DEFAULT_SEGMENT_LEN,
            overlap: None,
            window: Window::Hann,
            heat_clamp: HeatClamp::default(),
            raw_csv: "spectrogram_raw.csv".to_string(),
            filtered_csv: "spectrogram_filtered.csv".to_string(),
        }
    }
}

/// Handling of non-fatal numeric notices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Suppress warnings such as an undersized accumulator or clamped values
    pub quiet_numeric_notices: bool,
}
