//! Numeric constants shared by the design, quantization and export stages.
//!
//! Defaults mirror the reference hardware workflow: a 99-tap high-pass at
//! 2.8 kHz, 16-bit coefficients and a 32-bit data path.

/// Default number of FIR taps (odd for a Type I linear-phase design).
pub const DEFAULT_TAPS: usize = 99;

/// Default high-pass cutoff in Hz.
pub const DEFAULT_CUTOFF_HZ: f64 = 2800.0;

/// Default coefficient width; the largest tap maps to `2^15 - 1`.
pub const DEFAULT_COEFF_BITS: u32 = 16;

/// Default width the raw input samples are promoted to.
pub const DEFAULT_INPUT_BITS: u32 = 32;

/// Default width of the golden output register.
pub const DEFAULT_OUTPUT_BITS: u32 = 32;

/// Narrowest signed integer width accepted anywhere in the integer path.
pub const MIN_BITS: u32 = 2;

/// Widest quantized sequence element (stored as `i32`).
pub const MAX_QUANT_BITS: u32 = 32;

/// Widest accumulator / output register (evaluated in `i128`, stored as `i64`).
pub const MAX_ACCUMULATOR_BITS: u32 = 64;

/// Width of the diagnostic filtered WAV written from the float path.
pub const OUTPUT_WAV_BITS: u16 = 16;

/// Default spectrogram decimation factor.
pub const DEFAULT_DECIMATION_FACTOR: usize = 3;

/// Order of the anti-aliasing low-pass used before decimation.
pub const DECIMATION_FILTER_ORDER: u32 = 8;

/// Anti-aliasing cutoff as a fraction of the decimated Nyquist frequency.
pub const DECIMATION_CUTOFF_FRACTION: f64 = 0.8;

/// Default spectrogram heat-map clamp.
pub const DEFAULT_MAX_HEAT: f64 = 50.0;

/// Default spectrogram segment length in samples.
pub const DEFAULT_SEGMENT_LEN: usize = 256;

/// Tolerance used when checking coefficient symmetry.
pub const SYMMETRY_EPSILON: f64 = 1e-12;
