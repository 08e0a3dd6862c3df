pub mod decimate;
pub mod fir_core;
pub mod fir_design;
pub mod golden;
pub mod quantize;
pub mod software;
pub mod spectrogram;
pub mod window;

pub use decimate::decimate;
pub use fir_core::FirFilterCore;
pub use fir_design::{CoefficientSet, FilterSpec, FilterType, design_fir};
pub use golden::{
    GoldenOutput, GoldenReferenceEngine, Mismatch, VerificationReport, compare_outputs,
    required_accumulator_bits,
};
pub use quantize::{QuantizedSet, Quantizer, quantize, signed_range};
pub use software::{FilterResult, filter_signal};
pub use spectrogram::{Spectrogram, compute_spectrogram};
pub use window::Window;
