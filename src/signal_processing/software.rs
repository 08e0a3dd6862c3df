use std::time::{Duration, Instant};

use crate::signal_processing::{CoefficientSet, FirFilterCore};

/// Output of the floating-point filter path
#[derive(Debug, Clone)]
pub struct FilterResult {
    /// Filtered samples, same length as the input
    pub samples: Vec<f64>,
    /// Wall-clock time spent in the convolution
    pub elapsed: Duration,
}

/// Apply `coeffs` to `samples` with causal, zero-history convolution in `f64`
///
/// This is the diagnostic path: its output is for listening and as a timing
/// baseline, and is not expected to match the integer golden output.
pub fn filter_signal(coeffs: &CoefficientSet, samples: &[i32]) -> FilterResult {
    let mut core = FirFilterCore::new(coeffs.taps().to_vec());

    let start = Instant::now();
    let filtered = core.process_all(samples.iter().map(|&s| s as f64));
    let elapsed = start.elapsed();

    log::info!(
        "Software filter: {} samples x {} taps in {:.6} s",
        samples.len(),
        core.num_taps(),
        elapsed.as_secs_f64()
    );

    FilterResult {
        samples: filtered,
        elapsed,
    }
}
