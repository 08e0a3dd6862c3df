use crate::config::{FixedPointConfig, OutputCast};
use crate::constants::{MAX_ACCUMULATOR_BITS, MIN_BITS};
use crate::error::{FirError, Result};
use crate::signal_processing::QuantizedSet;
use crate::signal_processing::quantize::signed_range;

/// Accumulator width that can hold any `taps`-term sum of products without
/// overflow: `coeff_bits + input_bits + ceil(log2(taps))`
pub fn required_accumulator_bits(coeff_bits: u32, input_bits: u32, taps: usize) -> u32 {
    let growth = if taps <= 1 {
        0
    } else {
        usize::BITS - (taps - 1).leading_zeros()
    };
    coeff_bits + input_bits + growth
}

/// Integer filter output that hardware must reproduce exactly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenOutput {
    values: Vec<i64>,
    bits: u32,
    accumulator_bits: u32,
}

impl GoldenOutput {
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<i64> {
        self.values
    }

    /// Output register width
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Accumulator width the output was computed with
    pub fn accumulator_bits(&self) -> u32 {
        self.accumulator_bits
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bit-exact integer FIR model
///
/// Evaluates `y[n] = Σ h[k]·x[n-k]` (zero history, `k` ascending) with no
/// floating-point arithmetic. Every partial sum is checked against the signed
/// accumulator range; the final sum is then narrowed to the output width.
#[derive(Debug, Clone)]
pub struct GoldenReferenceEngine {
    accumulator_bits: Option<u32>,
    output_bits: u32,
    output_cast: OutputCast,
    quiet: bool,
}

impl GoldenReferenceEngine {
    pub fn new(config: &FixedPointConfig) -> Self {
        Self {
            accumulator_bits: config.accumulator_bits,
            output_bits: config.output_bits,
            output_cast: config.output_cast,
            quiet: false,
        }
    }

    /// Silence the undersized-accumulator and narrowed-output notices
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Check the configured widths for operands of the given shape and return
    /// the accumulator width [`run`](Self::run) will use
    ///
    /// # Errors
    /// `FirError::InvalidSpec` if the output or configured accumulator width
    /// is unsupported, or if no accumulator width is configured and the
    /// derived one exceeds 64 bits.
    pub fn accumulator_bits_for(
        &self,
        coeff_bits: u32,
        input_bits: u32,
        taps: usize,
    ) -> Result<u32> {
        check_width("output", self.output_bits)?;
        let bits = match self.accumulator_bits {
            Some(bits) => bits,
            None => {
                let required = required_accumulator_bits(coeff_bits, input_bits, taps);
                if required > MAX_ACCUMULATOR_BITS {
                    return Err(FirError::InvalidSpec(format!(
                        "{} taps of {}x{}-bit products need a {}-bit accumulator; configure one of at most {} bits",
                        taps, coeff_bits, input_bits, required, MAX_ACCUMULATOR_BITS
                    )));
                }
                required
            }
        };
        check_width("accumulator", bits)?;
        Ok(bits)
    }

    /// Run the integer filter
    ///
    /// # Errors
    /// * `FirError::InvalidSpec` for an empty coefficient set or an
    ///   unsupported accumulator/output width
    /// * `FirError::OverflowDetected` if a partial sum leaves the accumulator
    ///   range, or a final value does not fit the output with
    ///   [`OutputCast::Checked`]
    pub fn run(&self, coeffs: &QuantizedSet, input: &QuantizedSet) -> Result<GoldenOutput> {
        if coeffs.is_empty() {
            return Err(FirError::InvalidSpec(
                "golden reference needs at least one coefficient".to_string(),
            ));
        }

        let acc_bits = self.accumulator_bits_for(coeffs.bits(), input.bits(), coeffs.len())?;

        let required = required_accumulator_bits(coeffs.bits(), input.bits(), coeffs.len());
        if acc_bits < required && !self.quiet {
            log::warn!(
                "{}-bit accumulator is narrower than the {} bits needed for {} taps of {}x{}-bit products",
                acc_bits,
                required,
                coeffs.len(),
                coeffs.bits(),
                input.bits()
            );
        }

        let (acc_min, acc_max) = signed_range(acc_bits);
        let (acc_min, acc_max) = (acc_min as i128, acc_max as i128);

        let h = coeffs.values();
        let x = input.values();

        let mut values = Vec::with_capacity(x.len());
        let mut narrowed = 0usize;
        for n in 0..x.len() {
            let mut acc: i128 = 0;
            for (k, &tap) in h.iter().enumerate().take(n + 1) {
                acc += tap as i128 * x[n - k] as i128;
                if acc < acc_min || acc > acc_max {
                    return Err(FirError::OverflowDetected {
                        index: n,
                        bits: acc_bits,
                    });
                }
            }
            let value = self.narrow(acc, n)?;
            if value as i128 != acc {
                narrowed += 1;
            }
            values.push(value);
        }

        if narrowed > 0 && !self.quiet {
            log::warn!(
                "{} output value(s) did not fit {} bits and were altered by the {:?} cast",
                narrowed,
                self.output_bits,
                self.output_cast
            );
        }

        log::info!(
            "Golden reference: {} samples x {} taps, {}-bit accumulator, {}-bit output ({:?})",
            x.len(),
            h.len(),
            acc_bits,
            self.output_bits,
            self.output_cast
        );

        Ok(GoldenOutput {
            values,
            bits: self.output_bits,
            accumulator_bits: acc_bits,
        })
    }

    fn narrow(&self, acc: i128, index: usize) -> Result<i64> {
        let (min, max) = signed_range(self.output_bits);
        let (min, max) = (min as i128, max as i128);

        let value = match self.output_cast {
            OutputCast::Wrap => {
                let shift = 128 - self.output_bits;
                (acc << shift) >> shift
            }
            OutputCast::Saturate => acc.clamp(min, max),
            OutputCast::Checked => {
                if acc < min || acc > max {
                    return Err(FirError::OverflowDetected {
                        index,
                        bits: self.output_bits,
                    });
                }
                acc
            }
        };
        Ok(value as i64)
    }
}

fn check_width(what: &str, bits: u32) -> Result<()> {
    if !(MIN_BITS..=MAX_ACCUMULATOR_BITS).contains(&bits) {
        return Err(FirError::InvalidSpec(format!(
            "{} width must be between {} and {} bits, got {}",
            what, MIN_BITS, MAX_ACCUMULATOR_BITS, bits
        )));
    }
    Ok(())
}

/// First element where a compared output differs from the golden output
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Mismatch {
    pub index: usize,
    pub actual: i64,
    pub expected: i64,
}

/// Element-by-element comparison against the golden output
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VerificationReport {
    /// Number of element pairs compared (the shorter length)
    pub compared: usize,
    /// Pairs whose absolute difference exceeds the tolerance
    pub mismatches: usize,
    pub first_mismatch: Option<Mismatch>,
    pub max_abs_error: u64,
    /// `(actual_len, golden_len)` when the lengths differ
    pub length_mismatch: Option<(usize, usize)>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.mismatches == 0 && self.length_mismatch.is_none()
    }
}

/// Compare `actual` against `golden`
///
/// A tolerance of 0 is the bit-exact contract; a wider band is accepted for
/// test benches that allow small deviations.
pub fn compare_outputs(actual: &[i64], golden: &[i64], tolerance: u64) -> VerificationReport {
    let mut mismatches = 0;
    let mut first_mismatch = None;
    let mut max_abs_error = 0u64;

    for (index, (&a, &e)) in actual.iter().zip(golden.iter()).enumerate() {
        let error = (a as i128 - e as i128).unsigned_abs().min(u64::MAX as u128) as u64;
        max_abs_error = max_abs_error.max(error);
        if error > tolerance {
            mismatches += 1;
            first_mismatch.get_or_insert(Mismatch {
                index,
                actual: a,
                expected: e,
            });
        }
    }

    let length_mismatch = (actual.len() != golden.len()).then_some((actual.len(), golden.len()));

    VerificationReport {
        compared: actual.len().min(golden.len()),
        mismatches,
        first_mismatch,
        max_abs_error,
        length_mismatch,
    }
}
