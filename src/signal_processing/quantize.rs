use crate::constants::{MAX_QUANT_BITS, MIN_BITS};
use crate::error::{FirError, Result};

/// Signed range `[-2^(bits-1), 2^(bits-1) - 1]` of a two's-complement width
pub fn signed_range(bits: u32) -> (i64, i64) {
    let max = i64::MAX >> (64 - bits);
    (-max - 1, max)
}

/// Fixed-width signed integers plus the scale that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedSet {
    values: Vec<i32>,
    bits: u32,
    scale: f64,
}

impl QuantizedSet {
    /// Promote integers into a `bits`-wide set unchanged (scale 1.0)
    ///
    /// # Errors
    /// `FirError::InvalidSpec` if `bits` is unsupported or any value does not
    /// fit the requested width.
    pub fn from_integers(values: Vec<i32>, bits: u32) -> Result<Self> {
        check_bits(bits)?;
        let (min, max) = signed_range(bits);
        if let Some((index, &v)) = values
            .iter()
            .enumerate()
            .find(|&(_, &v)| (v as i64) < min || (v as i64) > max)
        {
            return Err(FirError::InvalidSpec(format!(
                "sample {} at index {} does not fit in {} bits",
                v, index, bits
            )));
        }
        Ok(Self {
            values,
            bits,
            scale: 1.0,
        })
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<i32> {
        self.values
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Factor the real values were multiplied by before rounding
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Map back to reals by dividing out the scale
    pub fn dequantize(&self) -> Vec<f64> {
        self.values.iter().map(|&v| v as f64 / self.scale).collect()
    }
}

/// Maximum-magnitude fixed-point quantizer
///
/// The scale is chosen so that the element of largest magnitude lands on
/// `2^(W-1) - 1`. Rounding is half-away-from-zero.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    bits: u32,
    quiet: bool,
}

impl Quantizer {
    /// # Errors
    /// `FirError::InvalidSpec` unless `2 <= bits <= 32`.
    pub fn new(bits: u32) -> Result<Self> {
        check_bits(bits)?;
        Ok(Self { bits, quiet: false })
    }

    /// Silence the non-fatal clamping notice for this quantizer
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Quantize a real-valued sequence
    ///
    /// # Errors
    /// * `FirError::DegenerateInput` if the sequence is empty or all zeros
    /// * `FirError::InvalidSpec` if it contains NaN or infinity
    pub fn quantize(&self, values: &[f64]) -> Result<QuantizedSet> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FirError::InvalidSpec(format!(
                "non-finite value at index {}",
                index
            )));
        }

        let peak = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if peak == 0.0 {
            return Err(FirError::DegenerateInput(format!(
                "cannot derive a {}-bit scale from a sequence of {} zero values",
                self.bits,
                values.len()
            )));
        }

        let (min, max) = signed_range(self.bits);
        let scale = max as f64 / peak;

        let mut clamped = 0usize;
        let quantized = values
            .iter()
            .map(|&v| {
                // f64::round ties away from zero
                let r = (v * scale).round() as i64;
                if r < min || r > max {
                    clamped += 1;
                }
                r.clamp(min, max) as i32
            })
            .collect();

        if clamped > 0 && !self.quiet {
            log::warn!(
                "{} value(s) clamped to the {}-bit range after rounding",
                clamped,
                self.bits
            );
        }

        log::debug!(
            "Quantized {} values to {} bits: peak {:e}, scale {:e}",
            values.len(),
            self.bits,
            peak,
            scale
        );

        Ok(QuantizedSet {
            values: quantized,
            bits: self.bits,
            scale,
        })
    }

    /// Quantize integer samples with their own derived scale
    pub fn rescale(&self, samples: &[i32]) -> Result<QuantizedSet> {
        let reals: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        self.quantize(&reals)
    }
}

/// Shorthand for `Quantizer::new(bits)?.quantize(values)`
pub fn quantize(values: &[f64], bits: u32) -> Result<QuantizedSet> {
    Quantizer::new(bits)?.quantize(values)
}

fn check_bits(bits: u32) -> Result<()> {
    if !(MIN_BITS..=MAX_QUANT_BITS).contains(&bits) {
        return Err(FirError::InvalidSpec(format!(
            "quantization width must be between {} and {} bits, got {}",
            MIN_BITS, MAX_QUANT_BITS, bits
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_tap_lowpass_to_eight_bits() {
        let q = quantize(&[0.25, 0.5, 0.25], 8).unwrap();
        assert_eq!(q.scale(), 254.0);
        assert_eq!(q.values(), &[64, 127, 64]);
        assert_eq!(q.bits(), 8);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // peak 127 gives scale 1.0, so 2.5 sits exactly on the tie
        let q = quantize(&[127.0, 2.5, -2.5, -127.0], 8).unwrap();
        assert_eq!(q.values(), &[127, 3, -3, -127]);
    }

    #[test]
    fn test_idempotent_on_full_scale_integers() {
        let original = [64, 127, 64, -127, 0, -3];
        let reals: Vec<f64> = original.iter().map(|&v| v as f64).collect();
        let q = quantize(&reals, 8).unwrap();
        assert_eq!(q.scale(), 1.0);
        assert_eq!(q.values(), &original);

        let again = quantize(&q.dequantize(), 8).unwrap();
        assert_eq!(again.values(), q.values());
    }

    #[test]
    fn test_never_leaves_range() {
        for bits in [2, 3, 8, 16, 24, 32] {
            let (min, max) = signed_range(bits);
            let values: Vec<f64> = (0..200)
                .map(|i| ((i as f64) * 0.37).sin() * 1e3 - 1e-3 * i as f64)
                .collect();
            let q = quantize(&values, bits).unwrap();
            assert!(
                q.values()
                    .iter()
                    .all(|&v| (v as i64) >= min && (v as i64) <= max)
            );
            assert!(q.values().iter().any(|&v| (v as i64).abs() == max));
        }
    }

    #[test]
    fn test_all_zero_is_degenerate() {
        let result = quantize(&[0.0, 0.0, -0.0], 16);
        assert!(matches!(result, Err(FirError::DegenerateInput(_))));
        assert!(matches!(quantize(&[], 16), Err(FirError::DegenerateInput(_))));
    }

    #[test]
    fn test_rejects_non_finite() {
        let result = quantize(&[1.0, f64::NAN], 16);
        assert!(matches!(result, Err(FirError::InvalidSpec(_))));
    }

    #[test]
    fn test_rejects_bad_width() {
        assert!(matches!(Quantizer::new(1), Err(FirError::InvalidSpec(_))));
        assert!(matches!(Quantizer::new(33), Err(FirError::InvalidSpec(_))));
    }

    #[test]
    fn test_rescale_integers() {
        let q = Quantizer::new(16).unwrap().rescale(&[1, -2, 0]).unwrap();
        assert_eq!(q.scale(), 16383.5);
        assert_eq!(q.values(), &[16384, -32767, 0]);
    }

    #[test]
    fn test_from_integers_pass_through() {
        let q = QuantizedSet::from_integers(vec![32767, -32768, 5], 16).unwrap();
        assert_eq!(q.scale(), 1.0);
        assert_eq!(q.values(), &[32767, -32768, 5]);

        let too_wide = QuantizedSet::from_integers(vec![40000], 16);
        assert!(matches!(too_wide, Err(FirError::InvalidSpec(_))));
    }
}
