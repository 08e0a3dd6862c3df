use crate::error::{FirError, Result};

/// Mono integer PCM samples with their sampling rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSignal {
    samples: Vec<i32>,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl AudioSignal {
    /// # Errors
    /// `FirError::InvalidSpec` if `sample_rate` is zero or `bits_per_sample`
    /// is not in 1..=32.
    pub fn new(samples: Vec<i32>, sample_rate: u32, bits_per_sample: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(FirError::InvalidSpec(
                "sample rate must be positive".to_string(),
            ));
        }
        if !(1..=32).contains(&bits_per_sample) {
            return Err(FirError::InvalidSpec(format!(
                "unsupported sample width: {} bits",
                bits_per_sample
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            bits_per_sample,
        })
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    /// Sampling rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Width of the PCM container the samples came from
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn nyquist_hz(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.samples.iter().map(|&s| s as f64).collect()
    }
}
