//! End-to-end golden-reference run.
//!
//! One [`GoldenPipeline`] drives every stage from a [`PipelineConfig`]:
//! design, the timed floating-point filter, quantization, the integer golden
//! model, the test-bench export and the optional diagnostic spectrograms.
//! Every stage result is kept in [`PipelineRun`]; [`PipelineReport`] is its
//! serializable summary.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rolling_stats::Stats;
use serde::Serialize;

use crate::audio::{AudioSignal, read_wav};
use crate::config::{InputScaling, OutputCast, PipelineConfig};
use crate::constants::SYMMETRY_EPSILON;
use crate::error::{FirError, Result};
use crate::export::{ExportPaths, export_golden_data};
use crate::signal_processing::{
    CoefficientSet, FilterResult, FilterSpec, FilterType, GoldenOutput, GoldenReferenceEngine,
    QuantizedSet, Quantizer, Spectrogram, Window, compute_spectrogram, design_fir, filter_signal,
    required_accumulator_bits,
};
use crate::wav::{normalize_to_i16, write_wav_i16};

/// Summary statistics of a sample sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl StatsSummary {
    /// `None` for an empty sequence
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut stats: Stats<f64> = Stats::new();
        for v in values {
            stats.update(v);
        }
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub taps: usize,
    /// Cutoff normalized to Nyquist
    pub cutoff: f64,
    pub cutoff_hz: f64,
    pub filter_type: FilterType,
    pub window: Window,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixedPointSummary {
    pub coeff_bits: u32,
    pub coeff_scale: f64,
    /// Largest absolute coefficient error introduced by quantization
    pub coeff_max_error: f64,
    pub input_bits: u32,
    pub input_scale: f64,
    pub input_scaling: InputScaling,
    pub accumulator_bits: u32,
    pub required_accumulator_bits: u32,
    pub output_bits: u32,
    pub output_cast: OutputCast,
}

/// Serializable record of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// RFC 3339 UTC timestamp
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub filter: FilterSummary,
    pub fixed_point: FixedPointSummary,
    pub software_filter_secs: f64,
    pub input_stats: Option<StatsSummary>,
    pub golden_stats: Option<StatsSummary>,
    pub exported: ExportPaths,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_wav: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spectrograms: Vec<PathBuf>,
}

impl PipelineReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).map_err(std::io::Error::from)?)
    }

    /// Write the report as pretty JSON to `path`
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// Every intermediate result of a run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub coefficients: CoefficientSet,
    pub filtered: FilterResult,
    pub quantized_coeffs: QuantizedSet,
    pub quantized_input: QuantizedSet,
    pub golden: GoldenOutput,
    pub report: PipelineReport,
}

pub struct GoldenPipeline {
    config: PipelineConfig,
}

impl GoldenPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build and validate the filter spec for a given sample rate
    pub fn filter_spec(&self, sample_rate: u32) -> Result<FilterSpec> {
        let filter = &self.config.filter;
        FilterSpec::new(
            filter.taps,
            filter.cutoff.normalized(sample_rate),
            filter.filter_type,
            filter.window,
        )
    }

    /// Load `input.path` and run every stage
    pub fn run(&self) -> Result<PipelineRun> {
        let path = self
            .config
            .input
            .path
            .as_deref()
            .ok_or_else(|| FirError::Config("no input file configured".to_string()))?;
        let signal = read_wav(path)?;
        let mut run = self.run_signal(&signal)?;
        run.report.source = Some(path.to_path_buf());
        Ok(run)
    }

    /// Run every stage on an already loaded signal
    ///
    /// Parameters and input widths are validated before any numeric work, and
    /// nothing is written until every stage has succeeded.
    pub fn run_signal(&self, signal: &AudioSignal) -> Result<PipelineRun> {
        let fixed = &self.config.fixed_point;
        let export = &self.config.export;
        let quiet = self.config.diagnostics.quiet_numeric_notices;

        let spec = self.filter_spec(signal.sample_rate())?;
        let coeff_quantizer = Quantizer::new(fixed.coeff_bits)?.quiet(quiet);
        let input_quantizer = Quantizer::new(fixed.input_scaling.bits())?.quiet(quiet);
        let engine = GoldenReferenceEngine::new(fixed).quiet(quiet);
        let accumulator_bits = engine.accumulator_bits_for(
            coeff_quantizer.bits(),
            input_quantizer.bits(),
            spec.taps(),
        )?;
        let quantized_input = scale_input(signal, fixed.input_scaling, &input_quantizer)?;
        log::debug!(
            "Input: {} samples in {} bits (scale {:.3}), {}-bit accumulator",
            quantized_input.len(),
            quantized_input.bits(),
            quantized_input.scale(),
            accumulator_bits
        );

        log::info!(
            "Designing {}-tap {} filter, cutoff {:.4} x Nyquist ({:.1} Hz), {} window",
            spec.taps(),
            spec.filter_type(),
            spec.cutoff(),
            spec.cutoff() * signal.nyquist_hz(),
            spec.window()
        );
        let coefficients = design_fir(&spec)?;
        log::debug!(
            "Designed {} taps, group delay {} samples, symmetric: {}",
            coefficients.len(),
            coefficients.group_delay_samples(),
            coefficients.is_symmetric(SYMMETRY_EPSILON)
        );

        log::info!(
            "Filtering {} samples ({:.3} s at {} Hz)",
            signal.len(),
            signal.duration_secs(),
            signal.sample_rate()
        );
        let filtered = filter_signal(&coefficients, signal.samples());
        let normalized = match &export.filtered_wav {
            Some(_) => Some(normalize_to_i16(&filtered.samples)?),
            None => None,
        };

        let quantized_coeffs = coeff_quantizer.quantize(coefficients.taps())?;
        let coeff_error = max_quantization_error(coefficients.taps(), &quantized_coeffs);
        log::info!(
            "Coefficients quantized to {} bits (scale {:.3}, max error {:.3e})",
            quantized_coeffs.bits(),
            quantized_coeffs.scale(),
            coeff_error
        );

        let golden = engine.run(&quantized_coeffs, &quantized_input)?;

        let spectrograms = if self.config.spectrogram.enabled {
            self.compute_spectrograms(signal, &filtered)?
        } else {
            Vec::new()
        };

        fs::create_dir_all(&export.output_dir)?;
        let filtered_wav = match (&export.filtered_wav, &normalized) {
            (Some(name), Some(normalized)) => {
                let path = export.output_dir.join(name);
                write_wav_i16(&path, normalized, signal.sample_rate())?;
                Some(path)
            }
            _ => None,
        };

        let exported = export_golden_data(
            export,
            quantized_input.values(),
            quantized_coeffs.values(),
            golden.values(),
        )?;

        let mut spectrogram_paths = Vec::with_capacity(spectrograms.len());
        for (path, spectrogram) in &spectrograms {
            let mut writer = BufWriter::new(File::create(path)?);
            spectrogram.write_csv(&mut writer)?;
            writer.flush()?;
            log::info!(
                "Wrote spectrogram {} ({} bins x {} segments at {} Hz, peak {:.1})",
                path.display(),
                spectrogram.frequencies.len(),
                spectrogram.times.len(),
                spectrogram.sample_rate,
                spectrogram.peak()
            );
            spectrogram_paths.push(path.clone());
        }

        let report = PipelineReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: None,
            sample_rate: signal.sample_rate(),
            sample_count: signal.len(),
            filter: FilterSummary {
                taps: spec.taps(),
                cutoff: spec.cutoff(),
                cutoff_hz: spec.cutoff() * signal.nyquist_hz(),
                filter_type: spec.filter_type(),
                window: spec.window(),
            },
            fixed_point: FixedPointSummary {
                coeff_bits: quantized_coeffs.bits(),
                coeff_scale: quantized_coeffs.scale(),
                coeff_max_error: coeff_error,
                input_bits: quantized_input.bits(),
                input_scale: quantized_input.scale(),
                input_scaling: fixed.input_scaling,
                accumulator_bits: golden.accumulator_bits(),
                required_accumulator_bits: required_accumulator_bits(
                    quantized_coeffs.bits(),
                    quantized_input.bits(),
                    quantized_coeffs.len(),
                ),
                output_bits: golden.bits(),
                output_cast: fixed.output_cast,
            },
            software_filter_secs: filtered.elapsed.as_secs_f64(),
            input_stats: StatsSummary::from_values(
                quantized_input.values().iter().map(|&v| v as f64),
            ),
            golden_stats: StatsSummary::from_values(golden.values().iter().map(|&v| v as f64)),
            exported,
            filtered_wav,
            spectrograms: spectrogram_paths,
        };

        if let Some(name) = &export.report_file {
            let path = export.output_dir.join(name);
            report.write_json(&path)?;
            log::info!("Wrote run report {}", path.display());
        }

        Ok(PipelineRun {
            coefficients,
            filtered,
            quantized_coeffs,
            quantized_input,
            golden,
            report,
        })
    }

    fn compute_spectrograms(
        &self,
        signal: &AudioSignal,
        filtered: &FilterResult,
    ) -> Result<Vec<(PathBuf, Spectrogram)>> {
        let config = &self.config.spectrogram;
        let dir = &self.config.export.output_dir;

        let raw = signal.to_f64();
        let jobs = [
            (&raw, dir.join(&config.raw_csv)),
            (&filtered.samples, dir.join(&config.filtered_csv)),
        ];

        let mut computed = Vec::with_capacity(jobs.len());
        for (samples, path) in jobs {
            let spectrogram = compute_spectrogram(samples, signal.sample_rate(), config)?;
            computed.push((path, spectrogram));
        }
        Ok(computed)
    }
}

/// Largest `|h - q/scale|` over the coefficient set
fn max_quantization_error(taps: &[f64], quantized: &QuantizedSet) -> f64 {
    taps.iter()
        .zip(quantized.dequantize())
        .fold(0.0f64, |acc, (&h, q)| acc.max((h - q).abs()))
}

fn scale_input(
    signal: &AudioSignal,
    scaling: InputScaling,
    quantizer: &Quantizer,
) -> Result<QuantizedSet> {
    match scaling {
        InputScaling::PassThrough { bits } => {
            QuantizedSet::from_integers(signal.samples().to_vec(), bits)
        }
        InputScaling::Rescale { .. } => quantizer.rescale(signal.samples()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CutoffFrequency;
    use crate::export::read_integer_lines;

    fn tone(freq: f64, sample_rate: u32, len: usize, amplitude: f64) -> Vec<i32> {
        (0..len)
            .map(|n| {
                let t = n as f64 / sample_rate as f64;
                (amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()).round() as i32
            })
            .collect()
    }

    fn config_in(dir: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.export.output_dir = dir.to_path_buf();
        config.filter.taps = 31;
        config
    }

    #[test]
    fn test_stats_summary() {
        assert!(StatsSummary::from_values(Vec::new()).is_none());
        let summary = StatsSummary::from_values([1.0, 2.0, 3.0]).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 2.0).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
    }

    #[test]
    fn test_run_signal_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = GoldenPipeline::new(config_in(dir.path()));
        let signal = AudioSignal::new(tone(5000.0, 44100, 400, 8000.0), 44100, 16).unwrap();

        let run = pipeline.run_signal(&signal).unwrap();

        assert_eq!(run.coefficients.len(), 31);
        assert_eq!(run.filtered.samples.len(), 400);
        assert_eq!(run.golden.len(), 400);
        assert_eq!(run.quantized_input.values(), signal.samples());
        assert_eq!(
            read_integer_lines(&run.report.exported.golden).unwrap(),
            run.golden.values()
        );
        assert_eq!(
            read_integer_lines(&run.report.exported.coeffs).unwrap().len(),
            31
        );
        assert!(dir.path().join("hpf_sw.wav").exists());
        assert!(run.report.spectrograms.is_empty());
    }

    #[test]
    fn test_invalid_taps_fail_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir.path().join("out"));
        config.filter.taps = 4;
        let signal = AudioSignal::new(vec![1, 2, 3], 8000, 16).unwrap();

        let result = GoldenPipeline::new(config).run_signal(&signal);
        assert!(matches!(result, Err(FirError::InvalidSpec(_))));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_bad_widths_fail_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let signal = AudioSignal::new(vec![2500, -2500, 1200, 0], 8000, 16).unwrap();

        let mut narrow_output = config_in(&out);
        narrow_output.fixed_point.output_bits = 1;

        let mut narrow_input = config_in(&out);
        narrow_input.fixed_point.input_scaling = InputScaling::PassThrough { bits: 8 };

        let mut wide_accumulator = config_in(&out);
        wide_accumulator.fixed_point.accumulator_bits = Some(65);

        // 32 + 32 + ceil(log2 31) = 69 bits with nothing configured
        let mut derived_too_wide = config_in(&out);
        derived_too_wide.fixed_point.coeff_bits = 32;

        for config in [narrow_output, narrow_input, wide_accumulator, derived_too_wide] {
            let result = GoldenPipeline::new(config).run_signal(&signal);
            assert!(matches!(result, Err(FirError::InvalidSpec(_))), "{:?}", result.err());
            assert!(!out.exists());
        }
    }

    #[test]
    fn test_failed_run_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let signal = AudioSignal::new(tone(5000.0, 44100, 400, 8000.0), 44100, 16).unwrap();

        let mut overflow = config_in(&out);
        overflow.fixed_point.accumulator_bits = Some(20);
        overflow.diagnostics.quiet_numeric_notices = true;
        let result = GoldenPipeline::new(overflow).run_signal(&signal);
        assert!(matches!(result, Err(FirError::OverflowDetected { bits: 20, .. })));
        assert!(!out.exists());

        let mut silent = config_in(&out);
        silent.fixed_point.input_scaling = InputScaling::Rescale { bits: 16 };
        let silence = AudioSignal::new(vec![0; 64], 44100, 16).unwrap();
        let result = GoldenPipeline::new(silent).run_signal(&silence);
        assert!(matches!(result, Err(FirError::DegenerateInput(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_coefficient_error_within_half_step() {
        let dir = tempfile::tempdir().unwrap();
        let signal = AudioSignal::new(tone(5000.0, 44100, 200, 8000.0), 44100, 16).unwrap();
        let run = GoldenPipeline::new(config_in(dir.path()))
            .run_signal(&signal)
            .unwrap();

        let fixed = &run.report.fixed_point;
        assert!(fixed.coeff_max_error > 0.0);
        assert!(fixed.coeff_max_error <= 0.5 / fixed.coeff_scale + 1e-15);
    }

    #[test]
    fn test_cutoff_above_nyquist_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.filter.cutoff = CutoffFrequency::Hz(5000.0);
        let signal = AudioSignal::new(vec![1, 2, 3], 8000, 16).unwrap();

        let result = GoldenPipeline::new(config).run_signal(&signal);
        assert!(matches!(result, Err(FirError::InvalidSpec(_))));
    }

    #[test]
    fn test_rescaled_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.fixed_point.input_scaling = InputScaling::Rescale { bits: 16 };
        let signal = AudioSignal::new(vec![1, -2, 0, 2], 8000, 16).unwrap();

        let run = GoldenPipeline::new(config).run_signal(&signal).unwrap();
        assert_eq!(run.quantized_input.values(), &[16384, -32767, 0, 32767]);
        assert_eq!(run.report.fixed_point.input_bits, 16);
        assert_eq!(run.report.fixed_point.accumulator_bits, 37);
    }

    #[test]
    fn test_report_and_spectrograms() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.export.report_file = Some("report.json".to_string());
        config.spectrogram.enabled = true;
        let signal = AudioSignal::new(tone(6000.0, 44100, 3000, 8000.0), 44100, 16).unwrap();

        let run = GoldenPipeline::new(config).run_signal(&signal).unwrap();

        assert_eq!(run.report.spectrograms.len(), 2);
        for path in &run.report.spectrograms {
            assert!(path.exists());
        }

        let json = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["filter"]["taps"], 31);
        assert_eq!(value["filter"]["filter_type"], "high-pass");
        assert_eq!(value["fixed_point"]["output_cast"], "wrap");
        assert_eq!(value["fixed_point"]["input_scaling"]["mode"], "pass-through");
        assert_eq!(value["sample_count"], 3000);
    }

    #[test]
    fn test_run_without_input_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = GoldenPipeline::new(config_in(dir.path())).run();
        assert!(matches!(result, Err(FirError::Config(_))));
    }
}
