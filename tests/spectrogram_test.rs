mod test_signals;

use std::fs;

use goldenfir::GoldenPipeline;
use goldenfir::audio::AudioSignal;
use goldenfir::config::{HeatClamp, PipelineConfig, SpectrogramConfig};
use goldenfir::signal_processing::{Spectrogram, compute_spectrogram, decimate};

use test_signals::generate_mixture;

const SAMPLE_RATE: u32 = 44100;

fn band_peak(s: &Spectrogram, segment: usize, low_hz: f64, high_hz: f64) -> f64 {
    s.frequencies
        .iter()
        .zip(&s.magnitudes)
        .filter(|&(&f, _)| f >= low_hz && f <= high_hz)
        .map(|(_, row)| row[segment])
        .fold(0.0, f64::max)
}

fn unclamped() -> SpectrogramConfig {
    SpectrogramConfig {
        heat_clamp: HeatClamp::PeakFraction { fraction: 1.0 },
        ..SpectrogramConfig::default()
    }
}

#[test]
fn test_filtered_spectrogram_loses_rumble() {
    let samples = generate_mixture(&[(200.0, 4000.0), (5000.0, 4000.0)], SAMPLE_RATE, 44100);
    let signal = AudioSignal::new(samples, SAMPLE_RATE, 16).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::default();
    config.export.output_dir = dir.path().to_path_buf();
    config.export.filtered_wav = None;
    let run = GoldenPipeline::new(config).run_signal(&signal).unwrap();

    let raw = compute_spectrogram(&signal.to_f64(), SAMPLE_RATE, &unclamped()).unwrap();
    let filtered = compute_spectrogram(&run.filtered.samples, SAMPLE_RATE, &unclamped()).unwrap();
    assert_eq!(raw.sample_rate, 14700);
    let mid = raw.times.len() / 2;

    let raw_low = band_peak(&raw, mid, 100.0, 300.0);
    let raw_high = band_peak(&raw, mid, 4900.0, 5100.0);
    assert!(raw_low > 0.5 * raw_high, "raw {} vs {}", raw_low, raw_high);

    let low = band_peak(&filtered, mid, 100.0, 300.0);
    let high = band_peak(&filtered, mid, 4900.0, 5100.0);
    assert!(low < 0.01 * high, "filtered {} vs {}", low, high);
}

#[test]
fn test_default_clamp_saturates_loud_signal() {
    let samples: Vec<f64> = generate_mixture(&[(1000.0, 20000.0)], SAMPLE_RATE, 8820)
        .into_iter()
        .map(f64::from)
        .collect();
    let s = compute_spectrogram(&samples, SAMPLE_RATE, &SpectrogramConfig::default()).unwrap();
    assert_eq!(s.peak(), 50.0);
}

#[test]
fn test_decimated_tone_survives() {
    let samples: Vec<f64> = generate_mixture(&[(1000.0, 1000.0)], SAMPLE_RATE, 9000)
        .into_iter()
        .map(f64::from)
        .collect();
    let (decimated, rate) = decimate(&samples, 3, SAMPLE_RATE).unwrap();
    assert_eq!(rate, 14700);
    assert_eq!(decimated.len(), 3000);

    let peak = decimated[500..2500]
        .iter()
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    assert!((peak - 1000.0).abs() < 20.0, "peak {}", peak);
}

#[test]
fn test_pipeline_writes_spectrogram_csvs() {
    let samples = generate_mixture(&[(200.0, 4000.0), (5000.0, 4000.0)], SAMPLE_RATE, 6000);
    let signal = AudioSignal::new(samples, SAMPLE_RATE, 16).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::default();
    config.export.output_dir = dir.path().to_path_buf();
    config.spectrogram.enabled = true;
    let run = GoldenPipeline::new(config).run_signal(&signal).unwrap();

    assert_eq!(
        run.report.spectrograms,
        vec![
            dir.path().join("spectrogram_raw.csv"),
            dir.path().join("spectrogram_filtered.csv")
        ]
    );
    let csv = fs::read_to_string(dir.path().join("spectrogram_filtered.csv")).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("frequency_hz,"));
    assert_eq!(lines.count(), 129);
}
