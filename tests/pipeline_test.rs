mod test_signals;

use std::fs;

use goldenfir::audio::read_wav;
use goldenfir::config::{CutoffFrequency, OutputCast, PipelineConfig};
use goldenfir::export::read_integer_lines;
use goldenfir::{FirError, GoldenPipeline};

use test_signals::{generate_mixture, rms, save_mono_wav};

const SAMPLE_RATE: u32 = 44100;

fn bench_config(dir: &std::path::Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.input.path = Some(dir.join("birds.wav"));
    config.export.output_dir = dir.join("out");
    config
}

fn write_input(dir: &std::path::Path, num_samples: usize) -> Vec<i32> {
    // 200 Hz rumble plus an 8 kHz chirp-like tone
    let samples = generate_mixture(&[(200.0, 4000.0), (8000.0, 4000.0)], SAMPLE_RATE, num_samples);
    save_mono_wav(dir.join("birds.wav"), &samples, SAMPLE_RATE).unwrap();
    samples
}

#[test]
fn test_highpass_removes_rumble() {
    let dir = tempfile::tempdir().unwrap();
    write_input(dir.path(), 4410);

    let run = GoldenPipeline::new(bench_config(dir.path())).run().unwrap();

    // Skip the start-up transient of the 99-tap filter
    let steady = &run.filtered.samples[200..];
    let expected = 4000.0 / 2f64.sqrt();
    let measured = rms(steady);
    assert!(
        (measured - expected).abs() / expected < 0.05,
        "rms {} expected {}",
        measured,
        expected
    );
}

#[test]
fn test_exported_files_match_run() {
    let dir = tempfile::tempdir().unwrap();
    let samples = write_input(dir.path(), 2000);

    let run = GoldenPipeline::new(bench_config(dir.path())).run().unwrap();
    let out = dir.path().join("out");

    let input = read_integer_lines(out.join("input.dat")).unwrap();
    let coeffs = read_integer_lines(out.join("coeffs.dat")).unwrap();
    let golden = read_integer_lines(out.join("golden_output.dat")).unwrap();

    assert_eq!(input.len(), samples.len());
    assert!(input.iter().zip(&samples).all(|(&a, &b)| a == b as i64));
    assert_eq!(coeffs.len(), 99);
    assert!(coeffs.iter().all(|&c| (-32768..=32767).contains(&c)));
    assert_eq!(coeffs.iter().map(|c| c.abs()).max(), Some(32767));
    assert_eq!(golden, run.golden.values());

    // No header, one integer per line, trailing newline
    let text = fs::read_to_string(out.join("coeffs.dat")).unwrap();
    assert_eq!(text.lines().count(), 99);
    assert!(text.ends_with('\n'));
    assert!(!text.contains(','));

    let wav = read_wav(out.join("hpf_sw.wav")).unwrap();
    assert_eq!(wav.sample_rate(), SAMPLE_RATE);
    assert_eq!(wav.bits_per_sample(), 16);
    assert_eq!(wav.len(), samples.len());
    assert_eq!(wav.samples().iter().map(|s| s.abs()).max(), Some(32767));
}

#[test]
fn test_golden_tracks_float_filter() {
    let dir = tempfile::tempdir().unwrap();
    let samples = write_input(dir.path(), 1500);

    let run = GoldenPipeline::new(bench_config(dir.path())).run().unwrap();
    let scale = run.quantized_coeffs.scale();
    let peak = samples.iter().map(|s| s.abs()).max().unwrap() as f64;
    let bound = 0.5 / scale * 99.0 * peak + 1e-6;

    for (n, (&g, &f)) in run
        .golden
        .values()
        .iter()
        .zip(&run.filtered.samples)
        .enumerate()
    {
        let err = (g as f64 / scale - f).abs();
        assert!(err <= bound, "sample {}: error {} > {}", n, err, bound);
    }
}

#[test]
fn test_repeat_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_input(dir.path(), 1000);
    let config = bench_config(dir.path());
    let golden_path = config.export.output_dir.join("golden_output.dat");

    GoldenPipeline::new(config.clone()).run().unwrap();
    let first = fs::read(&golden_path).unwrap();
    GoldenPipeline::new(config).run().unwrap();
    let second = fs::read(&golden_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_toml_config_drives_run() {
    let dir = tempfile::tempdir().unwrap();
    write_input(dir.path(), 1000);
    let toml = format!(
        r#"
[input]
path = "{}"

[filter]
taps = 31
cutoff = "3khz"

[fixed_point]
coeff_bits = 12
output_bits = 24
output_cast = "saturate"

[export]
output_dir = "{}"
report_file = "run.json"
"#,
        dir.path().join("birds.wav").display(),
        dir.path().join("bench").display()
    );
    let config = PipelineConfig::from_toml_str(&toml).unwrap();
    assert_eq!(config.filter.cutoff, CutoffFrequency::Hz(3000.0));
    assert_eq!(config.fixed_point.output_cast, OutputCast::Saturate);

    let run = GoldenPipeline::new(config).run().unwrap();
    assert_eq!(run.quantized_coeffs.len(), 31);
    assert_eq!(run.quantized_coeffs.bits(), 12);
    assert!(
        run.golden
            .values()
            .iter()
            .all(|&v| (-(1 << 23)..(1 << 23)).contains(&v))
    );

    let report = fs::read_to_string(dir.path().join("bench").join("run.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["fixed_point"]["coeff_bits"], 12);
    assert_eq!(value["fixed_point"]["output_bits"], 24);
    assert_eq!(value["fixed_point"]["output_cast"], "saturate");
    assert!(value["generated_at"].as_str().is_some());
}

#[test]
fn test_silent_recording_is_degenerate() {
    let dir = tempfile::tempdir().unwrap();
    save_mono_wav(dir.path().join("birds.wav"), &[0; 500], SAMPLE_RATE).unwrap();

    let result = GoldenPipeline::new(bench_config(dir.path())).run();
    assert!(matches!(result, Err(FirError::DegenerateInput(_))));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_recording() {
    let dir = tempfile::tempdir().unwrap();
    let result = GoldenPipeline::new(bench_config(dir.path())).run();
    assert!(matches!(result, Err(FirError::FileNotFound(_))));
}

#[test]
fn test_undersized_accumulator_overflows() {
    let dir = tempfile::tempdir().unwrap();
    write_input(dir.path(), 500);
    let mut config = bench_config(dir.path());
    config.fixed_point.accumulator_bits = Some(20);
    config.diagnostics.quiet_numeric_notices = true;

    let result = GoldenPipeline::new(config).run();
    assert!(matches!(
        result,
        Err(FirError::OverflowDetected { bits: 20, .. })
    ));
    assert!(!dir.path().join("out").join("hpf_sw.wav").exists());
}

#[test]
fn test_failed_rerun_keeps_previous_export() {
    let dir = tempfile::tempdir().unwrap();
    write_input(dir.path(), 800);
    let config = bench_config(dir.path());
    let golden_path = config.export.output_dir.join("golden_output.dat");
    let wav_path = config.export.output_dir.join("hpf_sw.wav");

    GoldenPipeline::new(config.clone()).run().unwrap();
    let golden = fs::read(&golden_path).unwrap();
    let wav = fs::read(&wav_path).unwrap();

    let mut narrow = config;
    narrow.fixed_point.output_bits = 1;
    narrow.filter.taps = 31;
    let result = GoldenPipeline::new(narrow).run();
    assert!(matches!(result, Err(FirError::InvalidSpec(_))));

    assert_eq!(fs::read(&golden_path).unwrap(), golden);
    assert_eq!(fs::read(&wav_path).unwrap(), wav);
}
