use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use goldenfir::GoldenPipeline;
use goldenfir::config::{CutoffFrequency, InputScaling, OutputCast, PipelineConfig};
use goldenfir::signal_processing::{FilterType, Window};

#[derive(Parser, Debug)]
#[command(name = "goldenfir")]
#[command(
    about = "Design an FIR filter and export bit-exact golden data for a hardware test bench",
    long_about = None
)]
struct Args {
    /// Mono PCM WAV file to filter (overrides the config file)
    input: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of filter taps (odd, at least 3)
    #[arg(short = 't', long)]
    taps: Option<usize>,

    /// Cutoff (e.g., "2800hz", "2.8khz", or "0.127" normalized to Nyquist)
    #[arg(long)]
    cutoff: Option<CutoffFrequency>,

    /// Filter type: high-pass, low-pass
    #[arg(long, value_enum)]
    filter_type: Option<FilterType>,

    /// Design window: hamming, hann, blackman, rectangular
    #[arg(long, value_enum)]
    window: Option<Window>,

    /// Coefficient width in bits
    #[arg(long)]
    coeff_bits: Option<u32>,

    /// Input register width in bits
    #[arg(long)]
    input_bits: Option<u32>,

    /// Quantize the input with its own scale instead of passing samples through
    #[arg(long)]
    rescale_input: bool,

    /// Accumulator width in bits (derived from the operand widths if omitted)
    #[arg(long)]
    accumulator_bits: Option<u32>,

    /// Golden output width in bits
    #[arg(long)]
    output_bits: Option<u32>,

    /// Accumulator to output conversion: wrap, saturate, checked
    #[arg(long, value_enum)]
    output_cast: Option<OutputCast>,

    /// Directory for exported files
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Skip writing the filtered WAV
    #[arg(long)]
    no_wav: bool,

    /// Write diagnostic spectrogram CSVs of the raw and filtered signals
    #[arg(long)]
    spectrogram: bool,

    /// Write a JSON run report with this file name into the output directory
    #[arg(long)]
    report: Option<String>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Suppress non-fatal numeric notices (clamping, undersized accumulator)
    #[arg(short = 'q', long)]
    quiet_notices: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    let pipeline = GoldenPipeline::new(config);
    log::info!(
        "Exporting to {}",
        pipeline.config().export.output_dir.display()
    );
    let run = pipeline.run().context("golden-reference run failed")?;
    let report = &run.report;

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("=== FIR Golden Reference ===");
    if let Some(source) = &report.source {
        println!("Input: {}", source.display());
    }
    println!(
        "Signal: {} samples at {} Hz",
        report.sample_count, report.sample_rate
    );
    println!(
        "Filter: {} taps {}, cutoff {:.1} Hz ({:.4} x Nyquist), {} window",
        report.filter.taps,
        report.filter.filter_type,
        report.filter.cutoff_hz,
        report.filter.cutoff,
        report.filter.window
    );
    let fixed = &report.fixed_point;
    println!(
        "Fixed point: coeff {} bits (scale {:.3}), input {} bits (scale {:.3}), accumulator {}/{} bits, output {} bits ({:?})",
        fixed.coeff_bits,
        fixed.coeff_scale,
        fixed.input_bits,
        fixed.input_scale,
        fixed.accumulator_bits,
        fixed.required_accumulator_bits,
        fixed.output_bits,
        fixed.output_cast
    );
    println!("Software filter: {:.6} s", report.software_filter_secs);
    if let Some(stats) = &report.golden_stats {
        println!(
            "Golden output: min {:.0}, max {:.0}, mean {:.2}, std dev {:.2}",
            stats.min, stats.max, stats.mean, stats.std_dev
        );
    }
    println!();
    println!("Wrote {}", report.exported.input.display());
    println!("Wrote {}", report.exported.coeffs.display());
    println!("Wrote {}", report.exported.golden.display());
    if let Some(path) = &report.filtered_wav {
        println!("Wrote {}", path.display());
    }
    for path in &report.spectrograms {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(input) = &args.input {
        config.input.path = Some(input.clone());
    }
    if config.input.path.is_none() {
        anyhow::bail!("no input file given on the command line or in the config");
    }

    let filter = &mut config.filter;
    if let Some(taps) = args.taps {
        filter.taps = taps;
    }
    if let Some(cutoff) = args.cutoff {
        filter.cutoff = cutoff;
    }
    if let Some(filter_type) = args.filter_type {
        filter.filter_type = filter_type;
    }
    if let Some(window) = args.window {
        filter.window = window;
    }

    let fixed = &mut config.fixed_point;
    if let Some(bits) = args.coeff_bits {
        fixed.coeff_bits = bits;
    }
    let input_bits = args.input_bits.unwrap_or(fixed.input_scaling.bits());
    fixed.input_scaling = match (args.rescale_input, fixed.input_scaling) {
        (true, _) | (false, InputScaling::Rescale { .. }) => {
            InputScaling::Rescale { bits: input_bits }
        }
        (false, InputScaling::PassThrough { .. }) => {
            InputScaling::PassThrough { bits: input_bits }
        }
    };
    if args.accumulator_bits.is_some() {
        fixed.accumulator_bits = args.accumulator_bits;
    }
    if let Some(bits) = args.output_bits {
        fixed.output_bits = bits;
    }
    if let Some(cast) = args.output_cast {
        fixed.output_cast = cast;
    }

    if let Some(dir) = &args.output_dir {
        config.export.output_dir = dir.clone();
    }
    if args.no_wav {
        config.export.filtered_wav = None;
    }
    if let Some(report) = &args.report {
        config.export.report_file = Some(report.clone());
    }
    if args.spectrogram {
        config.spectrogram.enabled = true;
    }
    if args.quiet_notices {
        config.diagnostics.quiet_numeric_notices = true;
    }

    Ok(config)
}
