use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use goldenfir::config::{ExportConfig, FixedPointConfig, InputScaling, OutputCast, PipelineConfig};
use goldenfir::export::{ExportPaths, read_integer_lines};
use goldenfir::signal_processing::{
    GoldenReferenceEngine, QuantizedSet, VerificationReport, compare_outputs,
};

#[derive(Parser, Debug)]
#[command(name = "verify_golden")]
#[command(
    about = "Re-run the integer golden model from exported files and check a hardware output dump",
    long_about = None
)]
struct Args {
    /// Hardware (or co-simulation) output, one integer per line
    hardware: Option<PathBuf>,

    /// TOML configuration used for the export
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Directory holding the exported files (overrides the config file)
    #[arg(short = 'd', long)]
    dir: Option<PathBuf>,

    /// Coefficient width in bits
    #[arg(long)]
    coeff_bits: Option<u32>,

    /// Input register width in bits
    #[arg(long)]
    input_bits: Option<u32>,

    /// Accumulator width in bits
    #[arg(long)]
    accumulator_bits: Option<u32>,

    /// Golden output width in bits
    #[arg(long)]
    output_bits: Option<u32>,

    /// Accumulator to output conversion: wrap, saturate, checked
    #[arg(long, value_enum)]
    output_cast: Option<OutputCast>,

    /// Largest accepted absolute difference against the golden output
    #[arg(long, default_value = "0")]
    tolerance: u64,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct Verification {
    files: ExportPaths,
    /// Golden file against a fresh run of the integer model
    recomputed: VerificationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    hardware_file: Option<PathBuf>,
    /// Hardware dump against the golden file
    #[serde(skip_serializing_if = "Option::is_none")]
    hardware: Option<VerificationReport>,
}

impl Verification {
    fn passed(&self) -> bool {
        self.recomputed.passed() && self.hardware.as_ref().is_none_or(|r| r.passed())
    }
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

    let (export, fixed) = build_config(&args)?;
    let verification = verify(&export, &fixed, args.hardware.as_deref(), args.tolerance)?;

    match args.format {
        OutputFormat::Text => print_text(&verification),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verification)?),
    }

    if !verification.passed() {
        anyhow::bail!("verification failed");
    }
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<(ExportConfig, FixedPointConfig)> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let mut export = config.export;
    if let Some(dir) = &args.dir {
        export.output_dir = dir.clone();
    }

    let mut fixed = config.fixed_point;
    if let Some(bits) = args.coeff_bits {
        fixed.coeff_bits = bits;
    }
    if let Some(bits) = args.input_bits {
        // The exported input is already in register form, so only the width matters
        fixed.input_scaling = InputScaling::PassThrough { bits };
    }
    if args.accumulator_bits.is_some() {
        fixed.accumulator_bits = args.accumulator_bits;
    }
    if let Some(bits) = args.output_bits {
        fixed.output_bits = bits;
    }
    if let Some(cast) = args.output_cast {
        fixed.output_cast = cast;
    }

    Ok((export, fixed))
}

fn verify(
    export: &ExportConfig,
    fixed: &FixedPointConfig,
    hardware: Option<&Path>,
    tolerance: u64,
) -> anyhow::Result<Verification> {
    let files = ExportPaths::from_config(export);

    let coeffs = load_register(&files.coeffs, fixed.coeff_bits)?;
    let input = load_register(&files.input, fixed.input_scaling.bits())?;
    let golden = read_integer_lines(&files.golden)
        .with_context(|| format!("reading {}", files.golden.display()))?;

    log::info!(
        "Loaded {} coefficients, {} input samples, {} golden values",
        coeffs.len(),
        input.len(),
        golden.len()
    );

    let recomputed = GoldenReferenceEngine::new(fixed)
        .run(&coeffs, &input)
        .context("re-running the integer model")?;
    let recomputed = compare_outputs(recomputed.values(), &golden, 0);

    let hardware_report = match hardware {
        Some(path) => {
            let actual = read_integer_lines(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Some(compare_outputs(&actual, &golden, tolerance))
        }
        None => None,
    };

    Ok(Verification {
        files,
        recomputed,
        hardware_file: hardware.map(Path::to_path_buf),
        hardware: hardware_report,
    })
}

fn load_register(path: &Path, bits: u32) -> anyhow::Result<QuantizedSet> {
    let values = read_integer_lines(path).with_context(|| format!("reading {}", path.display()))?;
    let values = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            i32::try_from(v).with_context(|| {
                format!("{}: value {} at index {} exceeds 32 bits", path.display(), v, i)
            })
        })
        .collect::<anyhow::Result<Vec<i32>>>()?;
    QuantizedSet::from_integers(values, bits)
        .with_context(|| format!("{} does not fit {} bits", path.display(), bits))
}

fn print_text(verification: &Verification) {
    print_report(
        &format!("Golden file vs integer model ({})", verification.files.golden.display()),
        &verification.recomputed,
    );
    if let (Some(path), Some(report)) = (&verification.hardware_file, &verification.hardware) {
        print_report(&format!("Hardware output ({})", path.display()), report);
    }
}

fn print_report(title: &str, report: &VerificationReport) {
    println!("{}", title);
    println!("  Compared: {}", report.compared);
    if let Some((actual, expected)) = report.length_mismatch {
        println!("  Length mismatch: {} vs {} expected", actual, expected);
    }
    println!("  Mismatches: {}", report.mismatches);
    println!("  Max |error|: {}", report.max_abs_error);
    if let Some(first) = &report.first_mismatch {
        println!(
            "  First mismatch: index {} got {} expected {}",
            first.index, first.actual, first.expected
        );
    }
    println!("  Result: {}", if report.passed() { "PASS" } else { "FAIL" });
}
