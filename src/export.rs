//! Line-oriented integer text files consumed by the hardware test bench.
//!
//! One base-10 integer per line in sequence order, each line terminated by a
//! newline. No header and no trailing metadata.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::error::{FirError, Result};

/// Paths of the three test-bench files
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExportPaths {
    pub input: PathBuf,
    pub coeffs: PathBuf,
    pub golden: PathBuf,
}

impl ExportPaths {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            input: config.output_dir.join(&config.input_file),
            coeffs: config.output_dir.join(&config.coeffs_file),
            golden: config.output_dir.join(&config.golden_file),
        }
    }
}

/// Write `values` one per line
pub fn write_integer_lines<W, I, T>(writer: &mut W, values: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: Display,
{
    for value in values {
        writeln!(writer, "{}", value)?;
    }
    Ok(())
}

/// Write `values` one per line to `path`, replacing any existing file
pub fn write_integer_file<P, I, T>(path: P, values: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = T>,
    T: Display,
{
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_integer_lines(&mut writer, values)?;
    writer.flush()?;
    Ok(())
}

/// Read a file written by [`write_integer_file`]
///
/// Surrounding whitespace is ignored and blank lines are skipped.
///
/// # Errors
/// * `FirError::FileNotFound` if `path` does not exist
/// * `FirError::Parse` on the first line that is not a decimal integer
pub fn read_integer_lines<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FirError::FileNotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut values = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<i64>().map_err(|_| FirError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            content: trimmed.to_string(),
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Write the quantized input, quantized coefficients and golden output
///
/// The output directory is created if missing.
pub fn export_golden_data(
    config: &ExportConfig,
    input: &[i32],
    coeffs: &[i32],
    golden: &[i64],
) -> Result<ExportPaths> {
    fs::create_dir_all(&config.output_dir)?;
    let paths = ExportPaths::from_config(config);

    write_integer_file(&paths.input, input)?;
    write_integer_file(&paths.coeffs, coeffs)?;
    write_integer_file(&paths.golden, golden)?;

    log::info!(
        "Exported test-bench data: {} ({} lines), {} ({} lines), {} ({} lines)",
        paths.input.display(),
        input.len(),
        paths.coeffs.display(),
        coeffs.len(),
        paths.golden.display(),
        golden.len()
    );

    Ok(paths)
}
