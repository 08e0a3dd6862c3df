use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Smoothing window applied to the truncated sinc response
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// No smoothing (plain truncation)
    Rectangular,
    /// 0.54 - 0.46 cos, the classic windowed-sinc choice
    #[default]
    Hamming,
    /// 0.5 - 0.5 cos
    Hann,
    /// Three-term Blackman
    Blackman,
}

impl Window {
    /// Symmetric window of length `len`.
    ///
    /// Symmetric (not periodic) so that an odd-length filter stays exactly
    /// linear phase and the center sample is 1.0.
    pub fn coefficients(self, len: usize) -> Vec<f64> {
        match len {
            0 => return Vec::new(),
            1 => return vec![1.0],
            _ => {}
        }

        let denom = (len - 1) as f64;
        (0..len)
            .map(|n| {
                let x = 2.0 * PI * n as f64 / denom;
                match self {
                    Window::Rectangular => 1.0,
                    Window::Hamming => 0.54 - 0.46 * x.cos(),
                    Window::Hann => 0.5 - 0.5 * x.cos(),
                    Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                }
            })
            .collect()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Window::Rectangular => "rectangular",
            Window::Hamming => "hamming",
            Window::Hann => "hann",
            Window::Blackman => "blackman",
        };
        f.write_str(name)
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "boxcar" => Ok(Window::Rectangular),
            "hamming" => Ok(Window::Hamming),
            "hann" | "hanning" => Ok(Window::Hann),
            "blackman" => Ok(Window::Blackman),
            other => Err(format!("unknown window: {}", other)),
        }
    }
}
