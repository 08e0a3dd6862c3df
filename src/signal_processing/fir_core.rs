/// Streaming direct-form FIR filter
///
/// Keeps the last `taps.len()` inputs in a circular delay line that starts
/// zeroed, so the first outputs see no pre-roll.
pub struct FirFilterCore {
    taps: Vec<f64>,
    delay_line: Vec<f64>,
    /// Slot the next sample is written to
    head: usize,
}

impl FirFilterCore {
    pub fn new(taps: Vec<f64>) -> Self {
        Self {
            delay_line: vec![0.0; taps.len()],
            taps,
            head: 0,
        }
    }

    /// Push one sample and return `Σ h[k]·x[n-k]` over the delay line
    pub fn process(&mut self, sample: f64) -> f64 {
        if self.taps.is_empty() {
            return 0.0;
        }

        self.delay_line[self.head] = sample;

        // Newest sample first: the slice up to `head` reversed, then the
        // older wrapped tail reversed.
        let (recent, older) = self.delay_line.split_at(self.head + 1);
        let history = recent.iter().rev().chain(older.iter().rev());
        let output = self.taps.iter().zip(history).map(|(h, x)| h * x).sum();

        self.head = (self.head + 1) % self.taps.len();
        output
    }

    /// Filter a whole sequence, returning an output of the same length
    pub fn process_all<I>(&mut self, samples: I) -> Vec<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        samples.into_iter().map(|s| self.process(s)).collect()
    }

    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }
}
