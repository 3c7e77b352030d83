//! Sliding window of the last 20 delay samples per link, for jitter (§4.7).

use std::collections::VecDeque;

const WINDOW_SIZE: usize = 20;

#[derive(Debug, Default, Clone)]
pub struct JitterWindow {
    samples: VecDeque<f64>,
}

impl JitterWindow {
    pub fn push(&mut self, sample: f64) {
        self.samples.push_back(sample);
        if self.samples.len() > WINDOW_SIZE {
            self.samples.pop_front();
        }
    }

    /// Sample standard deviation (n-1 denominator) over the window, 0.0 if
    /// fewer than two samples are present (§4.7).
    pub fn jitter(&self) -> f64 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }
        let mean: f64 = self.samples.iter().sum::<f64>() / n as f64;
        let variance: f64 = self.samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    }
}
