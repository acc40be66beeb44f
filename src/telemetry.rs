//! Score and timing extraction from aligner output.
//!
//! External aligners report on two streams:
//! ```text
//! stdout: Alignment score: 412
//! stderr: GPU Execution time: 4743 μs (4743667 ns)
//! stderr: CPU Execution time: 359.260 ms
//! ```
//! Nothing in the decomposition engine depends on these values; the pair
//! runner logs them and keeps them in its summary.

use regex::Regex;

/// Values reported by one aligner invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlignerReport {
    pub score: Option<i64>,
    /// Wall time in milliseconds
    pub time_ms: Option<f64>,
}

/// Compiled patterns for aligner output.
#[derive(Debug, Clone)]
pub struct TelemetryParser {
    score: Regex,
    micros: Regex,
    millis: Regex,
}

impl TelemetryParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            score: Regex::new(r"Alignment score:\s*(\d+)")?,
            micros: Regex::new(r"Execution time: (\d+) μs")?,
            millis: Regex::new(r"Execution time: (\d+(?:\.\d+)?) ms")?,
        })
    }

    /// Extracts `Alignment score: <integer>` from aligner stdout.
    pub fn parse_score(&self, stdout: &str) -> Option<i64> {
        self.score.captures(stdout)?.get(1)?.as_str().parse().ok()
    }

    /// Extracts the execution time in milliseconds from aligner stderr.
    ///
    /// Microsecond reports take precedence over millisecond ones.
    pub fn parse_execution_time(&self, stderr: &str) -> Option<f64> {
        if let Some(caps) = self.micros.captures(stderr) {
            let micros: f64 = caps.get(1)?.as_str().parse().ok()?;
            return Some(micros / 1000.0);
        }
        self.millis.captures(stderr)?.get(1)?.as_str().parse().ok()
    }

    pub fn parse(&self, stdout: &str, stderr: &str) -> AlignerReport {
        AlignerReport {
            score: self.parse_score(stdout),
            time_ms: self.parse_execution_time(stderr),
        }
    }
}
