//! Wall-clock timing for the two executors.

use std::time::{Duration, Instant};

/// A start/end pair captured around one executor run.
#[derive(Debug, Clone, Copy)]
pub struct TimingSample {
    pub start: Instant,
    pub end: Instant,
}

impl TimingSample {
    pub fn duration(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    /// Elapsed time in fractional milliseconds.
    pub fn millis(&self) -> f64 {
        self.duration().as_secs_f64() * 1e3
    }
}

/// Run `f` and record how long it took.
pub fn time<T>(f: impl FnOnce() -> T) -> (T, TimingSample) {
    let start = Instant::now();
    let value = f();
    let end = Instant::now();
    (value, TimingSample { start, end })
}

/// Format one report line, e.g. `GPU Execution time: 1.234 ms`.
pub fn report_line(label: &str, sample: &TimingSample) -> String {
    format!("{label} Execution time: {:.3} ms", sample.millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_returns_value_and_ordered_instants() {
        let (v, sample) = time(|| 21 * 2);
        assert_eq!(v, 42);
        assert!(sample.end >= sample.start);
        assert!(sample.millis() >= 0.0);
    }

    #[test]
    fn millis_is_fractional() {
        let start = Instant::now();
        let sample = TimingSample {
            start,
            end: start + Duration::from_micros(1500),
        };
        assert!((sample.millis() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn report_line_format() {
        let start = Instant::now();
        let sample = TimingSample {
            start,
            end: start + Duration::from_micros(2250),
        };
        assert_eq!(
            report_line("Sequential", &sample),
            "Sequential Execution time: 2.250 ms"
        );
    }
}
