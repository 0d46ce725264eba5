// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Progress notifications for long-running export and backup jobs.

/// One progress notification: a percentage and a human-readable stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: u8,
    pub message: String,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.percent >= 100
    }
}

/// Forwards progress to a sink, never letting the percentage go backwards.
pub struct ProgressReporter<'a> {
    sink: &'a mut dyn FnMut(Progress),
    last: u8,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: &'a mut dyn FnMut(Progress)) -> Self {
        Self { sink, last: 0 }
    }

    pub fn report(&mut self, percent: f64, message: impl Into<String>) {
        let percent = (percent.clamp(0.0, 100.0) as u8).max(self.last);
        self.last = percent;
        (self.sink)(Progress {
            percent,
            message: message.into(),
        });
    }

    /// Map `done / total` into the `[from, to]` band.
    pub fn report_fraction(&mut self, from: f64, to: f64, done: u64, total: u64, message: impl Into<String>) {
        let fraction = if total == 0 { 1.0 } else { done as f64 / total as f64 };
        self.report(from + (to - from) * fraction, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_never_decrease() {
        let mut seen = Vec::new();
        let mut sink = |p: Progress| seen.push(p.percent);
        let mut reporter = ProgressReporter::new(&mut sink);
        reporter.report(10.0, "a");
        reporter.report(5.0, "b");
        reporter.report(150.0, "c");
        drop(reporter);
        assert_eq!(seen, vec![10, 10, 100]);
    }

    #[test]
    fn test_fraction_bands() {
        let mut seen = Vec::new();
        let mut sink = |p: Progress| seen.push(p.percent);
        let mut reporter = ProgressReporter::new(&mut sink);
        reporter.report_fraction(20.0, 50.0, 1, 2, "half");
        reporter.report_fraction(80.0, 95.0, 0, 0, "empty");
        drop(reporter);
        assert_eq!(seen, vec![35, 95]);
    }
}
