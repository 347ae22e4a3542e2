//! Sliding-window volatility detection over tick returns

use std::collections::VecDeque;

/// Tracks the last N percent-returns for one pair and reports the window's
/// standard deviation whenever it exceeds the configured threshold.
/// Eviction is FIFO by tick arrival, not by time.
#[derive(Debug, Clone)]
pub struct VolatilityMonitor {
    threshold: f64,
    window: VecDeque<f64>,
    capacity: usize,
    min_samples: usize,
}

impl VolatilityMonitor {
    pub fn new(threshold: f64, capacity: usize, min_samples: usize) -> Self {
        Self {
            threshold,
            window: VecDeque::with_capacity(capacity),
            capacity,
            min_samples,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Record a tick's percent-return. Returns the window volatility when it
    /// exceeds the threshold and enough samples have accumulated.
    pub fn record(&mut self, change_percent: f64) -> Option<f64> {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(change_percent);

        if self.window.len() < self.min_samples {
            return None;
        }
        let volatility = std_deviation(self.window.iter().copied());
        (volatility > self.threshold).then_some(volatility)
    }
}

/// Population standard deviation
fn std_deviation(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let count = values.clone().count();
    if count == 0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / count as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_evaluation_below_min_samples() {
        let mut monitor = VolatilityMonitor::new(1.0, 20, 5);
        for _ in 0..4 {
            assert_eq!(monitor.record(50.0), None);
        }
    }

    #[test]
    fn test_alert_when_deviation_exceeds_threshold() {
        let mut monitor = VolatilityMonitor::new(5.0, 20, 5);
        // returns with standard deviation near 7
        let returns = [7.0, -7.0, 7.0, -7.0, 7.0];
        let mut alerts = Vec::new();
        for r in returns {
            if let Some(vol) = monitor.record(r) {
                alerts.push(vol);
            }
        }
        assert_eq!(alerts.len(), 1);
        assert!((alerts[0] - 7.0).abs() < 0.5);
    }

    #[test]
    fn test_quiet_window_stays_silent() {
        let mut monitor = VolatilityMonitor::new(5.0, 20, 5);
        for _ in 0..10 {
            assert_eq!(monitor.record(0.1), None);
        }
    }

    #[test]
    fn test_fifo_eviction_lets_volatility_decay() {
        let mut monitor = VolatilityMonitor::new(5.0, 5, 5);
        for r in [10.0, -10.0, 10.0, -10.0, 10.0] {
            monitor.record(r);
        }
        // flood the window with flat returns; the spike ages out
        let mut last = None;
        for _ in 0..5 {
            last = monitor.record(0.0);
        }
        assert_eq!(last, None);
    }

    #[test]
    fn test_std_deviation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_deviation(values.iter().copied()) - 2.0).abs() < 1e-9);
    }
}
