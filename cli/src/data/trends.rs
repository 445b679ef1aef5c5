//! Per-metric time series over the recorded history.

use batlog_model::{HistoryRecord, TrendMetric, TrendPoint};

/// Nominal full charge the health chart is measured against.
const DESIGN_CHARGE: f64 = 100.0;

/// Build the series for `metric`, one point per record, in history order.
///
/// The health series is the charting approximation
/// `min(100, max charge seen / design charge * 100)`: a single value
/// repeated at every timestamp.
pub fn series(history: &[HistoryRecord], metric: TrendMetric) -> Vec<TrendPoint> {
    let health = (metric == TrendMetric::Health).then(|| charted_health(history));

    history
        .iter()
        .map(|record| TrendPoint {
            timestamp: record.timestamp,
            value: match metric {
                TrendMetric::Voltage => record.voltage,
                TrendMetric::Temperature => record.temperature,
                TrendMetric::CycleCount => record.cycle_count as f64,
                TrendMetric::Charge => record.percentage as f64,
                TrendMetric::Health => health.unwrap_or(100.0),
            },
        })
        .collect()
}

fn charted_health(history: &[HistoryRecord]) -> f64 {
    let max_charge = history
        .iter()
        .map(|r| r.percentage as f64)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(DESIGN_CHARGE);
    (max_charge / DESIGN_CHARGE * 100.0).min(100.0)
}

/// Min, max and mean of a series, or `None` when it is empty.
pub fn summarize(points: &[TrendPoint]) -> Option<(f64, f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let mean = points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64;
    Some((min, max, mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_history() -> Vec<HistoryRecord> {
        let start = Utc.with_ymd_and_hms(2025, 11, 12, 10, 0, 0).unwrap();
        [(80, 12.6, 30.5, 10), (65, 12.2, 33.0, 10), (72, 12.4, 31.0, 11)]
            .iter()
            .enumerate()
            .map(|(i, &(percentage, voltage, temperature, cycle_count))| HistoryRecord {
                id: Some(i as i64),
                timestamp: start + Duration::minutes(5 * i as i64),
                percentage,
                cycle_count,
                voltage,
                temperature,
            })
            .collect()
    }

    fn values(points: &[TrendPoint]) -> Vec<f64> {
        points.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_metric_series() {
        let history = make_history();

        assert_eq!(values(&series(&history, TrendMetric::Charge)), vec![80.0, 65.0, 72.0]);
        assert_eq!(values(&series(&history, TrendMetric::Voltage)), vec![12.6, 12.2, 12.4]);
        assert_eq!(values(&series(&history, TrendMetric::Temperature)), vec![30.5, 33.0, 31.0]);
        assert_eq!(values(&series(&history, TrendMetric::CycleCount)), vec![10.0, 10.0, 11.0]);
    }

    #[test]
    fn test_series_keeps_timestamps() {
        let history = make_history();
        let points = series(&history, TrendMetric::Charge);

        for (point, record) in points.iter().zip(&history) {
            assert_eq!(point.timestamp, record.timestamp);
        }
    }

    #[test]
    fn test_health_series_uses_max_charge() {
        let history = make_history();
        assert_eq!(values(&series(&history, TrendMetric::Health)), vec![80.0, 80.0, 80.0]);
    }

    #[test]
    fn test_empty_history() {
        for metric in TrendMetric::ALL {
            assert!(series(&[], metric).is_empty());
        }
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn test_summarize() {
        let points = series(&make_history(), TrendMetric::Charge);
        let (min, max, mean) = summarize(&points).unwrap();

        assert_eq!(min, 65.0);
        assert_eq!(max, 80.0);
        assert!((mean - 72.333).abs() < 0.01);
    }
}
