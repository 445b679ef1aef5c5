//! Aggregate statistics over the recorded history.

use batlog_model::{HealthStatus, HistoryRecord, Insights, Suggestion};

const HIGH_TEMPERATURE_C: f64 = 40.0;
const HIGH_AVERAGE_CHARGE: f64 = 90.0;
const HIGH_CYCLE_COUNT: u32 = 800;

/// Compute insights over `history`, which must be ordered oldest first.
///
/// The result depends only on the input: nothing is cached between calls.
pub fn compute(history: &[HistoryRecord]) -> Insights {
    let Some(latest) = history.last() else {
        return Insights {
            average_charge: 0.0,
            average_temperature: 0.0,
            total_cycles: 0,
            estimated_health: 100.0,
            status: HealthStatus::Unknown,
            suggestions: suggestions(0.0, 0.0, 0),
        };
    };

    let count = history.len() as f64;
    let average_charge = history.iter().map(|r| r.percentage as f64).sum::<f64>() / count;
    let average_temperature = history.iter().map(|r| r.temperature).sum::<f64>() / count;
    let total_cycles = latest.cycle_count;

    // Latest charge against the historical average. A crude proxy, unrelated
    // to the capacity-based health of a single reading.
    let estimated_health = if average_charge > 0.0 {
        (latest.percentage as f64 / average_charge * 100.0).min(100.0)
    } else {
        100.0
    };

    Insights {
        average_charge,
        average_temperature,
        total_cycles,
        estimated_health,
        status: HealthStatus::from_health(estimated_health),
        suggestions: suggestions(average_temperature, average_charge, total_cycles),
    }
}

fn suggestions(average_temperature: f64, average_charge: f64, total_cycles: u32) -> Vec<Suggestion> {
    let mut tips = Vec::new();
    if average_temperature > HIGH_TEMPERATURE_C {
        tips.push(Suggestion::HighTemperature);
    }
    if average_charge > HIGH_AVERAGE_CHARGE {
        tips.push(Suggestion::HighAverageCharge);
    }
    if total_cycles > HIGH_CYCLE_COUNT {
        tips.push(Suggestion::HighCycleCount);
    }
    if tips.is_empty() {
        tips.push(Suggestion::Balanced);
    }
    tips
}
