use batlog_model::Insights;
use color_eyre::eyre::Result;

use super::open_store;
use crate::config::UserConfig;
use crate::data::insights;

pub fn run(config: &UserConfig, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let history = store.list_all()?;
    let insights = insights::compute(&history);

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    } else {
        print!("{}", render(&insights, history.len()));
    }
    Ok(())
}

fn render(insights: &Insights, record_count: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Battery Insights ({record_count} records)\n"));
    out.push_str(&format!("{}\n", "=".repeat(50)));
    out.push_str(&format!("Average charge:       {:.1}%\n", insights.average_charge));
    out.push_str(&format!(
        "Average temperature:  {:.1} °C\n",
        insights.average_temperature
    ));
    out.push_str(&format!("Cycle count:          {}\n", insights.total_cycles));
    out.push_str(&format!(
        "Estimated health:     {:.1}% ({})\n",
        insights.estimated_health, insights.status
    ));
    out.push_str(&format!("                      {}\n", insights.status.description()));

    out.push_str("\nSuggestions:\n");
    for message in insights.suggestion_messages() {
        out.push_str(&format!("  - {message}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use batlog_model::{HealthStatus, Suggestion};

    #[test]
    fn test_render_empty_history() {
        let text = render(&insights::compute(&[]), 0);

        assert!(text.contains("Battery Insights (0 records)"));
        assert!(text.contains("Estimated health:     100.0% (Unknown)"));
        assert!(text.contains(Suggestion::Balanced.message()));
    }

    #[test]
    fn test_render_lists_every_suggestion() {
        let insights = Insights {
            average_charge: 93.0,
            average_temperature: 41.5,
            total_cycles: 912,
            estimated_health: 70.0,
            status: HealthStatus::Fair,
            suggestions: vec![
                Suggestion::HighTemperature,
                Suggestion::HighAverageCharge,
                Suggestion::HighCycleCount,
            ],
        };
        let text = render(&insights, 3);

        assert!(text.contains(HealthStatus::Fair.description()));
        assert_eq!(text.matches("  - ").count(), 3);
        assert!(text.contains("Cycle count:          912"));
    }
}
