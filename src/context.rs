//! Chat context briefing
//!
//! Formats recent logs, the current cycle position and the month's recurring
//! symptoms into a short plain-text briefing. The briefing is handed to an
//! external conversational assistant together with the user's message; nothing
//! here is inferred, it is a fixed projection of the aggregates.

use crate::insights::symptom_frequency;
use crate::store::LogStore;
use crate::types::{CyclePhase, DailyLog, Mood, MonthKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Logs considered "recent" in the briefing
pub const RECENT_CONTEXT_LOGS: usize = 7;

/// Logs handed over by [`ChatContext::from_store`]
pub const CONTEXT_HISTORY_LOGS: usize = 14;

/// Recurring symptoms listed in the briefing
pub const CONTEXT_TOP_SYMPTOMS: usize = 3;

/// Text used when there is nothing to report
pub const EMPTY_CONTEXT_BRIEFING: &str = "No tracking data available yet.";

/// Everything the briefing is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    #[serde(default)]
    pub recent_logs: Vec<DailyLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_phase: Option<CyclePhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_day: Option<u32>,
    #[serde(default)]
    pub top_symptoms: Vec<String>,
}

impl ChatContext {
    /// Gather the context for `today` from a store: the most recent logs, the
    /// cycle position and the top symptoms of the current month.
    pub fn from_store(store: &LogStore, today: NaiveDate) -> Self {
        let recent_logs: Vec<DailyLog> = store
            .logs()
            .iter()
            .rev()
            .take(CONTEXT_HISTORY_LOGS)
            .cloned()
            .collect();

        let position = store.current_position(today);
        let top_symptoms = symptom_frequency(
            store.get_by_month(MonthKey::of(today)),
            CONTEXT_TOP_SYMPTOMS,
        )
        .into_iter()
        .map(|s| s.symptom)
        .collect();

        Self {
            recent_logs,
            cycle_phase: position.map(|p| p.phase),
            cycle_day: position.map(|p| p.cycle_day),
            top_symptoms,
        }
    }

    /// The briefing, or a fixed placeholder when it would be empty
    pub fn briefing_or_default(&self) -> String {
        let briefing = build_context(self);
        if briefing.is_empty() {
            EMPTY_CONTEXT_BRIEFING.to_string()
        } else {
            briefing
        }
    }
}

/// Build the briefing text. Empty when the context holds no data.
pub fn build_context(context: &ChatContext) -> String {
    let mut out = String::new();

    if let (Some(phase), Some(day)) = (context.cycle_phase, context.cycle_day) {
        out.push_str(&format!("Current cycle phase: {phase} (Day {day}). "));
    }

    let mut recent: Vec<&DailyLog> = context.recent_logs.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_CONTEXT_LOGS);

    if !recent.is_empty() {
        let n = recent.len() as f64;
        // Halves round up, matching `MonthlyAverages::rounded`
        let avg_energy = (recent.iter().map(|l| f64::from(l.energy)).sum::<f64>() / n * 10.0).round() / 10.0;
        let avg_movement = (recent.iter().map(|l| f64::from(l.movement)).sum::<f64>() / n).round();
        let mood = dominant_mood(&recent).map_or("unknown", |m| m.as_str());

        out.push_str(&format!(
            "Recent week: avg energy {avg_energy:.1}/5, avg movement {avg_movement:.0}%, dominant mood: {mood}. "
        ));

        let mut symptoms: Vec<&str> = Vec::new();
        for log in &recent {
            for symptom in &log.symptoms {
                if !symptoms.contains(&symptom.as_str()) {
                    symptoms.push(symptom.as_str());
                }
            }
        }
        if !symptoms.is_empty() {
            out.push_str(&format!("Recent symptoms: {}. ", symptoms.join(", ")));
        }
    }

    if !context.top_symptoms.is_empty() {
        let top: Vec<&str> = context
            .top_symptoms
            .iter()
            .take(CONTEXT_TOP_SYMPTOMS)
            .map(String::as_str)
            .collect();
        out.push_str(&format!(
            "Most common symptoms this month: {}. ",
            top.join(", ")
        ));
    }

    out.trim_end().to_string()
}

/// Most frequent mood; ties go to the mood seen first
fn dominant_mood(logs: &[&DailyLog]) -> Option<Mood> {
    let mut counts: Vec<(Mood, u32)> = Vec::new();
    for log in logs {
        match counts.iter_mut().find(|(m, _)| *m == log.mood) {
            Some((_, count)) => *count += 1,
            None => counts.push((log.mood, 1)),
        }
    }

    let mut best: Option<(Mood, u32)> = None;
    for (mood, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((mood, count));
        }
    }
    best.map(|(mood, _)| mood)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_log(day: u32, mood: Mood, energy: u8, movement: u8, symptoms: &[&str]) -> DailyLog {
        DailyLog {
            id: Uuid::new_v4(),
            date: date(2024, 5, day),
            mood,
            energy,
            movement,
            nutrition: 70,
            sleep: 70,
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            keywords: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 5, day, 20, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_context() {
        let context = ChatContext::default();
        assert_eq!(build_context(&context), "");
        assert_eq!(context.briefing_or_default(), EMPTY_CONTEXT_BRIEFING);
    }

    #[test]
    fn test_full_briefing() {
        let context = ChatContext {
            recent_logs: vec![
                make_log(1, Mood::Good, 3, 50, &["Fatigue"]),
                make_log(2, Mood::Low, 4, 70, &["Hot flashes", "Fatigue"]),
                make_log(3, Mood::Good, 4, 61, &[]),
            ],
            cycle_phase: Some(CyclePhase::Luteal),
            cycle_day: Some(20),
            top_symptoms: vec!["Fatigue".to_string(), "Hot flashes".to_string()],
        };

        assert_eq!(
            build_context(&context),
            "Current cycle phase: luteal (Day 20). \
             Recent week: avg energy 3.7/5, avg movement 60%, dominant mood: good. \
             Recent symptoms: Hot flashes, Fatigue. \
             Most common symptoms this month: Fatigue, Hot flashes."
        );
    }

    #[test]
    fn test_only_seven_most_recent_logs_count() {
        let mut logs: Vec<DailyLog> = (1..=7).map(|d| make_log(d + 10, Mood::Good, 5, 100, &[])).collect();
        // Older entries that must be ignored
        logs.push(make_log(1, Mood::Struggling, 1, 0, &["Anxiety"]));
        logs.push(make_log(2, Mood::Struggling, 1, 0, &["Anxiety"]));

        let context = ChatContext {
            recent_logs: logs,
            ..Default::default()
        };
        assert_eq!(
            build_context(&context),
            "Recent week: avg energy 5.0/5, avg movement 100%, dominant mood: good."
        );
    }

    #[test]
    fn test_averages_round_halves_up() {
        let context = ChatContext {
            recent_logs: vec![
                make_log(1, Mood::Good, 3, 60, &[]),
                make_log(2, Mood::Good, 3, 65, &[]),
                make_log(3, Mood::Good, 3, 60, &[]),
                make_log(4, Mood::Good, 4, 65, &[]),
            ],
            ..Default::default()
        };
        assert_eq!(
            build_context(&context),
            "Recent week: avg energy 3.3/5, avg movement 63%, dominant mood: good."
        );
    }

    #[test]
    fn test_dominant_mood_tie_goes_to_first_seen() {
        let context = ChatContext {
            recent_logs: vec![
                make_log(1, Mood::Low, 3, 50, &[]),
                make_log(2, Mood::Okay, 3, 50, &[]),
                make_log(3, Mood::Low, 3, 50, &[]),
                make_log(4, Mood::Okay, 3, 50, &[]),
            ],
            ..Default::default()
        };
        // Most recent first: okay (4), low (3), ...
        assert!(build_context(&context).contains("dominant mood: okay"));
    }

    #[test]
    fn test_phase_needs_both_fields() {
        let context = ChatContext {
            cycle_phase: Some(CyclePhase::Period),
            ..Default::default()
        };
        assert_eq!(build_context(&context), "");
    }

    #[test]
    fn test_top_symptoms_capped_at_three() {
        let context = ChatContext {
            top_symptoms: ["Anxiety", "Bloating", "Fatigue", "Headaches"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Default::default()
        };
        assert_eq!(
            build_context(&context),
            "Most common symptoms this month: Anxiety, Bloating, Fatigue."
        );
    }

    #[test]
    fn test_from_store() {
        let mut store = LogStore::new();
        store.log_period_start(date(2024, 5, 1));
        for day in 1..=20 {
            let symptoms: Vec<String> = if day % 2 == 0 {
                vec!["Night sweats".to_string()]
            } else {
                vec!["Brain fog".to_string(), "Night sweats".to_string()]
            };
            store
                .upsert(
                    crate::types::NewDailyLog {
                        date: date(2024, 5, day),
                        mood: Mood::Okay,
                        energy: 3,
                        movement: 50,
                        nutrition: 50,
                        sleep: 50,
                        symptoms,
                        keywords: vec![],
                    },
                    Utc.with_ymd_and_hms(2024, 5, day, 20, 0, 0).unwrap(),
                )
                .unwrap();
        }

        let context = ChatContext::from_store(&store, date(2024, 5, 20));
        assert_eq!(context.recent_logs.len(), CONTEXT_HISTORY_LOGS);
        assert_eq!(context.recent_logs[0].date, date(2024, 5, 20));
        assert_eq!(context.cycle_phase, Some(CyclePhase::Luteal));
        assert_eq!(context.cycle_day, Some(20));
        assert_eq!(context.top_symptoms, vec!["Night sweats", "Brain fog"]);
    }
}
