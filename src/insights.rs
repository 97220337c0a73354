//! Insight aggregation
//!
//! Month-to-date statistics and a trailing window over the daily log history.
//! Everything here is recomputed from the logs on each call and takes the
//! reference date explicitly. Sparse or empty histories yield zeros and empty
//! collections, never errors.

use crate::types::{DailyLog, EnergyTrend, Mood, MonthKey};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Length of the trailing chart window in days
pub const ROLLING_WINDOW_DAYS: i64 = 14;

/// Number of symptoms kept in the frequency ranking
pub const TOP_SYMPTOMS_LIMIT: usize = 5;

/// Mean metrics over a set of logs (all zero when the set is empty)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAverages {
    pub energy: f64,
    pub movement: f64,
    pub nutrition: f64,
    pub sleep: f64,
}

impl MonthlyAverages {
    /// Energy to one decimal, percentages to whole numbers
    pub fn rounded(&self) -> Self {
        Self {
            energy: (self.energy * 10.0).round() / 10.0,
            movement: self.movement.round(),
            nutrition: self.nutrition.round(),
            sleep: self.sleep.round(),
        }
    }
}

/// Count of logs per mood
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodDistribution {
    pub radiant: u32,
    pub good: u32,
    pub okay: u32,
    pub low: u32,
    pub struggling: u32,
}

impl MoodDistribution {
    pub fn count(&self, mood: Mood) -> u32 {
        match mood {
            Mood::Radiant => self.radiant,
            Mood::Good => self.good,
            Mood::Okay => self.okay,
            Mood::Low => self.low,
            Mood::Struggling => self.struggling,
        }
    }

    fn increment(&mut self, mood: Mood) {
        let slot = match mood {
            Mood::Radiant => &mut self.radiant,
            Mood::Good => &mut self.good,
            Mood::Okay => &mut self.okay,
            Mood::Low => &mut self.low,
            Mood::Struggling => &mut self.struggling,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        Mood::ALL.iter().map(|m| self.count(*m)).sum()
    }

    /// Moods with a non-zero count, best mood first
    pub fn present(&self) -> Vec<(Mood, u32)> {
        Mood::ALL
            .iter()
            .map(|m| (*m, self.count(*m)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// One entry of the symptom ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomCount {
    pub symptom: String,
    /// Number of logged days reporting the symptom
    pub count: u32,
}

/// All insight aggregates for the month containing `today`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub month: MonthKey,
    pub days_logged: u32,
    pub averages: MonthlyAverages,
    pub energy_trend: EnergyTrend,
    pub mood_distribution: MoodDistribution,
    pub top_symptoms: Vec<SymptomCount>,
    /// Percent of elapsed days this month with a log
    pub consistency_rate: u32,
    /// Trailing window for charts, ascending by date
    pub rolling_window: Vec<DailyLog>,
}

impl InsightsReport {
    /// Compute every aggregate from `logs` relative to `today`
    pub fn compute(logs: &[DailyLog], today: NaiveDate) -> Self {
        let month = MonthKey::of(today);
        let current = logs_in_month(logs, month);

        Self {
            month,
            days_logged: current.len() as u32,
            averages: averages(current.iter().copied()),
            energy_trend: energy_trend(logs, today),
            mood_distribution: mood_distribution(current.iter().copied()),
            top_symptoms: symptom_frequency(current.iter().copied(), TOP_SYMPTOMS_LIMIT),
            consistency_rate: consistency_rate(logs, today),
            rolling_window: rolling_window(logs, today, ROLLING_WINDOW_DAYS),
        }
    }
}

/// Logs dated inside `month`, in input order
pub fn logs_in_month(logs: &[DailyLog], month: MonthKey) -> Vec<&DailyLog> {
    logs.iter().filter(|log| month.contains(log.date)).collect()
}

/// Mean energy, movement, nutrition and sleep
pub fn averages<'a, I>(logs: I) -> MonthlyAverages
where
    I: IntoIterator<Item = &'a DailyLog>,
{
    let mut count = 0u32;
    let mut totals = MonthlyAverages::default();
    for log in logs {
        count += 1;
        totals.energy += f64::from(log.energy);
        totals.movement += f64::from(log.movement);
        totals.nutrition += f64::from(log.nutrition);
        totals.sleep += f64::from(log.sleep);
    }

    if count == 0 {
        return MonthlyAverages::default();
    }

    let n = f64::from(count);
    MonthlyAverages {
        energy: totals.energy / n,
        movement: totals.movement / n,
        nutrition: totals.nutrition / n,
        sleep: totals.sleep / n,
    }
}

/// Compare this month's mean energy to last month's.
///
/// Without logs last month the current average is compared to itself, which
/// reads as stable.
pub fn energy_trend(logs: &[DailyLog], today: NaiveDate) -> EnergyTrend {
    let month = MonthKey::of(today);
    let current = averages(logs_in_month(logs, month)).energy;

    let previous_logs = month
        .previous()
        .map(|prev| logs_in_month(logs, prev))
        .unwrap_or_default();
    let previous = if previous_logs.is_empty() {
        current
    } else {
        averages(previous_logs).energy
    };

    if current > previous {
        EnergyTrend::Improving
    } else if current < previous {
        EnergyTrend::Declining
    } else {
        EnergyTrend::Stable
    }
}

/// Count logs per mood
pub fn mood_distribution<'a, I>(logs: I) -> MoodDistribution
where
    I: IntoIterator<Item = &'a DailyLog>,
{
    let mut distribution = MoodDistribution::default();
    for log in logs {
        distribution.increment(log.mood);
    }
    distribution
}

/// Rank symptoms by the number of logs that report them.
///
/// A symptom repeated inside one log counts once. Ties keep the order in which
/// symptoms were first encountered.
pub fn symptom_frequency<'a, I>(logs: I, limit: usize) -> Vec<SymptomCount>
where
    I: IntoIterator<Item = &'a DailyLog>,
{
    let mut ranking: Vec<SymptomCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for log in logs {
        let mut seen_today: Vec<&str> = Vec::with_capacity(log.symptoms.len());
        for symptom in &log.symptoms {
            if seen_today.contains(&symptom.as_str()) {
                continue;
            }
            seen_today.push(symptom.as_str());

            match index.get(symptom.as_str()).copied() {
                Some(i) => ranking[i].count += 1,
                None => {
                    index.insert(symptom.as_str(), ranking.len());
                    ranking.push(SymptomCount {
                        symptom: symptom.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    // Stable sort keeps first-encountered order among equal counts
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking.truncate(limit);
    ranking
}

/// Percent of elapsed days in the current month that have a log.
///
/// The denominator is the day of month of `today`, not the month length.
pub fn consistency_rate(logs: &[DailyLog], today: NaiveDate) -> u32 {
    let logged = logs_in_month(logs, MonthKey::of(today)).len() as f64;
    (logged / f64::from(today.day()) * 100.0).round() as u32
}

/// Logs dated from `days` days before `today` up to `today`, ascending by date
pub fn rolling_window(logs: &[DailyLog], today: NaiveDate, days: i64) -> Vec<DailyLog> {
    let mut window: Vec<DailyLog> = logs
        .iter()
        .filter(|log| {
            let age = today.signed_duration_since(log.date).num_days();
            (0..=days).contains(&age)
        })
        .cloned()
        .collect();
    window.sort_by_key(|log| log.date);
    window
}
