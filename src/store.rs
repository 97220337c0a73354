//! Log store
//!
//! The single owner of daily logs, cycle data and monthly plants. Writes go
//! through [`LogStore::upsert`] and [`LogStore::log_period_start`]; everything
//! else is a read. Whole records are replaced, never patched in place, and a
//! write that fails validation leaves the store as it was.

use crate::cycle::{phase_for, CyclePosition};
use crate::error::{BloomError, ValidationError};
use crate::growth::{growth_score, plant_for_month, GardenSummary};
use crate::insights::InsightsReport;
use crate::sample;
use crate::types::{CycleData, DailyLog, MonthKey, NewDailyLog, PlantData, Snapshot};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

/// In-memory store of one user's wellness history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogStore {
    /// Sorted ascending by date, unique per date
    logs: Vec<DailyLog>,
    cycle: Option<CycleData>,
    /// Sorted ascending by month, unique per month
    plants: Vec<PlantData>,
}

impl LogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with generated sample history ending at `today`
    pub fn with_sample_data(today: NaiveDate, seed: u64) -> Self {
        Self::from_snapshot(sample::generate(today, seed))
    }

    /// Restore a store from a persisted snapshot.
    ///
    /// Duplicate dates (or months) keep the entry that appears last.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut logs: Vec<DailyLog> = Vec::with_capacity(snapshot.daily_logs.len());
        for log in snapshot.daily_logs {
            match logs.binary_search_by_key(&log.date, |l| l.date) {
                Ok(i) => {
                    warn!(date = %log.date, "duplicate daily log in snapshot, keeping the later entry");
                    logs[i] = log;
                }
                Err(i) => logs.insert(i, log),
            }
        }

        let mut plants: Vec<PlantData> = Vec::with_capacity(snapshot.plants.len());
        for plant in snapshot.plants {
            match plants.binary_search_by_key(&plant.month, |p| p.month) {
                Ok(i) => {
                    warn!(month = %plant.month, "duplicate plant in snapshot, keeping the later entry");
                    plants[i] = plant;
                }
                Err(i) => plants.insert(i, plant),
            }
        }

        Self {
            logs,
            cycle: snapshot.cycle_data,
            plants,
        }
    }

    /// Serializable copy of the whole store
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            daily_logs: self.logs.clone(),
            cycle_data: self.cycle,
            plants: self.plants.clone(),
        }
    }

    /// Load a store from snapshot JSON
    pub fn from_json(json: &str) -> Result<Self, BloomError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Serialize the store to snapshot JSON
    pub fn to_json(&self) -> Result<String, BloomError> {
        serde_json::to_string(&self.snapshot()).map_err(|e| BloomError::EncodingError(e.to_string()))
    }

    /// Replace the store contents with fresh sample data
    pub fn reset_to_sample_data(&mut self, today: NaiveDate, seed: u64) {
        *self = Self::with_sample_data(today, seed);
    }

    /// Write the log for a date, replacing any existing one.
    ///
    /// The stored log gets a new identity and `created_at = now`, and the plant
    /// for the log's month is recomputed from scratch.
    pub fn upsert(&mut self, entry: NewDailyLog, now: DateTime<Utc>) -> Result<&DailyLog, ValidationError> {
        let log = entry.into_log(now)?;
        let date = log.date;

        let index = match self.logs.binary_search_by_key(&date, |l| l.date) {
            Ok(i) => {
                debug!(%date, "replacing existing daily log");
                self.logs[i] = log;
                i
            }
            Err(i) => {
                self.logs.insert(i, log);
                i
            }
        };

        self.refresh_plant(MonthKey::of(date));
        Ok(&self.logs[index])
    }

    /// Record `date` as the start of the current period, overwriting the previous one
    pub fn log_period_start(&mut self, date: NaiveDate) {
        info!(%date, previous = ?self.cycle.map(|c| c.period_start_date), "period start logged");
        self.cycle = Some(CycleData {
            period_start_date: date,
        });
    }

    fn refresh_plant(&mut self, month: MonthKey) {
        let plant = plant_for_month(month, &self.logs);
        debug!(
            month = %month,
            growth_score = plant.growth_score,
            days_logged = plant.days_logged,
            "recomputed plant"
        );
        match self.plants.binary_search_by_key(&month, |p| p.month) {
            Ok(i) => self.plants[i] = plant,
            Err(i) => self.plants.insert(i, plant),
        }
    }

    pub fn get_by_date(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.logs
            .binary_search_by_key(&date, |l| l.date)
            .ok()
            .map(|i| &self.logs[i])
    }

    /// Logs of one month, ascending by date
    pub fn get_by_month(&self, month: MonthKey) -> Vec<&DailyLog> {
        self.logs.iter().filter(|l| month.contains(l.date)).collect()
    }

    pub fn get_plant(&self, month: MonthKey) -> Option<&PlantData> {
        self.plants
            .binary_search_by_key(&month, |p| p.month)
            .ok()
            .map(|i| &self.plants[i])
    }

    /// Plant of the month containing `today`; absent reads as a score of 0
    pub fn get_current_plant(&self, today: NaiveDate) -> Option<&PlantData> {
        self.get_plant(MonthKey::of(today))
    }

    pub fn today_log(&self, today: NaiveDate) -> Option<&DailyLog> {
        self.get_by_date(today)
    }

    /// Growth score for any month, computed from the current logs
    pub fn calculate_growth_score(&self, month: MonthKey) -> u8 {
        growth_score(self.get_by_month(month), month.days_in_month())
    }

    /// All logs, ascending by date
    pub fn logs(&self) -> &[DailyLog] {
        &self.logs
    }

    /// All plants, ascending by month
    pub fn plants(&self) -> &[PlantData] {
        &self.plants
    }

    pub fn cycle_data(&self) -> Option<&CycleData> {
        self.cycle.as_ref()
    }

    /// Phase and cycle day for `today`, if a period start has been logged
    pub fn current_position(&self, today: NaiveDate) -> Option<CyclePosition> {
        self.cycle
            .map(|cycle| phase_for(cycle.period_start_date, today))
    }

    pub fn insights(&self, today: NaiveDate) -> InsightsReport {
        InsightsReport::compute(&self.logs, today)
    }

    pub fn garden_summary(&self) -> GardenSummary {
        GardenSummary::new(&self.logs, &self.plants)
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.cycle.is_none() && self.plants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CyclePhase, Mood};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn entry(date: NaiveDate, mood: Mood, energy: u8) -> NewDailyLog {
        NewDailyLog {
            date,
            mood,
            energy,
            movement: 60,
            nutrition: 90,
            sleep: 75,
            symptoms: vec!["Fatigue".to_string()],
            keywords: vec!["Restful".to_string()],
        }
    }

    #[test]
    fn test_upsert_stores_and_returns_log() {
        let mut store = LogStore::new();
        let stored = store
            .upsert(entry(date(2024, 4, 1), Mood::Good, 3), at(2024, 4, 1, 9))
            .unwrap()
            .clone();

        assert_eq!(stored.created_at, at(2024, 4, 1, 9));
        assert_eq!(store.get_by_date(date(2024, 4, 1)), Some(&stored));
        assert_eq!(store.logs().len(), 1);
    }

    #[test]
    fn test_upsert_same_date_replaces() {
        let mut store = LogStore::new();
        let first = store
            .upsert(entry(date(2024, 4, 1), Mood::Good, 3), at(2024, 4, 1, 9))
            .unwrap()
            .clone();
        let second = store
            .upsert(entry(date(2024, 4, 1), Mood::Low, 2), at(2024, 4, 1, 21))
            .unwrap()
            .clone();

        assert_eq!(store.logs().len(), 1);
        let stored = store.get_by_date(date(2024, 4, 1)).unwrap();
        assert_eq!(stored.mood, Mood::Low);
        assert_eq!(stored.energy, 2);
        assert_eq!(stored.created_at, at(2024, 4, 1, 21));
        assert_ne!(stored.id, first.id);
        assert_eq!(stored.id, second.id);
    }

    #[test]
    fn test_rejected_write_leaves_state_unchanged() {
        let mut store = LogStore::new();
        store
            .upsert(entry(date(2024, 4, 1), Mood::Good, 3), at(2024, 4, 1, 9))
            .unwrap();
        let before = store.clone();

        let err = store
            .upsert(entry(date(2024, 4, 1), Mood::Good, 9), at(2024, 4, 1, 10))
            .unwrap_err();
        assert_eq!(err, ValidationError::EnergyOutOfRange(9));
        assert_eq!(store, before);
    }

    #[test]
    fn test_upsert_recomputes_plant() {
        let mut store = LogStore::new();
        let today = date(2024, 4, 3);
        assert!(store.get_current_plant(today).is_none());

        for day in 1..=3 {
            store
                .upsert(entry(date(2024, 4, day), Mood::Good, 3), at(2024, 4, day, 9))
                .unwrap();
        }

        let plant = store.get_current_plant(today).unwrap();
        assert_eq!(plant.days_logged, 3);
        assert_eq!(plant.total_days, 30);
        // consistency 10, effort 70 -> 34
        assert_eq!(plant.growth_score, 34);
        assert_eq!(store.plants().len(), 1);
        assert_eq!(
            store.calculate_growth_score(MonthKey::of(today)),
            plant.growth_score
        );
    }

    #[test]
    fn test_backdated_write_recomputes_its_own_month() {
        let mut store = LogStore::new();
        store
            .upsert(entry(date(2024, 4, 10), Mood::Good, 3), at(2024, 4, 10, 9))
            .unwrap();
        store
            .upsert(entry(date(2024, 5, 5), Mood::Good, 3), at(2024, 5, 5, 9))
            .unwrap();
        let may = MonthKey::new(2024, 5).unwrap();
        let may_before = *store.get_plant(may).unwrap();

        // Written in May, dated in April
        store
            .upsert(entry(date(2024, 4, 11), Mood::Good, 5), at(2024, 5, 20, 9))
            .unwrap();

        let april = store.get_plant(MonthKey::new(2024, 4).unwrap()).unwrap();
        assert_eq!(april.days_logged, 2);
        assert_eq!(april.growth_score, store.calculate_growth_score(april.month));
        assert_eq!(store.get_plant(may), Some(&may_before));
        assert_eq!(store.plants().len(), 2);
    }

    #[test]
    fn test_backdated_write_leaves_other_sample_plants() {
        let today = date(2024, 6, 15);
        let mut store = LogStore::with_sample_data(today, 11);
        let before = store.plants().to_vec();
        assert_eq!(before.len(), 3);

        let april = MonthKey::new(2024, 4).unwrap();
        store
            .upsert(entry(date(2024, 4, 10), Mood::Radiant, 5), at(2024, 6, 15, 9))
            .unwrap();

        let expected = plant_for_month(april, store.logs());
        assert_eq!(store.get_plant(april), Some(&expected));
        assert_eq!(expected.days_logged as usize, store.get_by_month(april).len());
        for plant in before.iter().filter(|p| p.month != april) {
            assert_eq!(store.get_plant(plant.month), Some(plant));
        }
    }

    #[test]
    fn test_garden_summary_counts_logs_without_plant() {
        let logs = vec![
            entry(date(2024, 3, 2), Mood::Okay, 3).into_log(at(2024, 3, 2, 9)).unwrap(),
            entry(date(2024, 4, 2), Mood::Okay, 3).into_log(at(2024, 4, 2, 9)).unwrap(),
        ];
        let plants = vec![plant_for_month(MonthKey::new(2024, 4).unwrap(), &logs)];
        let store = LogStore::from_snapshot(Snapshot {
            daily_logs: logs,
            cycle_data: None,
            plants,
        });

        let summary = store.garden_summary();
        assert_eq!(summary.total_days_logged, 2);
        assert_eq!(store.plants().len(), 1);
    }

    #[test]
    fn test_get_by_month_sorted() {
        let mut store = LogStore::new();
        for day in [9, 2, 30, 15] {
            store
                .upsert(entry(date(2024, 4, day), Mood::Okay, 3), at(2024, 4, 30, 9))
                .unwrap();
        }
        store
            .upsert(entry(date(2024, 5, 1), Mood::Okay, 3), at(2024, 5, 1, 9))
            .unwrap();

        let april: Vec<u32> = store
            .get_by_month(MonthKey::new(2024, 4).unwrap())
            .iter()
            .map(|l| chrono::Datelike::day(&l.date))
            .collect();
        assert_eq!(april, vec![2, 9, 15, 30]);
        assert!(store.get_by_month(MonthKey::new(2024, 6).unwrap()).is_empty());
    }

    #[test]
    fn test_log_period_start_overwrites() {
        let mut store = LogStore::new();
        assert!(store.current_position(date(2024, 1, 20)).is_none());

        store.log_period_start(date(2023, 12, 1));
        store.log_period_start(date(2024, 1, 1));

        assert_eq!(store.cycle_data().unwrap().period_start_date, date(2024, 1, 1));
        let position = store.current_position(date(2024, 1, 20)).unwrap();
        assert_eq!(position.cycle_day, 20);
        assert_eq!(position.phase, CyclePhase::Luteal);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = LogStore::with_sample_data(date(2024, 6, 15), 11);
        store
            .upsert(entry(date(2024, 6, 15), Mood::Radiant, 5), at(2024, 6, 15, 8))
            .unwrap();

        let json = store.to_json().unwrap();
        let loaded = LogStore::from_json(&json).unwrap();

        assert_eq!(loaded, store);
        assert_eq!(loaded.to_json().unwrap(), json);
        let day = date(2024, 6, 15);
        assert_eq!(
            serde_json::to_string(&loaded.get_by_date(day)).unwrap(),
            serde_json::to_string(&store.get_by_date(day)).unwrap()
        );
        let month = MonthKey::of(day);
        assert_eq!(
            serde_json::to_string(&loaded.get_by_month(month)).unwrap(),
            serde_json::to_string(&store.get_by_month(month)).unwrap()
        );
    }

    #[test]
    fn test_snapshot_shape_is_camel_case() {
        let mut store = LogStore::new();
        store.log_period_start(date(2024, 1, 1));
        store
            .upsert(entry(date(2024, 1, 2), Mood::Good, 3), at(2024, 1, 2, 9))
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(value["cycleData"]["periodStartDate"], "2024-01-01");
        assert_eq!(value["dailyLogs"][0]["date"], "2024-01-02");
        assert_eq!(value["dailyLogs"][0]["mood"], "good");
        assert!(value["dailyLogs"][0]["createdAt"].is_string());
        assert_eq!(value["plants"][0]["month"], "2024-01");
    }

    #[test]
    fn test_from_snapshot_dedups_dates() {
        let mut store = LogStore::new();
        store
            .upsert(entry(date(2024, 4, 1), Mood::Good, 3), at(2024, 4, 1, 9))
            .unwrap();
        let mut snapshot = store.snapshot();
        let mut later = snapshot.daily_logs[0].clone();
        later.mood = Mood::Low;
        snapshot.daily_logs.push(later);

        let loaded = LogStore::from_snapshot(snapshot);
        assert_eq!(loaded.logs().len(), 1);
        assert_eq!(loaded.logs()[0].mood, Mood::Low);
    }

    #[test]
    fn test_empty_store_reads() {
        let store = LogStore::new();
        let today = date(2024, 4, 10);
        assert!(store.is_empty());
        assert!(store.today_log(today).is_none());
        assert!(store.get_current_plant(today).is_none());
        assert_eq!(store.calculate_growth_score(MonthKey::of(today)), 0);
        assert_eq!(store.garden_summary().average_growth, 0);
    }

    #[test]
    fn test_reset_to_sample_data() {
        let mut store = LogStore::new();
        store.reset_to_sample_data(date(2024, 6, 15), 5);
        assert!(!store.logs().is_empty());
        assert!(store.cycle_data().is_some());
        assert_eq!(store, LogStore::with_sample_data(date(2024, 6, 15), 5));
    }
}
