//! Core types for Bloom Core
//!
//! This module defines the records the log store owns (daily logs, cycle data,
//! monthly plants), the persistence snapshot, and the small value types shared by
//! the derived-analytics functions.

use crate::error::ValidationError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Symptoms a daily log may carry
pub const SYMPTOM_OPTIONS: &[&str] = &[
    "Hot flashes",
    "Night sweats",
    "Mood swings",
    "Brain fog",
    "Fatigue",
    "Sleep issues",
    "Anxiety",
    "Joint pain",
    "Headaches",
    "Bloating",
];

/// Keywords a daily log may be tagged with
pub const KEYWORD_OPTIONS: &[&str] = &[
    "Productive",
    "Peaceful",
    "Connected",
    "Creative",
    "Energetic",
    "Restful",
    "Social",
    "Reflective",
    "Challenging",
    "Accomplishment",
];

/// Maximum number of keywords per daily log
pub const MAX_KEYWORDS: usize = 3;

/// Self-reported mood, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Radiant,
    Good,
    Okay,
    Low,
    Struggling,
}

impl Mood {
    /// All moods, best first
    pub const ALL: [Mood; 5] = [
        Mood::Radiant,
        Mood::Good,
        Mood::Okay,
        Mood::Low,
        Mood::Struggling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Radiant => "radiant",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Low => "low",
            Mood::Struggling => "struggling",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Radiant => "Radiant",
            Mood::Good => "Good",
            Mood::Okay => "Okay",
            Mood::Low => "Low",
            Mood::Struggling => "Struggling",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownMood(s.to_string()))
    }
}

/// Phase of the (fixed-length) reproductive cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Period,
    Follicular,
    Ovulation,
    Luteal,
}

impl CyclePhase {
    pub const ALL: [CyclePhase; 4] = [
        CyclePhase::Period,
        CyclePhase::Follicular,
        CyclePhase::Ovulation,
        CyclePhase::Luteal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Period => "period",
            CyclePhase::Follicular => "follicular",
            CyclePhase::Ovulation => "ovulation",
            CyclePhase::Luteal => "luteal",
        }
    }

    /// Human-facing phase name
    pub fn display_name(&self) -> &'static str {
        match self {
            CyclePhase::Period => "Menstrual",
            CyclePhase::Follicular => "Follicular",
            CyclePhase::Ovulation => "Ovulation",
            CyclePhase::Luteal => "Luteal",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the month-over-month energy average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyTrend {
    Improving,
    Stable,
    Declining,
}

impl EnergyTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyTrend::Improving => "improving",
            EnergyTrend::Stable => "stable",
            EnergyTrend::Declining => "declining",
        }
    }
}

/// Calendar month key, printed and parsed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ValidationError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Number of days in this month (Gregorian)
    pub fn days_in_month(&self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// The month before this one, crossing year boundaries
    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year - 1, 12).ok()
        } else {
            Self::new(self.year, self.month - 1).ok()
        }
    }

    /// Every date of the month, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let (year, month) = (self.year, self.month);
        (1..=self.days_in_month()).filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Parse an ISO `YYYY-MM-DD` calendar date
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// A stored daily log. At most one exists per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    /// Identity of this version of the log; replaced on every overwrite
    pub id: Uuid,
    pub date: NaiveDate,
    pub mood: Mood,
    /// 1-5
    pub energy: u8,
    /// 0-100
    pub movement: u8,
    /// 0-100
    pub nutrition: u8,
    /// 0-100
    pub sleep: u8,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied content of a daily log, before the store stamps identity and time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDailyLog {
    pub date: NaiveDate,
    pub mood: Mood,
    pub energy: u8,
    pub movement: u8,
    pub nutrition: u8,
    pub sleep: u8,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl NewDailyLog {
    /// Check numeric ranges and tag vocabularies
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=5).contains(&self.energy) {
            return Err(ValidationError::EnergyOutOfRange(self.energy));
        }

        for (field, value) in [
            ("movement", self.movement),
            ("nutrition", self.nutrition),
            ("sleep", self.sleep),
        ] {
            if value > 100 {
                return Err(ValidationError::PercentOutOfRange { field, value });
            }
        }

        if let Some(unknown) = self
            .symptoms
            .iter()
            .find(|s| !SYMPTOM_OPTIONS.contains(&s.as_str()))
        {
            return Err(ValidationError::UnknownSymptom(unknown.clone()));
        }

        if let Some(unknown) = self
            .keywords
            .iter()
            .find(|k| !KEYWORD_OPTIONS.contains(&k.as_str()))
        {
            return Err(ValidationError::UnknownKeyword(unknown.clone()));
        }

        let keywords = dedup_preserving_order(&self.keywords);
        if keywords.len() > MAX_KEYWORDS {
            return Err(ValidationError::TooManyKeywords {
                max: MAX_KEYWORDS,
                actual: keywords.len(),
            });
        }

        Ok(())
    }

    /// Validate and turn into a stored log with a fresh identity
    pub fn into_log(self, created_at: DateTime<Utc>) -> Result<DailyLog, ValidationError> {
        self.validate()?;
        Ok(DailyLog {
            id: Uuid::new_v4(),
            date: self.date,
            mood: self.mood,
            energy: self.energy,
            movement: self.movement,
            nutrition: self.nutrition,
            sleep: self.sleep,
            symptoms: dedup_preserving_order(&self.symptoms),
            keywords: dedup_preserving_order(&self.keywords),
            created_at,
        })
    }
}

impl From<&DailyLog> for NewDailyLog {
    fn from(log: &DailyLog) -> Self {
        Self {
            date: log.date,
            mood: log.mood,
            energy: log.energy,
            movement: log.movement,
            nutrition: log.nutrition,
            sleep: log.sleep,
            symptoms: log.symptoms.clone(),
            keywords: log.keywords.clone(),
        }
    }
}

fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

/// Reference start of the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleData {
    /// Most recent self-reported first day of bleeding
    pub period_start_date: NaiveDate,
}

/// Growth snapshot for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantData {
    pub month: MonthKey,
    /// 0-100
    pub growth_score: u8,
    pub days_logged: u32,
    pub total_days: u32,
}

/// Serializable state of a log store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub daily_logs: Vec<DailyLog>,
    #[serde(default)]
    pub cycle_data: Option<CycleData>,
    #[serde(default)]
    pub plants: Vec<PlantData>,
}
