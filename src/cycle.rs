//! Cycle phase calculation
//!
//! Maps a period start date and a target date to a phase and day-within-cycle.
//! The cycle length is fixed at 28 days; there is no per-user calibration.

use crate::types::{CyclePhase, MonthKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed cycle length in days
pub const CYCLE_LENGTH_DAYS: i64 = 28;

/// Position within the cycle for a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclePosition {
    pub phase: CyclePhase,
    /// 1-28
    pub cycle_day: u32,
}

/// One cell of the monthly cycle calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub phase: CyclePhase,
    pub cycle_day: u32,
}

/// Short guidance text shown alongside a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseGuide {
    pub name: &'static str,
    pub description: &'static str,
    pub energy_level: &'static str,
}

impl CyclePhase {
    /// Classify a cycle day. Days 1-5 period, 6-13 follicular, 14-16 ovulation,
    /// everything after is luteal.
    pub fn from_cycle_day(cycle_day: u32) -> Self {
        match cycle_day {
            0..=5 => CyclePhase::Period,
            6..=13 => CyclePhase::Follicular,
            14..=16 => CyclePhase::Ovulation,
            _ => CyclePhase::Luteal,
        }
    }

    pub fn guide(&self) -> PhaseGuide {
        match self {
            CyclePhase::Period => PhaseGuide {
                name: self.display_name(),
                description: "Your body is releasing and renewing. Honor this time of rest.",
                energy_level: "Lower energy is normal. Listen to your body.",
            },
            CyclePhase::Follicular => PhaseGuide {
                name: self.display_name(),
                description: "Energy begins to rise. A great time for new beginnings.",
                energy_level: "Energy gradually increases. You may feel more optimistic.",
            },
            CyclePhase::Ovulation => PhaseGuide {
                name: self.display_name(),
                description: "Peak energy and confidence. You may feel your most vibrant.",
                energy_level: "Highest energy of your cycle.",
            },
            CyclePhase::Luteal => PhaseGuide {
                name: self.display_name(),
                description: "Winding down. Focus on self-care and completion.",
                energy_level: "Energy gradually decreases. Prioritize rest.",
            },
        }
    }
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Phase and cycle day of `target` for a cycle that started on `period_start`.
///
/// Targets before the start wrap around, so the result is always defined.
pub fn phase_for(period_start: NaiveDate, target: NaiveDate) -> CyclePosition {
    let elapsed = days_between(period_start, target);
    let cycle_day = (elapsed.rem_euclid(CYCLE_LENGTH_DAYS) + 1) as u32;

    CyclePosition {
        phase: CyclePhase::from_cycle_day(cycle_day),
        cycle_day,
    }
}

/// Days until the next predicted period start (0 on cycle day 1)
pub fn days_until_next_period(period_start: NaiveDate, today: NaiveDate) -> u32 {
    let position = phase_for(period_start, today);
    if position.cycle_day == 1 {
        0
    } else {
        CYCLE_LENGTH_DAYS as u32 - position.cycle_day + 1
    }
}

/// Phase and cycle day for every date of `month`
pub fn month_calendar(period_start: NaiveDate, month: MonthKey) -> Vec<CalendarDay> {
    month
        .days()
        .map(|date| {
            let position = phase_for(period_start, date);
            CalendarDay {
                date,
                phase: position.phase,
                cycle_day: position.cycle_day,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_date_is_day_one() {
        let start = date(2024, 1, 1);
        let position = phase_for(start, start);
        assert_eq!(position.cycle_day, 1);
        assert_eq!(position.phase, CyclePhase::Period);
    }

    #[test]
    fn test_day_twenty_is_luteal() {
        let position = phase_for(date(2024, 1, 1), date(2024, 1, 20));
        assert_eq!(position.cycle_day, 20);
        assert_eq!(position.phase, CyclePhase::Luteal);
    }

    #[test]
    fn test_phase_boundaries() {
        let expected = [
            (1, CyclePhase::Period),
            (5, CyclePhase::Period),
            (6, CyclePhase::Follicular),
            (13, CyclePhase::Follicular),
            (14, CyclePhase::Ovulation),
            (16, CyclePhase::Ovulation),
            (17, CyclePhase::Luteal),
            (28, CyclePhase::Luteal),
        ];
        for (day, phase) in expected {
            assert_eq!(CyclePhase::from_cycle_day(day), phase, "cycle day {day}");
        }
    }

    #[test]
    fn test_cycle_day_always_in_range() {
        let start = date(2024, 3, 15);
        for offset in -400..400 {
            let target = start + Duration::days(offset);
            let day = phase_for(start, target).cycle_day;
            assert!((1..=28).contains(&day), "offset {offset} gave day {day}");
        }
    }

    #[test]
    fn test_periodic_over_28_days() {
        let start = date(2024, 3, 15);
        for offset in -60..60 {
            let target = start + Duration::days(offset);
            assert_eq!(
                phase_for(start, target),
                phase_for(start, target + Duration::days(28))
            );
        }
    }

    #[test]
    fn test_target_before_start_wraps() {
        // One day before the start is the last day of the previous cycle
        let position = phase_for(date(2024, 1, 10), date(2024, 1, 9));
        assert_eq!(position.cycle_day, 28);
        assert_eq!(position.phase, CyclePhase::Luteal);
    }

    #[test]
    fn test_days_until_next_period() {
        let start = date(2024, 1, 1);
        assert_eq!(days_until_next_period(start, start), 0);
        assert_eq!(days_until_next_period(start, date(2024, 1, 2)), 27);
        assert_eq!(days_until_next_period(start, date(2024, 1, 28)), 1);
        assert_eq!(days_until_next_period(start, date(2024, 1, 29)), 0);
    }

    #[test]
    fn test_month_calendar() {
        let start = date(2024, 2, 1);
        let calendar = month_calendar(start, MonthKey::new(2024, 2).unwrap());
        assert_eq!(calendar.len(), 29);
        assert_eq!(calendar[0].cycle_day, 1);
        assert_eq!(calendar[13].phase, CyclePhase::Ovulation);
        // Feb 29 is day 1 of the next cycle
        assert_eq!(calendar[28].cycle_day, 1);
    }

    #[test]
    fn test_guide_names_match_display() {
        for phase in CyclePhase::ALL {
            assert_eq!(phase.guide().name, phase.display_name());
        }
    }
}
