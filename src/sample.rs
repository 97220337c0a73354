//! Bootstrap sample data
//!
//! Generates about two months of plausible daily logs ending at `today`, so a
//! fresh install has something to chart. Generation is seeded and therefore
//! reproducible.

use crate::cycle::phase_for;
use crate::growth::plant_for_month;
use crate::types::{CycleData, CyclePhase, DailyLog, Mood, MonthKey, Snapshot};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

/// Days of history generated before `today`
pub const SAMPLE_HISTORY_DAYS: i64 = 60;

/// Share of days that get a log
const LOGGED_DAY_PROBABILITY: f64 = 0.85;

/// Days between the sample period start and `today`
const SAMPLE_PERIOD_OFFSET_DAYS: i64 = 10;

/// Generate a sample snapshot ending at `today`
pub fn generate(today: NaiveDate, seed: u64) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let period_start = today
        .checked_sub_signed(Duration::days(SAMPLE_PERIOD_OFFSET_DAYS))
        .unwrap_or(today);

    let mut daily_logs = Vec::new();
    for offset in (0..=SAMPLE_HISTORY_DAYS).rev() {
        let Some(date) = today.checked_sub_signed(Duration::days(offset)) else {
            continue;
        };
        if !rng.gen_bool(LOGGED_DAY_PROBABILITY) {
            continue;
        }
        if let Some(log) = sample_log(&mut rng, date, period_start) {
            daily_logs.push(log);
        }
    }

    let current = MonthKey::of(today);
    let mut months = vec![current];
    for _ in 0..2 {
        if let Some(prev) = months.last().and_then(|m| m.previous()) {
            months.push(prev);
        }
    }
    months.reverse();

    let plants = months
        .into_iter()
        .map(|month| plant_for_month(month, &daily_logs))
        .collect();

    Snapshot {
        daily_logs,
        cycle_data: Some(CycleData {
            period_start_date: period_start,
        }),
        plants,
    }
}

fn sample_log(rng: &mut StdRng, date: NaiveDate, period_start: NaiveDate) -> Option<DailyLog> {
    let position = phase_for(period_start, date);

    // Energy dips during the period and late luteal days, peaks at ovulation
    let base_energy: i32 = match position.phase {
        CyclePhase::Period => 2,
        CyclePhase::Ovulation => 4,
        CyclePhase::Luteal if position.cycle_day > 24 => 2,
        _ => 3,
    };
    let energy = (base_energy + rng.gen_range(-1..=0)).clamp(1, 5);
    let mood_index = (4 - energy + rng.gen_range(0..=1)).clamp(0, 4) as usize;

    let symptoms = if rng.gen_bool(0.5) {
        let count = rng.gen_range(1..=2);
        ["Hot flashes", "Fatigue"][..count]
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        Vec::new()
    };
    let keyword_count = rng.gen_range(1..=2);
    let keywords = ["Peaceful", "Productive"][..keyword_count]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let created_at = Utc.from_utc_datetime(&date.and_hms_opt(20, 0, 0)?);

    Some(DailyLog {
        id: Builder::from_random_bytes(rng.gen()).into_uuid(),
        date,
        mood: Mood::ALL[mood_index],
        energy: energy as u8,
        movement: rng.gen_range(40..100),
        nutrition: rng.gen_range(50..100),
        sleep: rng.gen_range(50..90),
        symptoms,
        keywords,
        created_at,
    })
}
