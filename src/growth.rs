//! Monthly growth scoring
//!
//! Turns a month of daily logs into a 0-100 growth score. Consistency of logging
//! is weighted above the effort reported on any single day, and the score only
//! ever looks at the logs that exist: missed days slow growth but never subtract.

use crate::types::{DailyLog, MonthKey, PlantData};
use serde::{Deserialize, Serialize};

/// Weight of the consistency component
pub const CONSISTENCY_WEIGHT: f64 = 0.6;

/// Weight of the effort component
pub const EFFORT_WEIGHT: f64 = 0.4;

/// Score at which a month's plant counts as fully grown
pub const FULL_BLOOM_SCORE: u8 = 80;

/// Compute the growth score for one month of logs
///
/// Formula:
/// ```text
/// consistency = days_logged / days_in_month * 100
/// effort      = (avg(energy) / 5 * 100 + avg(movement) + avg(nutrition)) / 3
/// score       = round(0.6 * consistency + 0.4 * effort), clamped to 0..=100
/// ```
pub fn growth_score<'a, I>(logs: I, days_in_month: u32) -> u8
where
    I: IntoIterator<Item = &'a DailyLog>,
{
    let mut count = 0u32;
    let mut energy_sum = 0.0;
    let mut movement_sum = 0.0;
    let mut nutrition_sum = 0.0;

    for log in logs {
        count += 1;
        energy_sum += f64::from(log.energy);
        movement_sum += f64::from(log.movement);
        nutrition_sum += f64::from(log.nutrition);
    }

    if count == 0 || days_in_month == 0 {
        return 0;
    }

    let n = f64::from(count);
    let consistency = f64::from(count) / f64::from(days_in_month) * 100.0;
    let effort = ((energy_sum / n) / 5.0 * 100.0 + movement_sum / n + nutrition_sum / n) / 3.0;

    let score = (consistency * CONSISTENCY_WEIGHT + effort * EFFORT_WEIGHT).round();
    score.clamp(0.0, 100.0) as u8
}

/// Build the plant record for `month` from the logs that fall inside it
pub fn plant_for_month<'a, I>(month: MonthKey, logs: I) -> PlantData
where
    I: IntoIterator<Item = &'a DailyLog>,
{
    let month_logs: Vec<&DailyLog> = logs
        .into_iter()
        .filter(|log| month.contains(log.date))
        .collect();
    let total_days = month.days_in_month();

    PlantData {
        month,
        growth_score: growth_score(month_logs.iter().copied(), total_days),
        days_logged: month_logs.len() as u32,
        total_days,
    }
}

/// Visual stage of a month's plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantStage {
    Seed,
    Sprout,
    Growing,
    Budding,
    FullBloom,
}

impl PlantStage {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => PlantStage::Seed,
            20..=39 => PlantStage::Sprout,
            40..=59 => PlantStage::Growing,
            60..=79 => PlantStage::Budding,
            _ => PlantStage::FullBloom,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlantStage::Seed => "Seed",
            PlantStage::Sprout => "Sprout",
            PlantStage::Growing => "Growing",
            PlantStage::Budding => "Budding",
            PlantStage::FullBloom => "Full Bloom",
        }
    }
}

impl PlantData {
    pub fn stage(&self) -> PlantStage {
        PlantStage::from_score(self.growth_score)
    }
}

/// Totals across the garden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenSummary {
    /// Every stored log, including months without a plant record
    pub total_days_logged: u32,
    /// Rounded mean growth score over all plants (0 with no plants)
    pub average_growth: u8,
    /// Plants at or above the full-bloom score
    pub plants_grown: u32,
}

impl GardenSummary {
    pub fn new(logs: &[DailyLog], plants: &[PlantData]) -> Self {
        let total_days_logged = logs.len() as u32;
        let average_growth = if plants.is_empty() {
            0
        } else {
            let sum: u32 = plants.iter().map(|p| u32::from(p.growth_score)).sum();
            (f64::from(sum) / plants.len() as f64).round() as u8
        };
        let plants_grown = plants
            .iter()
            .filter(|p| p.growth_score >= FULL_BLOOM_SCORE)
            .count() as u32;

        Self {
            total_days_logged,
            average_growth,
            plants_grown,
        }
    }
}
