//! Bloom Core - On-device analytics for a daily wellness journal
//!
//! Bloom turns daily self-reports (mood, energy, movement, nutrition, sleep,
//! symptoms) into derived values: the current menstrual cycle phase, a monthly
//! "plant" growth score, monthly insights, and a plain-text briefing for a chat
//! assistant. Everything is a deterministic function of the stored logs and an
//! explicit `today`.
//!
//! ## Modules
//!
//! - **Store**: Day-keyed log store with JSON snapshot persistence
//! - **Cycle**: Fixed 28-day phase calculator
//! - **Growth**: Monthly plant score and garden summary
//! - **Insights**: Monthly averages, trends and distributions
//! - **Context**: Briefing text for the chat assistant

pub mod context;
pub mod cycle;
pub mod error;
pub mod growth;
pub mod insights;
pub mod sample;
pub mod store;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use context::{build_context, ChatContext};
pub use cycle::{phase_for, CyclePosition};
pub use error::{BloomError, ValidationError};
pub use growth::{growth_score, GardenSummary, PlantStage};
pub use insights::InsightsReport;
pub use store::LogStore;
pub use types::{
    CycleData, CyclePhase, DailyLog, EnergyTrend, Mood, MonthKey, NewDailyLog, PlantData, Snapshot,
};

/// Bloom library version
pub const BLOOM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name recorded by tooling
pub const PRODUCER_NAME: &str = "bloom-core";
