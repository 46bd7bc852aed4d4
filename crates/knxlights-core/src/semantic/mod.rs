//! Light fixture inference over a linked [`KnxProject`](crate::knx::KnxProject).

pub mod analyzer;
pub mod characteristics;
pub mod convention;
pub mod fixtures;
pub mod heuristic;
pub mod text;

pub use analyzer::{AnalysisState, AnalyzerConfig, KnxProjectAnalyzer, DEFAULT_WARNING_RATIO_THRESHOLD};
pub use characteristics::{fill_in_from_communication_objects, has_primary_switch_type, KnxProjectCharacteristics};
pub use convention::{NamingConvention, DEFAULT_PREFIX_MATCH_THRESHOLD};
pub use fixtures::{DimmableLight, Fixture, Light};
pub use heuristic::HeuristicCharacteristics;
pub use text::TextAnalyzer;
