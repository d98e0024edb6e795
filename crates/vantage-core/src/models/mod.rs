pub mod assignment;
pub mod confidence_level;
pub mod event;
pub mod experiment;
pub mod results_report;
pub mod status;
pub mod strategy;
pub mod target;
pub mod variant;
pub mod winner_selection;

pub use assignment::{Assignment, ConversionOutcome, ResolveOutcome};
pub use confidence_level::ConfidenceLevel;
pub use event::{EventKind, ExperimentEvent};
pub use experiment::{Experiment, NewExperiment, VariantCounts, VariantStats};
pub use results_report::{Recommendation, ResultsReport, VariantResult};
pub use status::{ExperimentStatus, LifecycleOp, StatusTransition};
pub use strategy::AssignmentStrategy;
pub use target::{MatchType, UrlTarget};
pub use variant::Variant;
pub use winner_selection::WinnerSelection;
