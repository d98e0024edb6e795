//! Allocator: sticky variant resolution and conversion recording over an
//! `IExperimentStorage`.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vantage_core::config::AllocatorConfig;
use vantage_core::errors::{VantageError, VantageResult};
use vantage_core::models::{Assignment, ConversionOutcome, Experiment, ResolveOutcome};
use vantage_core::traits::{ConversionWrite, IExperimentStorage};
use vantage_core::{assignment_span, conversion_span, ErrorKind};

use crate::strategy::pick_variant;

/// Assigns visitors to variants and records their conversions.
///
/// Randomness comes from an RNG owned by the allocator, never from the
/// visitor id, so two visitors with similar ids are independent draws.
pub struct Allocator {
    store: Arc<dyn IExperimentStorage>,
    rng: Mutex<StdRng>,
    max_visitor_id_len: usize,
}

impl Allocator {
    /// Allocator with default settings and an entropy-seeded RNG.
    pub fn new(store: Arc<dyn IExperimentStorage>) -> Self {
        Self::from_config(store, &AllocatorConfig::default())
    }

    /// Allocator built from the `[allocator]` config section.
    pub fn from_config(store: Arc<dyn IExperimentStorage>, config: &AllocatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            rng: Mutex::new(rng),
            max_visitor_id_len: config.effective_max_visitor_id_len(),
        }
    }

    /// Allocator with a fixed seed, for reproducible tests.
    pub fn with_seed(store: Arc<dyn IExperimentStorage>, seed: u64) -> Self {
        Self::from_config(
            store,
            &AllocatorConfig {
                seed: Some(seed),
                ..AllocatorConfig::default()
            },
        )
    }

    pub fn max_visitor_id_len(&self) -> usize {
        self.max_visitor_id_len
    }

    /// Reject blank, oversized, or control-character visitor ids.
    pub fn validate_visitor_id(&self, visitor_id: &str) -> VantageResult<()> {
        if visitor_id.trim().is_empty() {
            return Err(VantageError::invalid_argument(
                "visitor_id",
                "must not be empty",
            ));
        }
        if visitor_id.len() > self.max_visitor_id_len {
            return Err(VantageError::invalid_argument(
                "visitor_id",
                format!("longer than {} bytes", self.max_visitor_id_len),
            ));
        }
        if visitor_id.chars().any(char::is_control) {
            return Err(VantageError::invalid_argument(
                "visitor_id",
                "contains control characters",
            ));
        }
        Ok(())
    }

    /// Return the visitor's variant, assigning one on first sight.
    ///
    /// Only Active experiments hand out variants. A concurrent first
    /// assignment for the same visitor is resolved by re-reading the row
    /// that won, so every caller sees the same variant.
    pub fn resolve_variant(
        &self,
        experiment_id: &str,
        visitor_id: &str,
    ) -> VantageResult<ResolveOutcome> {
        let _span = assignment_span!(experiment_id, visitor_id).entered();
        self.validate_visitor_id(visitor_id)?;

        let experiment = self.load_experiment(experiment_id)?;
        if !experiment.status.accepts_assignments() {
            return Err(VantageError::invalid_state(
                experiment_id,
                experiment.status,
                "assign visitors to",
            ));
        }

        if let Some(existing) = self.store.get_assignment(experiment_id, visitor_id)? {
            return Ok(ResolveOutcome {
                variant: existing.variant,
                is_new_assignment: false,
            });
        }

        let count = self.store.assignment_count(experiment_id)?;
        let variant = {
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            pick_variant(experiment.strategy, count, &mut *rng)
        };

        match self
            .store
            .insert_assignment(&Assignment::new(experiment_id, visitor_id, variant))
        {
            Ok(()) => {
                tracing::debug!(%variant, strategy = experiment.strategy.as_str(), "new assignment");
                Ok(ResolveOutcome {
                    variant,
                    is_new_assignment: true,
                })
            }
            Err(e) if e.kind() == ErrorKind::ConflictRetryable => {
                tracing::debug!("lost assignment race, re-reading winner");
                let winner = self
                    .store
                    .get_assignment(experiment_id, visitor_id)?
                    .ok_or(e)?;
                Ok(ResolveOutcome {
                    variant: winner.variant,
                    is_new_assignment: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Count the visitor's first conversion. Repeats are accepted but not counted.
    pub fn record_conversion(
        &self,
        experiment_id: &str,
        visitor_id: &str,
    ) -> VantageResult<ConversionOutcome> {
        let _span = conversion_span!(experiment_id, visitor_id).entered();
        self.validate_visitor_id(visitor_id)?;

        let experiment = self.load_experiment(experiment_id)?;
        if !experiment.status.accepts_conversions() {
            return Err(VantageError::invalid_state(
                experiment_id,
                experiment.status,
                "record conversions for",
            ));
        }

        match self
            .store
            .mark_converted(experiment_id, visitor_id, Utc::now())?
        {
            ConversionWrite::Recorded(variant) => {
                tracing::debug!(%variant, "conversion recorded");
                Ok(ConversionOutcome { recorded: true })
            }
            ConversionWrite::AlreadyConverted(_) => Ok(ConversionOutcome { recorded: false }),
            ConversionWrite::NoAssignment => Err(VantageError::ConversionWithoutExposure {
                experiment_id: experiment_id.to_string(),
                visitor_id: visitor_id.to_string(),
            }),
        }
    }

    fn load_experiment(&self, experiment_id: &str) -> VantageResult<Experiment> {
        if experiment_id.trim().is_empty() {
            return Err(VantageError::invalid_argument(
                "experiment_id",
                "must not be empty",
            ));
        }
        self.store
            .get_experiment(experiment_id)?
            .ok_or_else(|| VantageError::ExperimentNotFound {
                id: experiment_id.to_string(),
            })
    }
}
