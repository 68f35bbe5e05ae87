// Copyright 2025 Cowboy AI, LLC.

//! Batch driver
//!
//! Drains a [`ConfigurationSource`] through a shared [`CompositionCache`],
//! building several contexts at once. A failing context is recorded and the
//! run continues with the rest. Builds are blocking work, so each one runs
//! on the blocking thread pool.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::CompositionCache;
use crate::config::MixerConfig;
use crate::context::ConfigurationSource;
use crate::errors::ErrorKind;
use crate::resolution::CompositionPlan;

/// One successfully composed context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MixedComposition {
    /// Id of the composite build
    pub composite_id: Uuid,
    /// Generated type name
    pub composite_name: String,
    /// Composition decisions
    pub plan: CompositionPlan,
}

/// One context that could not be composed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MixFailure {
    /// Target type name
    pub target_type: String,
    /// Error kind; `None` when the build task itself aborted
    pub kind: Option<ErrorKind>,
    /// Rendered error
    pub message: String,
}

/// Outcome of one [`Mixer::run`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MixerReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Composed contexts, ordered by composite name
    pub successes: Vec<MixedComposition>,
    /// Failed contexts, ordered by target name
    pub failures: Vec<MixFailure>,
}

impl MixerReport {
    /// Contexts seen
    pub fn processed(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Whether every context composed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Feeds many class contexts through one cache
#[derive(Debug, Clone)]
pub struct Mixer {
    cache: Arc<CompositionCache>,
    config: MixerConfig,
}

impl Mixer {
    /// Create a driver over `cache`
    pub fn new(cache: Arc<CompositionCache>, config: MixerConfig) -> Self {
        Self { cache, config }
    }

    /// The shared cache
    pub fn cache(&self) -> &Arc<CompositionCache> {
        &self.cache
    }

    /// Compose every context `source` yields
    pub async fn run(&self, source: &dyn ConfigurationSource) -> MixerReport {
        let started_at = Utc::now();
        let concurrency = self.config.concurrency.max(1);

        let outcomes: Vec<_> = source
            .discover()
            .map(|context| {
                let cache = Arc::clone(&self.cache);
                async move {
                    let target = context.target_type().name().to_string();
                    let outcome = tokio::task::spawn_blocking(move || cache.get_or_create(&context)).await;
                    (target, outcome)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (target_type, outcome) in outcomes {
            match outcome {
                Ok(Ok(composite)) => successes.push(MixedComposition {
                    composite_id: composite.id(),
                    composite_name: composite.name().to_string(),
                    plan: composite.plan().clone(),
                }),
                Ok(Err(error)) => {
                    warn!(target_type = %target_type, kind = ?error.kind(), error = %error, "composition failed");
                    failures.push(MixFailure {
                        target_type,
                        kind: Some(error.kind()),
                        message: error.to_string(),
                    });
                }
                Err(join_error) => {
                    warn!(target_type = %target_type, error = %join_error, "composition task aborted");
                    failures.push(MixFailure {
                        target_type,
                        kind: None,
                        message: join_error.to_string(),
                    });
                }
            }
        }

        successes.sort_by(|a, b| a.composite_name.cmp(&b.composite_name));
        failures.sort_by(|a, b| a.target_type.cmp(&b.target_type));

        let report = MixerReport {
            started_at,
            finished_at: Utc::now(),
            successes,
            failures,
        };
        info!(
            processed = report.processed(),
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            "mixer run finished"
        );
        report
    }
}
