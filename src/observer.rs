// Copyright 2025 Cowboy AI, LLC.

//! Progress hooks for composition attempts
//!
//! The cache calls every registered observer once per `get_or_create`
//! attempt, whether it hit, built or failed. Observers see only the context
//! and the error, never resolver internals.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use crate::context::ClassContext;
use crate::errors::MixinError;

/// Receives one notification per composition attempt
#[cfg_attr(test, mockall::automock)]
pub trait CompositionObserver: Send + Sync {
    /// A composition attempt for `context` finished, successfully or not
    fn on_context_processed(&self, context: &ClassContext);

    /// The attempt for `context` failed; called before `on_context_processed`
    fn on_context_failed(&self, context: &ClassContext, error: &MixinError) {
        let _ = (context, error);
    }
}

/// Reports attempts through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CompositionObserver for TracingObserver {
    fn on_context_processed(&self, context: &ClassContext) {
        info!(
            target_type = %context.target_type(),
            mixins = context.len(),
            "class context processed"
        );
    }

    fn on_context_failed(&self, context: &ClassContext, error: &MixinError) {
        warn!(
            target_type = %context.target_type(),
            kind = ?error.kind(),
            error = %error,
            "class context failed"
        );
    }
}

/// Counts attempts and failures
#[derive(Debug, Default)]
pub struct CountingObserver {
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl CountingObserver {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts seen so far
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Failed attempts seen so far
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl CompositionObserver for CountingObserver {
    fn on_context_processed(&self, _context: &ClassContext) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_context_failed(&self, _context: &ClassContext, _error: &MixinError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigurationError;
    use crate::types::TypeDefinition;

    #[test]
    fn test_counting_observer() {
        let target = TypeDefinition::class("T").build();
        let context = ClassContext::builder(&target).build().unwrap();
        let observer = CountingObserver::new();

        observer.on_context_processed(&context);
        observer.on_context_failed(
            &context,
            &MixinError::from(ConfigurationError::MixinIsTarget {
                mixin: "T".to_string(),
            }),
        );
        observer.on_context_processed(&context);

        assert_eq!(observer.processed(), 2);
        assert_eq!(observer.failed(), 1);
    }
}
