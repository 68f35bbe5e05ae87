// Copyright 2025 Cowboy AI, LLC.

//! Composition cache
//!
//! Memoizes composite types by [`ClassContext`] value. Each key owns a build
//! slot guarded by its own mutex: the first caller for a key resolves and
//! builds while holding the slot, later callers for the same key block on
//! it and receive the stored handle. Distinct keys never share a slot.
//!
//! ```mermaid
//! sequenceDiagram
//!     participant A as Caller A
//!     participant B as Caller B
//!     participant S as Slot(C)
//!     A->>S: lock
//!     B->>S: lock (blocks)
//!     A->>A: resolve + build
//!     A->>S: store, unlock
//!     S-->>B: stored CompositeType
//! ```
//!
//! # Generations
//!
//! [`CompositionCache::reset`] drops every entry and starts a new generation.
//! Handles obtained before a reset stay valid and usable, but they are
//! distinct from the handles built afterwards for the same context. Mixing
//! pre- and post-reset handles (for example comparing instances across them)
//! is a caller error that the cache does not detect.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::codegen::{CompositeType, CompositeTypeBuilder};
use crate::config::EngineConfig;
use crate::context::ClassContext;
use crate::errors::{MixinError, MixinResult};
use crate::observer::CompositionObserver;
use crate::resolution::{self, ResolvedComposition};

type BuildSlot = Arc<Mutex<Option<CompositeType>>>;

/// Thread-safe memo of composite types keyed by class context value
pub struct CompositionCache {
    entries: DashMap<ClassContext, BuildSlot>,
    generation: AtomicU64,
    builds: AtomicUsize,
    builder: CompositeTypeBuilder,
    observers: RwLock<Vec<Arc<dyn CompositionObserver>>>,
}

impl CompositionCache {
    /// Create an empty cache
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_builder(CompositeTypeBuilder::new(config.limits()).with_logging(config.log_compositions))
    }

    /// Create an empty cache around a configured builder
    pub fn with_builder(builder: CompositeTypeBuilder) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            builds: AtomicUsize::new(0),
            builder,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for every subsequent attempt
    pub fn add_observer(&self, observer: Arc<dyn CompositionObserver>) {
        self.observers.write().push(observer);
    }

    /// Validate and resolve without touching the cache
    pub fn validate_and_resolve(&self, context: &ClassContext) -> MixinResult<ResolvedComposition> {
        resolution::validate_and_resolve(context)
    }

    /// Return the composite type for `context`, building it at most once
    ///
    /// Failed attempts are not cached; the next call for the same context
    /// tries again.
    ///
    /// # Errors
    ///
    /// Any [`MixinError`] produced by resolution or code generation.
    pub fn get_or_create(&self, context: &ClassContext) -> MixinResult<CompositeType> {
        let result = self.lookup_or_build(context);

        let observers = self.observers.read().clone();
        if let Err(error) = &result {
            for observer in &observers {
                observer.on_context_failed(context, error);
            }
        }
        for observer in &observers {
            observer.on_context_processed(context);
        }

        result
    }

    fn lookup_or_build(&self, context: &ClassContext) -> Result<CompositeType, MixinError> {
        let slot = match self.entries.get(context) {
            Some(existing) => Arc::clone(existing.value()),
            None => Arc::clone(self.entries.entry(context.clone()).or_default().value()),
        };

        let mut guard = slot.lock();
        if let Some(composite) = guard.as_ref() {
            debug!(target_type = %context.target_type(), composite = %composite, "cache hit");
            return Ok(composite.clone());
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let resolved = resolution::validate_and_resolve(context)?;
        let composite = self.builder.build(&resolved, generation)?;

        self.builds.fetch_add(1, Ordering::SeqCst);
        *guard = Some(composite.clone());
        Ok(composite)
    }

    /// Drop every cached entry and start a new generation
    pub fn reset(&self) {
        let dropped = self.len();
        self.entries.clear();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(dropped, generation, "composition cache reset");
    }

    /// Current generation; starts at zero and grows with every reset
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Number of composite types built since creation
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Number of cached composite types; builds in progress are not counted
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().try_lock().is_some_and(|slot| slot.is_some()))
            .count()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached handle for `context`, without building
    pub fn get(&self, context: &ClassContext) -> Option<CompositeType> {
        let slot = self.entries.get(context).map(|entry| Arc::clone(entry.value()))?;
        let guard = slot.try_lock()?;
        guard.clone()
    }
}

impl Default for CompositionCache {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl std::fmt::Debug for CompositionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionCache")
            .field("entries", &self.entries.len())
            .field("generation", &self.generation())
            .field("builds", &self.build_count())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}
