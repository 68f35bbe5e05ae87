// Copyright 2025 Cowboy AI, LLC.

//! Producers of class contexts
//!
//! Discovery (attribute scanning, config files, hand-built values) lives
//! outside the engine. The engine itself never calls a source; batch drivers
//! such as the [`Mixer`](crate::mixer::Mixer) do.

use futures::stream::{self, BoxStream, StreamExt};

use super::class_context::ClassContext;
use super::configuration::MixinConfiguration;

/// Something that can enumerate class contexts
pub trait ConfigurationSource: Send + Sync {
    /// Stream every context this source knows about
    fn discover(&self) -> BoxStream<'_, ClassContext>;
}

/// Source over a fixed list of contexts
#[derive(Debug, Clone, Default)]
pub struct StaticConfigurationSource {
    contexts: Vec<ClassContext>,
}

impl StaticConfigurationSource {
    /// Wrap a list of contexts
    pub fn new(contexts: Vec<ClassContext>) -> Self {
        Self { contexts }
    }
}

impl ConfigurationSource for StaticConfigurationSource {
    fn discover(&self) -> BoxStream<'_, ClassContext> {
        stream::iter(self.contexts.iter().cloned()).boxed()
    }
}

impl ConfigurationSource for MixinConfiguration {
    fn discover(&self) -> BoxStream<'_, ClassContext> {
        stream::iter(self.class_contexts().cloned()).boxed()
    }
}
