// Copyright 2025 Cowboy AI, LLC.

//! Explicit collection of class contexts
//!
//! A [`MixinConfiguration`] is an ordinary value handed to whoever needs it.
//! There is no process-wide "active" configuration.

use std::collections::BTreeMap;

use super::class_context::ClassContext;
use super::mixin_declaration::MixinDeclaration;
use crate::errors::ConfigurationError;
use crate::types::TypeRef;

/// Class contexts keyed by target type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixinConfiguration {
    contexts: BTreeMap<TypeRef, ClassContext>,
}

impl MixinConfiguration {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fluent configuration
    ///
    /// # Example
    ///
    /// ```
    /// use cim_mixin::{MixinConfiguration, TypeDefinition};
    ///
    /// let order = TypeDefinition::class("Order").build();
    /// let audit = TypeDefinition::class("Audit").build();
    ///
    /// let configuration = MixinConfiguration::builder()
    ///     .for_class(&order)
    ///     .add_mixin(&audit)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(configuration.class_context(&order).unwrap().contains_mixin(&audit));
    /// ```
    pub fn builder() -> MixinConfigurationBuilder {
        MixinConfigurationBuilder::default()
    }

    /// Add or replace the context for its target
    pub fn insert(&mut self, context: ClassContext) -> Option<ClassContext> {
        self.contexts.insert(context.target_type().clone(), context)
    }

    /// Context for a target type
    pub fn class_context(&self, target: &TypeRef) -> Option<&ClassContext> {
        self.contexts.get(target)
    }

    /// Every context, ordered by target name
    pub fn class_contexts(&self) -> impl Iterator<Item = &ClassContext> {
        self.contexts.values()
    }

    /// Number of configured targets
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether no targets are configured
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl FromIterator<ClassContext> for MixinConfiguration {
    fn from_iter<I: IntoIterator<Item = ClassContext>>(iter: I) -> Self {
        let mut configuration = MixinConfiguration::new();
        for context in iter {
            configuration.insert(context);
        }
        configuration
    }
}

/// Fluent builder for [`MixinConfiguration`]
#[derive(Debug, Default)]
pub struct MixinConfigurationBuilder {
    targets: BTreeMap<TypeRef, Vec<MixinDeclaration>>,
    current: Option<TypeRef>,
    orphaned: Option<MixinDeclaration>,
}

impl MixinConfigurationBuilder {
    /// Select the target subsequent declarations apply to
    pub fn for_class(mut self, target: &TypeRef) -> Self {
        self.targets.entry(target.clone()).or_default();
        self.current = Some(target.clone());
        self
    }

    /// Declare that the current target uses `mixin`
    pub fn add_mixin(self, mixin: &TypeRef) -> Self {
        self.add_declaration(MixinDeclaration::used(mixin))
    }

    /// Declare several mixins for the current target
    pub fn add_mixins<'a, I>(self, mixins: I) -> Self
    where
        I: IntoIterator<Item = &'a TypeRef>,
    {
        mixins.into_iter().fold(self, |builder, m| builder.add_mixin(m))
    }

    /// Add a full declaration for the current target
    pub fn add_declaration(mut self, declaration: MixinDeclaration) -> Self {
        match &self.current {
            Some(target) => self.targets.entry(target.clone()).or_default().push(declaration),
            None => {
                if self.orphaned.is_none() {
                    self.orphaned = Some(declaration);
                }
            }
        }
        self
    }

    /// Validate every target and build the configuration
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] in target-name order, or an
    /// `InvalidMixin` error when a mixin was added before any `for_class`.
    pub fn build(self) -> Result<MixinConfiguration, ConfigurationError> {
        if let Some(orphan) = self.orphaned {
            return Err(ConfigurationError::InvalidMixin {
                target: "<none>".to_string(),
                mixin: orphan.mixin_type().name().to_string(),
                reason: "declared before any target was selected".to_string(),
            });
        }

        let mut configuration = MixinConfiguration::new();
        for (target, declarations) in self.targets {
            configuration.insert(ClassContext::new(&target, declarations)?);
        }
        Ok(configuration)
    }
}
