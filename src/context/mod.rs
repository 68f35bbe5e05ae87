// Copyright 2025 Cowboy AI, LLC.

//! Configuration model
//!
//! Immutable value objects describing one target type's mixin set and the
//! cross-mixin rules. Construction validates primitive shape only; ordering
//! and member analysis belong to [`resolution`](crate::resolution).

pub mod class_context;
pub mod configuration;
pub mod mixin_declaration;
pub mod source;

pub use class_context::{ClassContext, ClassContextBuilder, ClassContextSummary};
pub use configuration::{MixinConfiguration, MixinConfigurationBuilder};
pub use mixin_declaration::{
    IntroducedMemberVisibility, MixinDeclaration, MixinDeclarationSummary, MixinKind,
};
pub use source::{ConfigurationSource, StaticConfigurationSource};
