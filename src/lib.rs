// Copyright 2025 Cowboy AI, LLC.

//! # CIM Mixin
//!
//! Mixin configuration resolution and type composition for the Composable
//! Information Machine.
//!
//! A target type acquires state and behavior from independently authored
//! mixin types without changing its own definition. The crate turns a
//! declarative configuration into one composite runtime type:
//! - **Configuration Model**: value-equal [`ClassContext`]s of mixin declarations
//! - **Dependency Resolver**: a deterministic, cycle-checked composition order
//! - **Override Resolver**: override chains and introduced interfaces, with
//!   every conflict reported at once
//! - **Composite Type Builder**: dispatch tables with base-call continuations
//! - **Composition Cache**: at most one build per distinct configuration
//!
//! ## Design Principles
//!
//! 1. **Nominal Types**: types are identified by full name and known up front
//! 2. **Determinism**: equal configurations always resolve identically
//! 3. **Last Is Outermost**: the mixin composed last runs first and calls
//!    `base` to reach the earlier ones
//! 4. **Explicit State**: no global configuration; contexts are passed in
//! 5. **Typed Failures**: configuration, validation and code generation
//!    errors never overlap
//!
//! ```rust
//! use cim_mixin::{ClassContext, CompositionCache, MemberSignature, TypeDefinition};
//! use serde_json::json;
//!
//! let describe = MemberSignature::method("describe").returns("string");
//! let order = TypeDefinition::class("Shop.Order")
//!     .virtual_method(describe.clone(), |_, _| Ok(json!("order")))
//!     .build();
//! let audit = TypeDefinition::class("Shop.Audit")
//!     .override_member(describe, |inv, args| {
//!         let inner = inv.base(args)?;
//!         Ok(json!(format!("audited {}", inner.as_str().unwrap_or_default())))
//!     })
//!     .build();
//!
//! let context = ClassContext::builder(&order).uses(&audit).build().unwrap();
//! let cache = CompositionCache::default();
//! let composite = cache.get_or_create(&context).unwrap();
//!
//! let instance = composite.create_instance();
//! assert_eq!(instance.call("describe", &[]).unwrap(), json!("audited order"));
//! ```

#![warn(missing_docs)]

mod errors;

pub mod cache;
pub mod codegen;
pub mod config;
pub mod context;
pub mod mixer;
pub mod observer;
pub mod resolution;
pub mod types;

pub use errors::{
    CodeGenerationError, ConfigurationError, ErrorKind, InvocationError, InvocationResult,
    MixinError, MixinResult, ValidationError, ValidationReport,
};

pub use cache::CompositionCache;
pub use codegen::{
    ChainLink, CompositeInstance, CompositeType, CompositeTypeBuilder, DispatchEntry, DispatchTable,
    GenerationLimits, InterfaceForwarder, InterfaceView, Invocation, MixinInstance,
};
pub use config::{ConfigError, EngineConfig, MixerConfig};
pub use context::{
    ClassContext, ClassContextBuilder, ConfigurationSource, IntroducedMemberVisibility,
    MixinConfiguration, MixinConfigurationBuilder, MixinDeclaration, MixinKind,
    StaticConfigurationSource,
};
pub use mixer::{MixFailure, MixedComposition, Mixer, MixerReport};
pub use observer::{CompositionObserver, CountingObserver, TracingObserver};
pub use resolution::{validate_and_resolve, ChainEntry, CompositionPlan, ResolvedComposition};
pub use types::{
    body, InstanceState, MemberBody, MemberDefinition, MemberModifiers, MemberSignature,
    OverrideDefinition, TypeBuilder, TypeDefinition, TypeKind, TypeRef, Visibility,
};
