// Copyright 2025 Cowboy AI, LLC.

//! Composite type generation
//!
//! The "generated type" is a data structure rather than emitted code: an
//! ordered list of bodies per target member plus a cursor carried through
//! each call. Mixin overrides never need the host language's inheritance to
//! chain into each other.

mod builder;
mod composite;
mod dispatch;

pub use builder::{CompositeTypeBuilder, GenerationLimits};
pub use composite::{CompositeInstance, CompositeType, InterfaceView, MixinInstance};
pub use dispatch::{ChainLink, DispatchEntry, DispatchTable, InterfaceForwarder, Invocation};
