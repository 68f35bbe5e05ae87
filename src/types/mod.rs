// Copyright 2025 Cowboy AI, LLC.

//! Nominal type model composed by the engine

pub mod member;
pub mod state;
pub mod type_ref;

pub use member::{
    body, MemberBody, MemberDefinition, MemberModifiers, MemberSignature, OverrideDefinition,
    Visibility,
};
pub use state::InstanceState;
pub use type_ref::{TypeBuilder, TypeDefinition, TypeKind, TypeRef};
