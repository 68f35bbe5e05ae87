// Copyright 2025 Cowboy AI, LLC.

//! Configuration resolution
//!
//! Turns a [`ClassContext`] into a [`ResolvedComposition`]: a validated
//! composition order, the override chain of every overridden target member
//! and the owner of every introduced interface.
//!
//! Resolution is pure. It takes no locks, caches nothing and may run
//! concurrently for any contexts, equal or not.
//!
//! ```mermaid
//! graph LR
//!     A[ClassContext] -->|dependency::resolve_order| B[ordered mixins]
//!     B -->|overrides::resolve_members| C[chains + introductions]
//!     C --> D[ResolvedComposition]
//! ```

pub mod dependency;
pub mod overrides;
pub mod plan;

use indexmap::IndexMap;

use crate::context::{ClassContext, MixinDeclaration};
use crate::errors::MixinResult;
use crate::types::{MemberSignature, TypeRef};

pub use dependency::resolve_order;
pub use overrides::{resolve_members, ChainEntry, MemberResolution};
pub use plan::{CompositionPlan, IntroducedInterfacePlan, OverrideChainPlan};

/// Validated composition decisions for one class context
#[derive(Debug, Clone)]
pub struct ResolvedComposition {
    context: ClassContext,
    ordered_mixins: Vec<MixinDeclaration>,
    override_chains: IndexMap<MemberSignature, Vec<ChainEntry>>,
    introduced_interfaces: IndexMap<TypeRef, usize>,
    non_introduced_interfaces: Vec<TypeRef>,
}

impl ResolvedComposition {
    /// The context this composition was resolved from
    pub fn class_context(&self) -> &ClassContext {
        &self.context
    }

    /// The target type
    pub fn target_type(&self) -> &TypeRef {
        self.context.target_type()
    }

    /// Mixins in composition order, suppressed entries removed
    pub fn ordered_mixins(&self) -> &[MixinDeclaration] {
        &self.ordered_mixins
    }

    /// Override chain per overridden target member, in composition order
    pub fn override_chains(&self) -> &IndexMap<MemberSignature, Vec<ChainEntry>> {
        &self.override_chains
    }

    /// Chain for one member, if any mixin overrides it
    pub fn override_chain(&self, member: &MemberSignature) -> Option<&[ChainEntry]> {
        self.override_chains.get(member).map(Vec::as_slice)
    }

    /// Introduced interface to owning mixin index
    pub fn introduced_interfaces(&self) -> &IndexMap<TypeRef, usize> {
        &self.introduced_interfaces
    }

    /// Interfaces implemented by mixins that the target already has
    pub fn non_introduced_interfaces(&self) -> &[TypeRef] {
        &self.non_introduced_interfaces
    }

    /// Position of a mixin in the composition order
    pub fn mixin_index(&self, mixin_type: &TypeRef) -> Option<usize> {
        self.ordered_mixins
            .iter()
            .position(|d| d.mixin_type() == mixin_type)
    }

    /// Name-only rendering for tooling
    pub fn plan(&self) -> CompositionPlan {
        let suppressed = self
            .context
            .mixins()
            .filter(|d| self.mixin_index(d.mixin_type()).is_none())
            .map(|d| d.mixin_type().name().to_string())
            .collect();

        CompositionPlan {
            target_type: self.target_type().name().to_string(),
            ordered_mixins: self
                .ordered_mixins
                .iter()
                .map(|d| d.mixin_type().name().to_string())
                .collect(),
            suppressed_mixins: suppressed,
            override_chains: self
                .override_chains
                .iter()
                .map(|(member, chain)| OverrideChainPlan {
                    member: member.to_string(),
                    chain: chain
                        .iter()
                        .map(|e| e.mixin_type.name().to_string())
                        .collect(),
                })
                .collect(),
            introduced_interfaces: self
                .introduced_interfaces
                .iter()
                .map(|(interface, index)| {
                    let owner = &self.ordered_mixins[*index];
                    IntroducedInterfacePlan::new(
                        interface.name(),
                        owner.mixin_type().name(),
                        owner.introduced_member_visibility(),
                    )
                })
                .collect(),
            non_introduced_interfaces: self
                .non_introduced_interfaces
                .iter()
                .map(|t| t.name().to_string())
                .collect(),
        }
    }
}

/// Validate a class context and resolve its composition
///
/// Configuration errors are reported first and alone; validation errors are
/// reported together. Nothing is cached.
///
/// # Errors
///
/// [`MixinError::Configuration`](crate::MixinError::Configuration) for
/// dependency cycles, [`MixinError::Validation`](crate::MixinError::Validation)
/// for override and interface conflicts.
pub fn validate_and_resolve(context: &ClassContext) -> MixinResult<ResolvedComposition> {
    let ordered_mixins = resolve_order(context)?;
    let members = resolve_members(context.target_type(), &ordered_mixins)?;

    Ok(ResolvedComposition {
        context: context.clone(),
        ordered_mixins,
        override_chains: members.override_chains,
        introduced_interfaces: members.introduced_interfaces,
        non_introduced_interfaces: members.non_introduced_interfaces,
    })
}
