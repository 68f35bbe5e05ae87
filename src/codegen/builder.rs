// Copyright 2025 Cowboy AI, LLC.

//! Composite type builder
//!
//! Materializes a [`ResolvedComposition`] into a [`CompositeType`]: one
//! dispatch entry per target member, one chain link per override, one
//! forwarder per introduced interface.

use indexmap::IndexMap;
use tracing::{debug, info};

use super::composite::{CompositeType, CompositeTypeParts};
use super::dispatch::{ChainLink, DispatchEntry, DispatchTable, InterfaceForwarder};
use crate::context::IntroducedMemberVisibility;
use crate::errors::{CodeGenerationError, InvocationError};
use crate::resolution::{ChainEntry, ResolvedComposition};
use crate::types::{body, MemberBody, MemberDefinition, MemberSignature, TypeRef};

/// Upper bounds on the generated dispatch structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimits {
    /// Longest override chain a single member may have
    pub max_chain_length: usize,
    /// Most mixins one composite may hold
    pub max_mixin_slots: usize,
    /// Most target members one dispatch table may hold
    pub max_dispatch_entries: usize,
}

/// Builds composite types from resolved compositions
#[derive(Debug, Clone)]
pub struct CompositeTypeBuilder {
    limits: GenerationLimits,
    log_compositions: bool,
}

impl CompositeTypeBuilder {
    /// Create a builder with the given limits
    pub fn new(limits: GenerationLimits) -> Self {
        Self {
            limits,
            log_compositions: false,
        }
    }

    /// Emit an info event per built composite
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_compositions = enabled;
        self
    }

    /// Configured limits
    pub fn limits(&self) -> GenerationLimits {
        self.limits
    }

    /// Build the composite type for `resolved`
    ///
    /// # Errors
    ///
    /// [`CodeGenerationError`] when a limit is exceeded or a member that
    /// must be dispatched has no body.
    pub fn build(
        &self,
        resolved: &ResolvedComposition,
        generation: u64,
    ) -> Result<CompositeType, CodeGenerationError> {
        let target = resolved.target_type();

        let slots = resolved.ordered_mixins().len();
        if slots > self.limits.max_mixin_slots {
            return Err(CodeGenerationError::TooManySlots {
                target: target.name().to_string(),
                count: slots,
                limit: self.limits.max_mixin_slots,
            });
        }

        let entries = target.members().len();
        if entries > self.limits.max_dispatch_entries {
            return Err(CodeGenerationError::DispatchTableTooLarge {
                target: target.name().to_string(),
                count: entries,
                limit: self.limits.max_dispatch_entries,
            });
        }

        let dispatch = self.build_dispatch(resolved)?;
        let interfaces = build_forwarders(resolved)?;

        let name = composite_name(resolved);
        debug!(
            composite = %name,
            slots,
            dispatch_entries = dispatch.len(),
            overridden = dispatch.overridden().count(),
            interfaces = interfaces.len(),
            "generated dispatch structure"
        );

        let composite = CompositeType::new(CompositeTypeParts {
            name,
            generation,
            context: resolved.class_context().clone(),
            ordered_mixins: resolved.ordered_mixins().to_vec(),
            dispatch,
            interfaces,
            plan: resolved.plan(),
        });

        if self.log_compositions {
            info!(
                composite = %composite,
                id = %composite.id(),
                generation,
                "built composite type"
            );
        }

        Ok(composite)
    }

    fn build_dispatch(&self, resolved: &ResolvedComposition) -> Result<DispatchTable, CodeGenerationError> {
        let target = resolved.target_type();
        let mut table = DispatchTable::default();

        for member in target.members() {
            let chain = match resolved.override_chain(&member.signature) {
                Some(entries) => self.build_chain(target, &member.signature, entries)?,
                None => Vec::new(),
            };
            let original = original_body(target, member, !chain.is_empty())?;
            table.insert(DispatchEntry::new(member.signature.clone(), original, chain));
        }

        Ok(table)
    }

    fn build_chain(
        &self,
        target: &TypeRef,
        signature: &MemberSignature,
        entries: &[ChainEntry],
    ) -> Result<Vec<ChainLink>, CodeGenerationError> {
        if entries.len() > self.limits.max_chain_length {
            return Err(CodeGenerationError::ChainTooLong {
                target: target.name().to_string(),
                member: signature.to_string(),
                length: entries.len(),
                limit: self.limits.max_chain_length,
            });
        }

        entries
            .iter()
            .map(|entry| -> Result<ChainLink, CodeGenerationError> {
                let definition = entry.mixin_type.find_override(signature).ok_or_else(|| {
                    CodeGenerationError::MissingBody {
                        owner: entry.mixin_type.name().to_string(),
                        member: signature.to_string(),
                    }
                })?;
                Ok(ChainLink::new(
                    entry.mixin_index,
                    entry.mixin_type.clone(),
                    definition.body.clone(),
                ))
            })
            .collect()
    }
}

impl Default for CompositeTypeBuilder {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().limits())
    }
}

/// The target's own body; abstract members are allowed only under overrides
fn original_body(
    target: &TypeRef,
    member: &MemberDefinition,
    overridden: bool,
) -> Result<MemberBody, CodeGenerationError> {
    match (&member.body, overridden) {
        (Some(original), _) => Ok(original.clone()),
        (None, true) => Ok(body(|invocation, _| {
            Err(InvocationError::NoBaseImplementation {
                member: invocation.signature().to_string(),
            })
        })),
        (None, false) => Err(CodeGenerationError::MissingBody {
            owner: target.name().to_string(),
            member: member.signature.to_string(),
        }),
    }
}

fn build_forwarders(
    resolved: &ResolvedComposition,
) -> Result<IndexMap<TypeRef, InterfaceForwarder>, CodeGenerationError> {
    let mut forwarders = IndexMap::new();

    for (interface, slot) in resolved.introduced_interfaces() {
        let declaration = &resolved.ordered_mixins()[*slot];
        let mixin = declaration.mixin_type();

        let mut members = IndexMap::new();
        for member in interface.members() {
            let implementation = mixin
                .find_member(&member.signature)
                .and_then(|m| m.body.clone())
                .ok_or_else(|| CodeGenerationError::MissingBody {
                    owner: mixin.name().to_string(),
                    member: member.signature.to_string(),
                })?;
            members.insert(member.signature.clone(), implementation);
        }

        let public = declaration.introduced_member_visibility() == IntroducedMemberVisibility::Public;
        forwarders.insert(
            interface.clone(),
            InterfaceForwarder::new(interface.clone(), *slot, mixin.clone(), public, members),
        );
    }

    Ok(forwarders)
}

fn composite_name(resolved: &ResolvedComposition) -> String {
    let mixins: Vec<&str> = resolved
        .ordered_mixins()
        .iter()
        .map(|d| d.mixin_type().name())
        .collect();
    format!("{}[{}]", resolved.target_type(), mixins.join(", "))
}
