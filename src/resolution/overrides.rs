// Copyright 2025 Cowboy AI, LLC.

//! Override resolver
//!
//! Builds, for each overridable target member, the chain of mixin overrides
//! in composition order, and assigns each introduced interface to the single
//! mixin that introduces it. Every conflict found is collected into one
//! [`ValidationReport`].

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::context::MixinDeclaration;
use crate::errors::{ValidationError, ValidationReport};
use crate::types::{MemberSignature, TypeRef};

/// One mixin override in a member's chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Index of the mixin in `ordered_mixins`
    pub mixin_index: usize,
    /// The overriding mixin
    pub mixin_type: TypeRef,
    /// Overridden member
    pub member: MemberSignature,
}

/// Output of the override resolver
#[derive(Debug, Clone, Default)]
pub struct MemberResolution {
    /// Override chains keyed by target member, in target declaration order
    pub override_chains: IndexMap<MemberSignature, Vec<ChainEntry>>,
    /// Introduced interface to owning mixin index
    pub introduced_interfaces: IndexMap<TypeRef, usize>,
    /// Interfaces implemented by mixins that the target already implements
    pub non_introduced_interfaces: Vec<TypeRef>,
}

/// Resolve overrides and interface introductions
///
/// # Errors
///
/// Returns every [`ValidationError`] found, aggregated in one report.
pub fn resolve_members(
    target: &TypeRef,
    ordered_mixins: &[MixinDeclaration],
) -> Result<MemberResolution, ValidationReport> {
    let mut report = ValidationReport::new(target.name());

    let accepted = collect_overrides(target, ordered_mixins, &mut report);
    let override_chains = build_chains(target, &accepted);
    let (introduced_interfaces, non_introduced_interfaces) =
        collect_introductions(target, ordered_mixins, &mut report);
    check_requirements(target, ordered_mixins, &mut report);

    report.into_result()?;

    debug!(
        target_type = %target,
        chains = override_chains.len(),
        introduced = introduced_interfaces.len(),
        "resolved members"
    );

    Ok(MemberResolution {
        override_chains,
        introduced_interfaces,
        non_introduced_interfaces,
    })
}

/// Overrides that name an existing, overridable target member
fn collect_overrides(
    target: &TypeRef,
    ordered_mixins: &[MixinDeclaration],
    report: &mut ValidationReport,
) -> Vec<ChainEntry> {
    let mut accepted = Vec::new();

    for (mixin_index, declaration) in ordered_mixins.iter().enumerate() {
        let mixin = declaration.mixin_type();
        let mut seen: BTreeSet<&MemberSignature> = BTreeSet::new();
        let mut duplicated: BTreeSet<&MemberSignature> = BTreeSet::new();

        for definition in mixin.overrides() {
            let signature = &definition.signature;
            if !seen.insert(signature) {
                if duplicated.insert(signature) {
                    report.push(ValidationError::DuplicateOverride {
                        mixin: mixin.name().to_string(),
                        member: signature.to_string(),
                    });
                }
                continue;
            }

            match target.find_member(signature) {
                None => report.push(ValidationError::OverrideTargetNotFound {
                    target: target.name().to_string(),
                    mixin: mixin.name().to_string(),
                    member: signature.to_string(),
                }),
                Some(member) => match member.modifiers.override_restriction() {
                    Some(reason) => report.push(ValidationError::NonOverridableMember {
                        target: target.name().to_string(),
                        mixin: mixin.name().to_string(),
                        member: signature.to_string(),
                        reason: reason.to_string(),
                    }),
                    None => accepted.push(ChainEntry {
                        mixin_index,
                        mixin_type: mixin.clone(),
                        member: signature.clone(),
                    }),
                },
            }
        }
    }

    accepted
}

/// Group accepted overrides per target member, keeping composition order
fn build_chains(target: &TypeRef, accepted: &[ChainEntry]) -> IndexMap<MemberSignature, Vec<ChainEntry>> {
    let mut chains = IndexMap::new();
    for member in target.members() {
        let chain: Vec<ChainEntry> = accepted
            .iter()
            .filter(|entry| entry.member == member.signature)
            .cloned()
            .collect();
        if !chain.is_empty() {
            chains.insert(member.signature.clone(), chain);
        }
    }
    chains
}

fn collect_introductions(
    target: &TypeRef,
    ordered_mixins: &[MixinDeclaration],
    report: &mut ValidationReport,
) -> (IndexMap<TypeRef, usize>, Vec<TypeRef>) {
    let mut introducers: BTreeMap<&TypeRef, Vec<usize>> = BTreeMap::new();
    let mut non_introduced: BTreeSet<TypeRef> = BTreeSet::new();

    for (mixin_index, declaration) in ordered_mixins.iter().enumerate() {
        for interface in declaration.mixin_type().implemented_interfaces() {
            if target.implements(interface) {
                non_introduced.insert(interface.clone());
            } else {
                introducers.entry(interface).or_default().push(mixin_index);
            }
        }
    }

    for (interface, owners) in &introducers {
        if owners.len() > 1 {
            report.push(ValidationError::AmbiguousIntroduction {
                target: target.name().to_string(),
                interface: interface.name().to_string(),
                mixins: owners
                    .iter()
                    .map(|i| ordered_mixins[*i].mixin_type().name().to_string())
                    .collect(),
            });
        }
    }

    let mut introduced = IndexMap::new();
    for (mixin_index, declaration) in ordered_mixins.iter().enumerate() {
        let mixin = declaration.mixin_type();
        for interface in mixin.implemented_interfaces() {
            let owned_alone = introducers
                .get(interface)
                .is_some_and(|owners| owners.len() == 1);
            if !owned_alone {
                continue;
            }

            for member in interface.members() {
                let implemented = mixin
                    .find_member(&member.signature)
                    .is_some_and(|m| m.body.is_some());
                if !implemented {
                    report.push(ValidationError::IncompleteInterface {
                        mixin: mixin.name().to_string(),
                        interface: interface.name().to_string(),
                        member: member.signature.to_string(),
                    });
                }
            }
            introduced.insert(interface.clone(), mixin_index);
        }
    }

    (introduced, non_introduced.into_iter().collect())
}

fn check_requirements(
    target: &TypeRef,
    ordered_mixins: &[MixinDeclaration],
    report: &mut ValidationReport,
) {
    for declaration in ordered_mixins {
        let mixin = declaration.mixin_type();
        for required in mixin.required_interfaces() {
            let satisfied = required == target
                || target.implements(required)
                || ordered_mixins
                    .iter()
                    .any(|d| d.mixin_type().implements(required));
            if !satisfied {
                report.push(ValidationError::UnsatisfiedRequirement {
                    target: target.name().to_string(),
                    mixin: mixin.name().to_string(),
                    interface: required.name().to_string(),
                });
            }
        }
    }
}
