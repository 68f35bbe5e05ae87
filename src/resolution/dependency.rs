// Copyright 2025 Cowboy AI, LLC.

//! Dependency resolver
//!
//! Orders the post-suppression mixin set of a [`ClassContext`] so that every
//! mixin comes after the mixins it depends on. Two kinds of edge exist:
//! - explicit: `B` is in `A`'s `additional_dependencies`, so `B` precedes `A`
//! - interface-driven: `A` requires an interface that `B` implements, so the
//!   implementer `B` precedes its consumer `A`
//!
//! Among mixins whose predecessors are all placed, the one with the smallest
//! full type name goes first. The result depends only on the context value.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::context::{ClassContext, MixinDeclaration};
use crate::errors::ConfigurationError;
use crate::types::TypeRef;

/// Resolve the composition order for a context
///
/// # Errors
///
/// Returns [`ConfigurationError::CyclicDependency`] when no order exists.
pub fn resolve_order(context: &ClassContext) -> Result<Vec<MixinDeclaration>, ConfigurationError> {
    let target = context.target_type();
    let suppressed = context.suppressed_types();

    let active: BTreeMap<TypeRef, &MixinDeclaration> = context
        .mixins()
        .filter(|declaration| {
            let keep = !suppressed.contains(declaration.mixin_type());
            if !keep {
                debug!(
                    target_type = %target,
                    mixin = %declaration.mixin_type(),
                    "mixin suppressed"
                );
            }
            keep
        })
        .map(|declaration| (declaration.mixin_type().clone(), declaration))
        .collect();

    let predecessors = build_predecessors(target, &active);
    let order = topological_order(&active, &predecessors).map_err(|cycle| {
        ConfigurationError::CyclicDependency {
            target: target.name().to_string(),
            cycle: cycle.iter().map(|t| t.name().to_string()).collect(),
        }
    })?;

    debug!(
        target_type = %target,
        order = ?order.iter().map(|t| t.name()).collect::<Vec<_>>(),
        "resolved mixin order"
    );

    Ok(order
        .into_iter()
        .filter_map(|mixin| active.get(&mixin).map(|d| (*d).clone()))
        .collect())
}

/// For every active mixin, the set of active mixins that must precede it
fn build_predecessors(
    target: &TypeRef,
    active: &BTreeMap<TypeRef, &MixinDeclaration>,
) -> BTreeMap<TypeRef, BTreeSet<TypeRef>> {
    let mut predecessors: BTreeMap<TypeRef, BTreeSet<TypeRef>> = active
        .keys()
        .map(|mixin| (mixin.clone(), BTreeSet::new()))
        .collect();

    for (mixin, declaration) in active {
        let entry = predecessors.entry(mixin.clone()).or_default();

        for dependency in declaration.additional_dependencies() {
            if active.contains_key(dependency) {
                entry.insert(dependency.clone());
            } else {
                debug!(
                    target_type = %target,
                    mixin = %mixin,
                    dependency = %dependency,
                    "dependency on suppressed mixin dropped"
                );
            }
        }

        for required in mixin.required_interfaces() {
            for implementer in active.keys() {
                if implementer != mixin && implementer.implements(required) {
                    entry.insert(implementer.clone());
                }
            }
        }
    }

    predecessors
}

/// Kahn's algorithm with a name-ordered ready set
///
/// On failure returns a cycle path in "depends on" direction with its first
/// member repeated at the end.
fn topological_order(
    active: &BTreeMap<TypeRef, &MixinDeclaration>,
    predecessors: &BTreeMap<TypeRef, BTreeSet<TypeRef>>,
) -> Result<Vec<TypeRef>, Vec<TypeRef>> {
    let mut remaining: BTreeMap<TypeRef, usize> = predecessors
        .iter()
        .map(|(mixin, preds)| (mixin.clone(), preds.len()))
        .collect();

    let mut successors: BTreeMap<&TypeRef, Vec<&TypeRef>> = BTreeMap::new();
    for (mixin, preds) in predecessors {
        for pred in preds {
            successors.entry(pred).or_default().push(mixin);
        }
    }

    let mut ready: BTreeSet<TypeRef> = remaining
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(mixin, _)| mixin.clone())
        .collect();

    let mut order = Vec::with_capacity(active.len());
    while let Some(next) = ready.pop_first() {
        remaining.remove(&next);
        if let Some(succs) = successors.get(&next) {
            for succ in succs {
                if let Some(count) = remaining.get_mut(*succ) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert((*succ).clone());
                    }
                }
            }
        }
        order.push(next);
    }

    if remaining.is_empty() {
        Ok(order)
    } else {
        Err(find_cycle(&remaining, predecessors))
    }
}

/// Walk predecessor edges inside the unresolved residue until a node repeats
///
/// Every unresolved node has at least one unresolved predecessor, so the walk
/// always closes.
fn find_cycle(
    remaining: &BTreeMap<TypeRef, usize>,
    predecessors: &BTreeMap<TypeRef, BTreeSet<TypeRef>>,
) -> Vec<TypeRef> {
    let mut path: Vec<TypeRef> = Vec::new();
    let mut current = match remaining.keys().next() {
        Some(start) => start.clone(),
        None => return path,
    };

    loop {
        if let Some(position) = path.iter().position(|t| *t == current) {
            let mut cycle: Vec<TypeRef> = path.split_off(position);
            cycle.push(current);
            return cycle;
        }
        path.push(current.clone());

        let next = predecessors
            .get(&current)
            .and_then(|preds| preds.iter().find(|p| remaining.contains_key(*p)))
            .cloned();
        match next {
            Some(next) => current = next,
            None => return path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDefinition;
    use pretty_assertions::assert_eq;

    fn names(order: &[MixinDeclaration]) -> Vec<&str> {
        order.iter().map(|d| d.mixin_type().name()).collect()
    }

    #[test]
    fn test_independent_mixins_ordered_by_name() {
        let target = TypeDefinition::class("Order").build();
        let c = TypeDefinition::class("C").build();
        let a = TypeDefinition::class("A").build();
        let b = TypeDefinition::class("B").build();

        let context = ClassContext::builder(&target)
            .uses(&c)
            .uses(&a)
            .uses(&b)
            .build()
            .unwrap();

        assert_eq!(names(&resolve_order(&context).unwrap()), vec!["A", "B", "C"]);
    }

    /// Explicit dependencies override name order
    ///
    /// ```mermaid
    /// graph LR
    ///     C --> A
    ///     A --> B
    /// ```
    #[test]
    fn test_explicit_dependencies_respected() {
        let target = TypeDefinition::class("Order").build();
        let a = TypeDefinition::class("A").build();
        let b = TypeDefinition::class("B").build();
        let c = TypeDefinition::class("C").build();

        let context = ClassContext::builder(&target)
            .mixin(MixinDeclaration::used(&a).depends_on(&c))
            .mixin(MixinDeclaration::used(&b).depends_on(&a))
            .uses(&c)
            .build()
            .unwrap();

        assert_eq!(names(&resolve_order(&context).unwrap()), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_interface_implementer_precedes_consumer() {
        let target = TypeDefinition::class("Order").build();
        let clock = TypeDefinition::interface("IClock").build();
        let consumer = TypeDefinition::class("A.Audit").requires(&clock).build();
        let provider = TypeDefinition::class("Z.Clock").implements(&clock).build();

        let context = ClassContext::builder(&target)
            .uses(&consumer)
            .uses(&provider)
            .build()
            .unwrap();

        assert_eq!(
            names(&resolve_order(&context).unwrap()),
            vec!["Z.Clock", "A.Audit"]
        );
    }

    #[test]
    fn test_suppressed_mixins_removed_and_their_edges_dropped() {
        let target = TypeDefinition::class("Order").build();
        let a = TypeDefinition::class("A").build();
        let b = TypeDefinition::class("B").build();
        let c = TypeDefinition::class("C").build();

        let context = ClassContext::builder(&target)
            .mixin(MixinDeclaration::used(&a).depends_on(&b))
            .uses(&b)
            .mixin(MixinDeclaration::used(&c).suppresses(&b))
            .build()
            .unwrap();

        assert_eq!(names(&resolve_order(&context).unwrap()), vec!["A", "C"]);
    }

    #[test]
    fn test_cycle_reported_with_members() {
        let target = TypeDefinition::class("Order").build();
        let a = TypeDefinition::class("A").build();
        let b = TypeDefinition::class("B").build();
        let c = TypeDefinition::class("C").build();

        let context = ClassContext::builder(&target)
            .mixin(MixinDeclaration::used(&a).depends_on(&b))
            .mixin(MixinDeclaration::used(&b).depends_on(&a))
            .mixin(MixinDeclaration::used(&c).depends_on(&a))
            .build()
            .unwrap();

        let err = resolve_order(&context).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::CyclicDependency {
                target: "Order".to_string(),
                cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
            }
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let target = TypeDefinition::class("Order").build();
        let a = TypeDefinition::class("A").build();

        let context = ClassContext::builder(&target)
            .mixin(MixinDeclaration::used(&a).depends_on(&a))
            .build()
            .unwrap();

        match resolve_order(&context).unwrap_err() {
            ConfigurationError::CyclicDependency { cycle, .. } => {
                assert_eq!(cycle, vec!["A".to_string(), "A".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_suppression_breaks_cycle() {
        let target = TypeDefinition::class("Order").build();
        let a = TypeDefinition::class("A").build();
        let b = TypeDefinition::class("B").build();
        let c = TypeDefinition::class("C").build();

        let context = ClassContext::builder(&target)
            .mixin(MixinDeclaration::used(&a).depends_on(&b))
            .mixin(MixinDeclaration::used(&b).depends_on(&a))
            .mixin(MixinDeclaration::used(&c).suppresses(&b))
            .build()
            .unwrap();

        assert_eq!(names(&resolve_order(&context).unwrap()), vec!["A", "C"]);
    }
}
