// Copyright 2025 Cowboy AI, LLC.

//! End-to-end composition behavior through the public API

use cim_mixin::{
    validate_and_resolve, ClassContext, CompositionCache, ConfigurationError, InvocationError,
    MemberSignature, MixinDeclaration, MixinError, TypeDefinition, TypeRef, ValidationError,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn foo() -> MemberSignature {
    MemberSignature::method("Foo").returns("string")
}

fn target() -> TypeRef {
    TypeDefinition::class("T")
        .virtual_method(foo(), |_, _| Ok(json!(["T"])))
        .build()
}

/// Override that records its name, then optionally calls base
fn recording(name: &'static str, calls_base: bool) -> TypeRef {
    TypeDefinition::class(name)
        .override_member(foo(), move |inv, args| {
            let mut trail = vec![json!(name)];
            if calls_base {
                if let serde_json::Value::Array(rest) = inv.base(args)? {
                    trail.extend(rest);
                }
            }
            Ok(json!(trail))
        })
        .build()
}

#[test]
fn determinism_for_value_equal_contexts() {
    let t = target();
    let m1 = recording("M1", true);
    let m2 = recording("M2", true);
    let m3 = recording("M3", true);

    let first = ClassContext::new(
        &t,
        vec![
            MixinDeclaration::used(&m3),
            MixinDeclaration::used(&m1).depends_on(&m2),
            MixinDeclaration::used(&m2),
        ],
    )
    .unwrap();
    let second = ClassContext::new(
        &t,
        vec![
            MixinDeclaration::used(&m2),
            MixinDeclaration::used(&m1).depends_on(&m2),
            MixinDeclaration::used(&m3),
        ],
    )
    .unwrap();
    assert_eq!(first, second);

    let a = validate_and_resolve(&first).unwrap();
    let b = validate_and_resolve(&second).unwrap();
    assert_eq!(a.ordered_mixins(), b.ordered_mixins());
    assert_eq!(a.override_chains(), b.override_chains());
    assert_eq!(a.plan().ordered_mixins, vec!["M2", "M1", "M3"]);
}

#[test]
fn suppression_wins_over_declaration() {
    let iface = TypeDefinition::interface("IFromB").build();
    let t = target();
    let a = TypeDefinition::class("A").build();
    let b = TypeDefinition::class("B").implements(&iface).build();

    let context = ClassContext::builder(&t)
        .mixin(MixinDeclaration::used(&a).suppresses(&b))
        .uses(&b)
        .build()
        .unwrap();

    let resolved = validate_and_resolve(&context).unwrap();
    assert_eq!(resolved.plan().ordered_mixins, vec!["A"]);
    assert!(resolved.introduced_interfaces().is_empty());

    let composite = CompositionCache::default().get_or_create(&context).unwrap();
    let instance = composite.create_instance();
    assert!(instance.mixin(&b).is_none());
    assert!(instance.as_interface(&iface).is_none());
}

#[test]
fn cycle_names_both_mixins() {
    let t = target();
    let a = TypeDefinition::class("A").build();
    let b = TypeDefinition::class("B").build();
    let context = ClassContext::builder(&t)
        .mixin(MixinDeclaration::used(&a).depends_on(&b))
        .mixin(MixinDeclaration::used(&b).depends_on(&a))
        .build()
        .unwrap();

    match validate_and_resolve(&context) {
        Err(MixinError::Configuration(ConfigurationError::CyclicDependency { cycle, .. })) => {
            assert!(cycle.iter().any(|m| m == "A"));
            assert!(cycle.iter().any(|m| m == "B"));
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

/// Chain order and base calls
///
/// ```mermaid
/// graph LR
///     Call -->|first| M2
///     M2 -->|base| M1
///     M1 -->|base| T
/// ```
#[test]
fn chain_runs_last_mixin_first_and_base_walks_back() {
    let t = target();
    let m1 = recording("M1", true);
    let m2 = recording("M2", true);
    let context = ClassContext::builder(&t)
        .uses(&m1)
        .mixin(MixinDeclaration::used(&m2).depends_on(&m1))
        .build()
        .unwrap();

    let instance = CompositionCache::default()
        .get_or_create(&context)
        .unwrap()
        .create_instance();
    assert_eq!(instance.call("Foo", &[]).unwrap(), json!(["M2", "M1", "T"]));
}

#[test]
fn override_without_base_call_short_circuits() {
    let t = target();
    let m1 = recording("M1", true);
    let m2 = recording("M2", false);
    let context = ClassContext::builder(&t).uses(&m1).uses(&m2).build().unwrap();

    let instance = CompositionCache::default()
        .get_or_create(&context)
        .unwrap()
        .create_instance();
    assert_eq!(instance.call("Foo", &[]).unwrap(), json!(["M2"]));
}

#[test]
fn cache_returns_identical_handle_for_equal_contexts() {
    let t = target();
    let m1 = recording("M1", true);
    let cache = CompositionCache::default();

    let c1 = ClassContext::builder(&t).uses(&m1).build().unwrap();
    let c2 = ClassContext::builder(&target())
        .uses(&recording("M1", true))
        .build()
        .unwrap();

    let first = cache.get_or_create(&c1).unwrap();
    let second = cache.get_or_create(&c2).unwrap();
    assert!(first.same_handle(&second));
    assert_eq!(cache.build_count(), 1);
}

#[test]
fn reset_yields_new_but_equivalent_handle() {
    let t = target();
    let m1 = recording("M1", true);
    let context = ClassContext::builder(&t).uses(&m1).build().unwrap();
    let cache = CompositionCache::default();

    let before = cache.get_or_create(&context).unwrap();
    cache.reset();
    let after = cache.get_or_create(&context).unwrap();

    assert!(!before.same_handle(&after));
    assert_eq!(before.plan(), after.plan());
    assert_eq!(
        before.create_instance().call("Foo", &[]).unwrap(),
        after.create_instance().call("Foo", &[]).unwrap()
    );
}

#[test]
fn ambiguous_introduction_names_both_mixins() {
    let shared = TypeDefinition::interface("I").build();
    let t = target();
    let m1 = TypeDefinition::class("M1")
        .implements(&shared)
        .override_member(foo(), |inv, args| inv.base(args))
        .build();
    let m2 = TypeDefinition::class("M2")
        .implements(&shared)
        .override_member(foo(), |inv, args| inv.base(args))
        .build();
    let context = ClassContext::builder(&t).uses(&m1).uses(&m2).build().unwrap();

    let report = match validate_and_resolve(&context) {
        Err(MixinError::Validation(report)) => report,
        other => panic!("expected validation errors, got {other:?}"),
    };
    assert_eq!(
        report.errors,
        vec![ValidationError::AmbiguousIntroduction {
            target: "T".to_string(),
            interface: "I".to_string(),
            mixins: vec!["M1".to_string(), "M2".to_string()],
        }]
    );

    let cache = CompositionCache::default();
    assert!(cache.get_or_create(&context).unwrap_err().is_validation_error());
}

#[test]
fn suppressing_one_introducer_resolves_ambiguity() {
    let shared = TypeDefinition::interface("I").build();
    let t = target();
    let m1 = TypeDefinition::class("M1").implements(&shared).build();
    let m2 = TypeDefinition::class("M2").implements(&shared).build();
    let context = ClassContext::builder(&t)
        .mixin(MixinDeclaration::used(&m1).suppresses(&m2))
        .uses(&m2)
        .build()
        .unwrap();

    let resolved = validate_and_resolve(&context).unwrap();
    assert_eq!(resolved.introduced_interfaces().get(&shared), Some(&0));
}

#[test]
fn every_validation_problem_reported_in_one_pass() {
    let needed = TypeDefinition::interface("INeeded").build();
    let t = TypeDefinition::class("T")
        .virtual_method(foo(), |_, _| Ok(json!(null)))
        .method(MemberSignature::method("Fixed"), |_, _| Ok(json!(null)))
        .build();
    let broken = TypeDefinition::class("Broken")
        .requires(&needed)
        .override_member(MemberSignature::method("Missing"), |_, _| Ok(json!(null)))
        .override_member(MemberSignature::method("Fixed"), |_, _| Ok(json!(null)))
        .override_member(foo(), |_, _| Ok(json!(null)))
        .override_member(foo(), |_, _| Ok(json!(null)))
        .build();
    let context = ClassContext::builder(&t).uses(&broken).build().unwrap();

    let report = match validate_and_resolve(&context) {
        Err(MixinError::Validation(report)) => report,
        other => panic!("expected validation errors, got {other:?}"),
    };
    assert_eq!(report.len(), 4);
    let has = |f: fn(&ValidationError) -> bool| report.iter().any(f);
    assert!(has(|e| matches!(e, ValidationError::OverrideTargetNotFound { .. })));
    assert!(has(|e| matches!(e, ValidationError::NonOverridableMember { .. })));
    assert!(has(|e| matches!(e, ValidationError::DuplicateOverride { .. })));
    assert!(has(|e| matches!(e, ValidationError::UnsatisfiedRequirement { .. })));
}

#[test]
fn arity_mismatch_is_reported_to_caller() {
    let t = target();
    let context = ClassContext::builder(&t).build().unwrap();
    let instance = CompositionCache::default()
        .get_or_create(&context)
        .unwrap()
        .create_instance();

    assert!(matches!(
        instance.call("Foo", &[json!(1)]),
        Err(InvocationError::InvalidArguments { .. })
    ));
}

/// Random acyclic configurations: `deps[i][j]` with `j < i` means mixin `i`
/// depends on mixin `j`; `names` permutes the type names so name order and
/// dependency order disagree.
fn acyclic_configuration() -> impl Strategy<Value = (Vec<Vec<bool>>, Vec<usize>, Vec<usize>, Vec<bool>)> {
    (2usize..8).prop_flat_map(|n| {
        (
            proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            proptest::collection::vec(any::<bool>(), n),
        )
    })
}

fn build_context(
    target: &TypeRef,
    mixins: &[TypeRef],
    deps: &[Vec<bool>],
    declaration_order: &[usize],
) -> ClassContext {
    let declarations: Vec<MixinDeclaration> = declaration_order
        .iter()
        .map(|&i| {
            (0..i)
                .filter(|&j| deps[i][j])
                .fold(MixinDeclaration::used(&mixins[i]), |d, j| d.depends_on(&mixins[j]))
        })
        .collect();
    ClassContext::new(target, declarations).unwrap()
}

proptest! {
    #[test]
    fn order_is_a_deterministic_linear_extension(
        (deps, names, declaration_order, overrides) in acyclic_configuration()
    ) {
        let n = deps.len();
        let t = target();
        let mixins: Vec<TypeRef> = (0..n)
            .map(|i| {
                let builder = TypeDefinition::class(format!("Mixin{:02}", names[i]));
                if overrides[i] {
                    builder.override_member(foo(), |inv, args| inv.base(args)).build()
                } else {
                    builder.build()
                }
            })
            .collect();

        let forward: Vec<usize> = (0..n).collect();
        let shuffled = build_context(&t, &mixins, &deps, &declaration_order);
        let straight = build_context(&t, &mixins, &deps, &forward);
        prop_assert_eq!(&shuffled, &straight);

        let a = validate_and_resolve(&shuffled).unwrap();
        let b = validate_and_resolve(&straight).unwrap();
        prop_assert_eq!(a.plan(), b.plan());

        prop_assert_eq!(a.ordered_mixins().len(), n);
        for i in 0..n {
            for j in 0..i {
                if deps[i][j] {
                    prop_assert!(a.mixin_index(&mixins[j]) < a.mixin_index(&mixins[i]));
                }
            }
        }

        let chain_len = a.override_chain(&foo()).map_or(0, <[_]>::len);
        prop_assert_eq!(chain_len, overrides.iter().filter(|o| **o).count());
    }
}
