// Copyright 2025 Cowboy AI, LLC.

//! Composition cache under concurrent callers

use std::sync::{Arc, Barrier};
use std::thread;

use cim_mixin::{
    ClassContext, CompositeType, CompositionCache, CountingObserver, MemberSignature,
    MixinDeclaration, TypeDefinition, TypeRef,
};
use serde_json::json;

const THREADS: usize = 16;

fn describe() -> MemberSignature {
    MemberSignature::method("describe").returns("string")
}

/// Every call constructs fresh, reference-distinct type handles
fn context_for(target_name: &str) -> ClassContext {
    let target: TypeRef = TypeDefinition::class(target_name)
        .virtual_method(describe(), |_, _| Ok(json!("base")))
        .build();
    let audit = TypeDefinition::class("Audit")
        .override_member(describe(), |inv, args| inv.base(args))
        .build();
    let tracking = TypeDefinition::class("Tracking").build();
    ClassContext::builder(&target)
        .mixin(MixinDeclaration::used(&audit).depends_on(&tracking))
        .uses(&tracking)
        .build()
        .unwrap()
}

/// N threads, one key, one build
///
/// ```mermaid
/// graph TD
///     T1[thread 1] --> S[slot Order]
///     T2[thread 2] --> S
///     TN[thread N] --> S
///     S --> B[single build]
/// ```
#[test]
fn concurrent_equal_contexts_build_once() {
    let cache = Arc::new(CompositionCache::default());
    let observer = Arc::new(CountingObserver::new());
    cache.add_observer(observer.clone());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<CompositeType> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                scope.spawn(move || {
                    let context = context_for("Order");
                    barrier.wait();
                    cache.get_or_create(&context).unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(cache.build_count(), 1);
    assert_eq!(observer.processed(), THREADS);
    assert!(handles.iter().all(|h| h.same_handle(&handles[0])));
}

#[test]
fn concurrent_distinct_contexts_build_independently() {
    let cache = Arc::new(CompositionCache::default());
    let targets: Vec<String> = (0..THREADS).map(|i| format!("Target{i}")).collect();

    thread::scope(|scope| {
        for name in &targets {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                let first = cache.get_or_create(&context_for(name)).unwrap();
                let again = cache.get_or_create(&context_for(name)).unwrap();
                assert!(first.same_handle(&again));
            });
        }
    });

    assert_eq!(cache.build_count(), THREADS);
    assert_eq!(cache.len(), THREADS);
}

#[test]
fn instances_shared_across_threads_keep_state_consistent() {
    let counter_sig = MemberSignature::method("bump").returns("int");
    let target = TypeDefinition::class("Counter")
        .field("count", json!(0))
        .virtual_method(counter_sig, |inv, _| {
            Ok(inv
                .target_state()
                .update("count", |v| *v = json!(v.as_i64().unwrap_or(0) + 1)))
        })
        .build();
    let context = ClassContext::builder(&target).build().unwrap();
    let instance = CompositionCache::default()
        .get_or_create(&context)
        .unwrap()
        .create_instance();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let instance = instance.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    instance.call("bump", &[]).unwrap();
                }
            });
        }
    });

    assert_eq!(
        instance.target_state().get("count"),
        Some(json!((THREADS * 10) as i64))
    );
}

#[test]
fn reset_while_others_read_never_mixes_generations() {
    let cache = Arc::new(CompositionCache::default());
    let before = cache.get_or_create(&context_for("Order")).unwrap();
    cache.reset();

    let after: Vec<CompositeType> = thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                scope.spawn(move || cache.get_or_create(&context_for("Order")).unwrap())
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert!(after.iter().all(|h| h.generation() == 1));
    assert!(after.iter().all(|h| h.same_handle(&after[0])));
    assert!(!after[0].same_handle(&before));
    assert_eq!(cache.build_count(), 2);
}
