// Copyright 2025 Cowboy AI, LLC.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cim_mixin::{
    validate_and_resolve, ClassContext, CompositionCache, MemberSignature, MixinDeclaration,
    TypeDefinition, TypeRef,
};
use serde_json::json;

fn describe() -> MemberSignature {
    MemberSignature::method("describe").returns("int")
}

/// Target plus `count` mixins, each overriding `describe` and depending on
/// its predecessor
fn chained_context(count: usize) -> ClassContext {
    let target = TypeDefinition::class("Bench.Target")
        .virtual_method(describe(), |_, _| Ok(json!(0)))
        .build();
    let mixins: Vec<TypeRef> = (0..count)
        .map(|i| {
            TypeDefinition::class(format!("Bench.Mixin{i:03}"))
                .override_member(describe(), |inv, args| {
                    let depth = inv.base(args)?.as_i64().unwrap_or(0);
                    Ok(json!(depth + 1))
                })
                .build()
        })
        .collect();

    let declarations: Vec<MixinDeclaration> = mixins
        .iter()
        .enumerate()
        .map(|(i, mixin)| match i {
            0 => MixinDeclaration::used(mixin),
            _ => MixinDeclaration::used(mixin).depends_on(&mixins[i - 1]),
        })
        .collect();
    ClassContext::new(&target, declarations).unwrap()
}

fn benchmark_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_and_resolve");
    for count in [1, 8, 32] {
        let context = chained_context(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &context, |b, context| {
            b.iter(|| validate_and_resolve(black_box(context)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_cache(c: &mut Criterion) {
    let context = chained_context(8);
    let cache = CompositionCache::default();
    cache.get_or_create(&context).unwrap();

    c.bench_function("get_or_create_hit", |b| {
        b.iter(|| cache.get_or_create(black_box(&context)).unwrap())
    });

    c.bench_function("get_or_create_after_reset", |b| {
        b.iter(|| {
            cache.reset();
            cache.get_or_create(black_box(&context)).unwrap()
        })
    });
}

fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_dispatch");
    for count in [0, 4, 16] {
        let instance = CompositionCache::default()
            .get_or_create(&chained_context(count))
            .unwrap()
            .create_instance();
        group.bench_with_input(BenchmarkId::from_parameter(count), &instance, |b, instance| {
            b.iter(|| instance.call("describe", &[]).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_resolution, benchmark_cache, benchmark_dispatch);
criterion_main!(benches);
