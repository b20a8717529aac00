use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use clubroster_auth::{
    compile, grants, Action, Permission, PermissionGrant, Principal, ResourceCollection,
};
use clubroster_core::{AccountId, PermissionId};

fn principal_with_all_grants(id: AccountId) -> Principal {
    Principal::new(id, grants::known_names().map(Permission::new))
}

/// Ruleset compilation happens on every protected request.
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    let bare = Principal::without_grants(AccountId::new());
    group.bench_function("self_service_only", |b| b.iter(|| compile(black_box(&bare))));

    let full = principal_with_all_grants(AccountId::new());
    group.bench_function("all_grants", |b| b.iter(|| compile(black_box(&full))));

    group.finish();
}

/// Quantified checks scale with the collection size.
fn bench_collection_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_read");
    let me = AccountId::new();
    let ruleset = compile(&Principal::without_grants(me));

    for size in [1usize, 16, 256] {
        let collection = ResourceCollection::PermissionGrants(
            (0..size)
                .map(|_| PermissionGrant {
                    id: PermissionId::new(),
                    name: Permission::new(grants::READ_EVENT),
                    owner_id: me,
                })
                .collect(),
        );

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &collection, |b, col| {
            b.iter(|| ruleset.can_on(Action::Read, black_box(col)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_collection_read);
criterion_main!(benches);
