//! Relationship analysis and audit benchmarks
//!
//! Wide hierarchies stress permit resolution across many assigned roles;
//! deep hierarchies stress the guarded ancestor walks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rolegraph_core::{RoleDefinition, RoleGraph, RoleGraphBuilder, RoleId, RoleRef, TraversalLimits};
use rolegraph_governance::{
    AnalyzerConfig, IdentitySnapshot, RelationshipAnalyzer, RoleAssignment, RoleAssignmentLedger,
    RoleAuditor, SodConstraint, SodPolicy,
};

/// `width` business roles, each requiring and permitting its own IT roles
fn create_wide_model(width: usize) -> RoleGraph {
    let mut roles = Vec::with_capacity(width * 3);
    for i in 0..width {
        roles.push(RoleDefinition::new(format!("it-req-{}", i), format!("IT Req {}", i)));
        roles.push(RoleDefinition::new(format!("it-permit-{}", i), format!("IT Permit {}", i)));
        roles.push(
            RoleDefinition::new(format!("business-{}", i), format!("Business {}", i))
                .requires(format!("it-req-{}", i))
                .permits(format!("it-permit-{}", i)),
        );
    }

    let mut builder = RoleGraphBuilder::new();
    builder.add_roles(roles).unwrap();
    builder.build().unwrap()
}

/// Single inheritance chain `level-{depth-1} -> ... -> level-0`
fn create_deep_model(depth: usize) -> RoleGraph {
    let mut roles = vec![RoleDefinition::new("level-0", "Level 0").requires("root-req")];
    roles.push(RoleDefinition::new("root-req", "Root Requirement"));
    for i in 1..depth {
        roles.push(
            RoleDefinition::new(format!("level-{}", i), format!("Level {}", i))
                .inherits(format!("level-{}", i - 1)),
        );
    }

    let mut builder = RoleGraphBuilder::new();
    builder.add_roles(roles).unwrap();
    builder.build().unwrap()
}

fn bench_wide_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_analysis");

    for width in [10, 100, 500].iter() {
        let graph = create_wide_model(*width);
        let assigned: Vec<RoleId> = (0..*width).map(|i| RoleId::new(format!("business-{}", i))).collect();
        let detected: Vec<RoleId> = (0..*width)
            .flat_map(|i| [format!("it-req-{}", i), format!("it-permit-{}", i)])
            .map(RoleId::new)
            .collect();

        group.bench_with_input(BenchmarkId::new("roles", width), width, |b, _| {
            let analyzer = RelationshipAnalyzer::new(&graph, TraversalLimits::default());
            b.iter(|| {
                let relationships = analyzer
                    .analyze(black_box(&assigned), black_box(&detected))
                    .unwrap();
                black_box(relationships);
            });
        });
    }

    group.finish();
}

fn bench_deep_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_analysis");

    for depth in [8, 32, 60].iter() {
        let graph = create_deep_model(*depth);
        let assigned = vec![RoleId::new(format!("level-{}", depth - 1))];
        let detected = vec![RoleId::new("root-req")];

        group.bench_with_input(BenchmarkId::new("depth", depth), depth, |b, _| {
            let analyzer = RelationshipAnalyzer::new(&graph, TraversalLimits::default());
            b.iter(|| {
                graph.clear_cache();
                let relationships = analyzer
                    .analyze(black_box(&assigned), black_box(&detected))
                    .unwrap();
                black_box(relationships);
            });
        });
    }

    group.finish();
}

fn bench_audit_batch(c: &mut Criterion) {
    let graph = create_wide_model(50);
    let policies = vec![SodPolicy::new("Bench").with_constraint(
        SodConstraint::new("first-vs-last")
            .left(RoleRef::new("business-0", "Business 0"))
            .right(RoleRef::new("business-49", "Business 49")),
    )];
    let auditor = RoleAuditor::new(&graph, &policies, AnalyzerConfig::default());

    let identities: Vec<IdentitySnapshot> = (0..1000)
        .map(|i| {
            let mut ledger = RoleAssignmentLedger::new(format!("user-{}", i));
            for role in [i % 50, (i * 7) % 50] {
                let mut assignment = RoleAssignment::new(format!("business-{}", role), "");
                assignment.assign().unwrap();
                ledger.merge(assignment);
            }
            let detected = vec![RoleId::new(format!("it-permit-{}", i % 50))];
            IdentitySnapshot::new(ledger, detected)
        })
        .collect();

    c.bench_function("audit_batch_1000", |b| {
        b.iter_batched(
            || identities.clone(),
            |mut batch| black_box(auditor.audit_batch(&mut batch)),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_wide_analysis,
    bench_deep_analysis,
    bench_audit_batch
);
criterion_main!(benches);
