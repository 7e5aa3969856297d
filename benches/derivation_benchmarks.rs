use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sop_workflow::models::{Participant, WorkflowStage};
use sop_workflow::state_machine::{derive_status, is_fully_approved};
use sop_workflow::StageStatus;
use uuid::Uuid;

fn stage_set(reviewers: usize, approvers: usize) -> Vec<WorkflowStage> {
    let sop_id = Uuid::new_v4();
    let mut stages = vec![WorkflowStage::pending(sop_id, &Participant::author("author"), 0)];
    for i in 0..reviewers {
        let participant = Participant::reviewer(format!("rev-{i}"));
        stages.push(
            WorkflowStage::pending(sop_id, &participant, stages.len() as i32)
                .with_status(StageStatus::Reviewed),
        );
    }
    for i in 0..approvers {
        let participant = Participant::approver(format!("app-{i}"));
        stages.push(
            WorkflowStage::pending(sop_id, &participant, stages.len() as i32)
                .with_status(StageStatus::Approved),
        );
    }
    stages
}

fn benchmark_derive_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_status");
    for size in [4usize, 16, 64] {
        let stages = stage_set(size, size / 4 + 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &stages, |b, stages| {
            b.iter(|| derive_status(black_box(stages)))
        });
    }
    group.finish();
}

fn benchmark_publication_gate(c: &mut Criterion) {
    let stages = stage_set(16, 4);
    c.bench_function("is_fully_approved", |b| {
        b.iter(|| is_fully_approved(black_box(&stages)))
    });
}

criterion_group!(benches, benchmark_derive_status, benchmark_publication_gate);
criterion_main!(benches);
