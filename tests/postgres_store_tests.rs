//! PostgreSQL-backed stores. Needs `DATABASE_URL` pointing at a scratch database;
//! `sqlx::test` creates an isolated database per test and applies `migrations/`.

#![cfg(feature = "postgres")]

mod common;

use common::{SopRequestBuilder, CATEGORY_ID};
use sqlx::PgPool;
use std::sync::Arc;

use sop_workflow::collaborators::{InMemoryCategoryDirectory, InMemoryParticipantDirectory};
use sop_workflow::events::BroadcastEventPublisher;
use sop_workflow::models::{Participant, WorkflowStage};
use sop_workflow::repository::WorkflowStores;
use sop_workflow::{ErrorKind, SopAggregateService, SopStatus, StageAction, WorkflowConfig};

fn service(pool: PgPool) -> SopAggregateService {
    let config = WorkflowConfig::default();
    SopAggregateService::new(
        WorkflowStores::postgres(pool),
        Arc::new(InMemoryCategoryDirectory::with_categories([(
            CATEGORY_ID.to_string(),
            "Health and Safety".to_string(),
        )])),
        Arc::new(InMemoryParticipantDirectory::with_users([
            "initiator", "author", "rev-1", "rev-2", "app-1",
        ])),
        Arc::new(BroadcastEventPublisher::from_config(&config.events)),
        &config,
    )
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_lifecycle(pool: PgPool) -> sqlx::Result<()> {
    let service = service(pool);
    let sop = service
        .initiate_sop(SopRequestBuilder::new().build())
        .await
        .unwrap();
    assert_eq!(sop.status, SopStatus::InReview);

    for reviewer in ["rev-1", "rev-2"] {
        service
            .submit_stage_action(sop.sop_id, reviewer, StageAction::ConfirmReview, None)
            .await
            .unwrap();
    }
    let outcome = service
        .submit_stage_action(sop.sop_id, "app-1", StageAction::Approve, Some("Ship it"))
        .await
        .unwrap();
    assert_eq!(outcome.sop.status, SopStatus::Approved);

    let view = service.get_sop(sop.sop_id).await.unwrap();
    assert_eq!(view.stages.len(), 4);
    assert_eq!(view.sop.status, SopStatus::Approved);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_duplicate_stage_is_conflict(pool: PgPool) -> sqlx::Result<()> {
    let service = service(pool.clone());
    let sop = service
        .initiate_sop(SopRequestBuilder::new().build())
        .await
        .unwrap();

    let stores = WorkflowStores::postgres(pool);
    let duplicate = WorkflowStage::pending(sop.sop_id, &Participant::reviewer("rev-1"), 9);
    let err = stores.stages.insert_many(&[duplicate]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    service.delete_sop(sop.sop_id).await.unwrap();
    assert!(stores.stages.find_by_sop(sop.sop_id).await.unwrap().is_empty());
    Ok(())
}
