//! # External Collaborators
//!
//! Lookups the workflow core issues outward during SOP initiation. Both are opaque
//! synchronous-from-the-caller queries whose only failure the core reacts to is
//! `NotFound`, which aborts initiation.
//!
//! The in-memory directories back tests and embedded deployments; production wiring
//! supplies adapters over the category and identity services.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{WorkflowError, WorkflowResult};

/// A category known to the catalogue service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: String,
    pub name: String,
}

/// A user known to the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantIdentity {
    pub user_id: String,
    pub display_name: String,
    pub department_id: Option<String>,
}

/// Resolves category ids to categories
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn resolve_category(&self, category_id: &str) -> WorkflowResult<Category>;
}

/// Resolves participant ids to identities
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    async fn resolve_participant(&self, user_id: &str) -> WorkflowResult<ParticipantIdentity>;
}

#[derive(Debug, Default)]
pub struct InMemoryCategoryDirectory {
    categories: DashMap<String, Category>,
}

impl InMemoryCategoryDirectory {
    pub fn with_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let directory = Self::default();
        for (category_id, name) in categories {
            directory.register(category_id, name);
        }
        directory
    }

    pub fn register(&self, category_id: impl Into<String>, name: impl Into<String>) {
        let category_id = category_id.into();
        self.categories.insert(
            category_id.clone(),
            Category {
                category_id,
                name: name.into(),
            },
        );
    }
}

#[async_trait]
impl CategoryDirectory for InMemoryCategoryDirectory {
    async fn resolve_category(&self, category_id: &str) -> WorkflowResult<Category> {
        self.categories
            .get(category_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| WorkflowError::not_found("Category", category_id))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryParticipantDirectory {
    participants: DashMap<String, ParticipantIdentity>,
}

impl InMemoryParticipantDirectory {
    pub fn with_users<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let directory = Self::default();
        for user_id in user_ids {
            let user_id = user_id.into();
            directory.register(ParticipantIdentity {
                display_name: user_id.clone(),
                user_id,
                department_id: None,
            });
        }
        directory
    }

    pub fn register(&self, identity: ParticipantIdentity) {
        self.participants.insert(identity.user_id.clone(), identity);
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryParticipantDirectory {
    async fn resolve_participant(&self, user_id: &str) -> WorkflowResult<ParticipantIdentity> {
        self.participants
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| WorkflowError::not_found("Participant", user_id))
    }
}
