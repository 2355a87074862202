//! Collaborator service traits and the resolver operations reach them
//! through
//!
//! Cloud-provider semantics stay outside the engine behind these narrow
//! traits. Operations never construct a client themselves; they ask the
//! resolver, which returns an error for any service the deployment did not
//! wire. Tests wire exactly the traits they exercise.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::errors::CollaboratorError;

pub use memory::InMemoryCatalog;

/// A managed cache instance
#[derive(Debug, Clone, Serialize)]
pub struct CacheInstance {
    pub name: String,
    pub location: String,
    pub sku: String,
    pub host: String,
    pub port: u16,
}

/// A vault secret, value included only on explicit retrieval
#[derive(Debug, Clone, Serialize)]
pub struct SecretRecord {
    pub name: String,
    pub enabled: bool,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A managed cluster
#[derive(Debug, Clone, Serialize)]
pub struct ClusterRecord {
    pub name: String,
    pub resource_group: String,
    pub node_count: u32,
    pub kubernetes_version: String,
    pub power_state: String,
}

/// Cache-instance listing
#[async_trait]
pub trait CacheService: Send + Sync {
    async fn list_instances(
        &self,
        subscription: &str,
    ) -> Result<Vec<CacheInstance>, CollaboratorError>;
}

/// Vault secret access
#[async_trait]
pub trait VaultService: std::fmt::Debug + Send + Sync {
    /// Secret metadata in a vault; values are never included
    async fn list_secrets(
        &self,
        subscription: &str,
        vault: &str,
    ) -> Result<Vec<SecretRecord>, CollaboratorError>;

    /// One secret with its value
    async fn get_secret(
        &self,
        subscription: &str,
        vault: &str,
        name: &str,
    ) -> Result<SecretRecord, CollaboratorError>;
}

/// Cluster inventory
#[async_trait]
pub trait ClusterService: Send + Sync {
    async fn list_clusters(
        &self,
        subscription: &str,
        resource_group: Option<&str>,
    ) -> Result<Vec<ClusterRecord>, CollaboratorError>;

    async fn get_cluster(
        &self,
        subscription: &str,
        name: &str,
    ) -> Result<ClusterRecord, CollaboratorError>;
}

/// Explicit typed access to the wired collaborator services.
///
/// No global lookup: a deployment wires what it serves, and an operation
/// reaching for anything else gets `ServiceUnavailable`.
#[derive(Default)]
pub struct ServiceResolver {
    cache: Option<Arc<dyn CacheService>>,
    vault: Option<Arc<dyn VaultService>>,
    cluster: Option<Arc<dyn ClusterService>>,
}

impl ServiceResolver {
    /// Resolver with nothing wired
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver backed entirely by the in-memory sample catalog
    pub fn sample() -> Self {
        let catalog = Arc::new(InMemoryCatalog::with_sample_data());
        Self::new()
            .with_cache(catalog.clone())
            .with_vault(catalog.clone())
            .with_cluster(catalog)
    }

    pub fn with_cache(mut self, service: Arc<dyn CacheService>) -> Self {
        self.cache = Some(service);
        self
    }

    pub fn with_vault(mut self, service: Arc<dyn VaultService>) -> Self {
        self.vault = Some(service);
        self
    }

    pub fn with_cluster(mut self, service: Arc<dyn ClusterService>) -> Self {
        self.cluster = Some(service);
        self
    }

    pub fn cache(&self) -> Result<&Arc<dyn CacheService>, CollaboratorError> {
        self.cache
            .as_ref()
            .ok_or(CollaboratorError::ServiceUnavailable { service: "cache" })
    }

    pub fn vault(&self) -> Result<&Arc<dyn VaultService>, CollaboratorError> {
        self.vault
            .as_ref()
            .ok_or(CollaboratorError::ServiceUnavailable { service: "vault" })
    }

    pub fn cluster(&self) -> Result<&Arc<dyn ClusterService>, CollaboratorError> {
        self.cluster
            .as_ref()
            .ok_or(CollaboratorError::ServiceUnavailable { service: "cluster" })
    }
}
