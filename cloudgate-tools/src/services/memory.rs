//! In-memory catalog backing all three service traits
//!
//! Ships with the binary so the CLI and server run self-contained; also the
//! fixture the integration tests run against. Lookups are scoped by
//! subscription the same way a real provider client would scope them.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::engine::errors::CollaboratorError;
use crate::services::{
    CacheInstance, CacheService, ClusterRecord, ClusterService, SecretRecord, VaultService,
};

/// Fixture-backed implementation of every collaborator service
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    caches: Vec<(String, CacheInstance)>,
    secrets: Vec<(String, String, SecretRecord)>,
    clusters: Vec<(String, ClusterRecord)>,
}

fn stamp(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

impl InMemoryCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog the binary and tests ship with: two subscriptions, one
    /// vault with three secrets, two clusters.
    pub fn with_sample_data() -> Self {
        let mut catalog = Self::new();

        catalog.add_cache(
            "sub-1",
            CacheInstance {
                name: "redis-orders".to_string(),
                location: "westeurope".to_string(),
                sku: "Standard C1".to_string(),
                host: "redis-orders.example.net".to_string(),
                port: 6380,
            },
        );
        catalog.add_cache(
            "sub-1",
            CacheInstance {
                name: "redis-sessions".to_string(),
                location: "westeurope".to_string(),
                sku: "Basic C0".to_string(),
                host: "redis-sessions.example.net".to_string(),
                port: 6380,
            },
        );
        catalog.add_cache(
            "sub-2",
            CacheInstance {
                name: "redis-reporting".to_string(),
                location: "eastus".to_string(),
                sku: "Premium P1".to_string(),
                host: "redis-reporting.example.net".to_string(),
                port: 6380,
            },
        );

        catalog.add_secret(
            "sub-1",
            "kv-prod",
            SecretRecord {
                name: "db-password".to_string(),
                enabled: true,
                created: stamp(2025, 11, 3, 9, 30),
                value: Some("s3cr3t-db".to_string()),
            },
        );
        catalog.add_secret(
            "sub-1",
            "kv-prod",
            SecretRecord {
                name: "api-key".to_string(),
                enabled: true,
                created: stamp(2026, 2, 14, 16, 0),
                value: Some("s3cr3t-api".to_string()),
            },
        );
        catalog.add_secret(
            "sub-1",
            "kv-prod",
            SecretRecord {
                name: "legacy-token".to_string(),
                enabled: false,
                created: stamp(2024, 6, 1, 8, 0),
                value: Some("s3cr3t-legacy".to_string()),
            },
        );

        catalog.add_cluster(
            "sub-1",
            ClusterRecord {
                name: "aks-prod".to_string(),
                resource_group: "rg-platform".to_string(),
                node_count: 5,
                kubernetes_version: "1.31.2".to_string(),
                power_state: "Running".to_string(),
            },
        );
        catalog.add_cluster(
            "sub-1",
            ClusterRecord {
                name: "aks-staging".to_string(),
                resource_group: "rg-staging".to_string(),
                node_count: 2,
                kubernetes_version: "1.32.0".to_string(),
                power_state: "Stopped".to_string(),
            },
        );

        catalog
    }

    pub fn add_cache(&mut self, subscription: &str, instance: CacheInstance) {
        self.caches.push((subscription.to_string(), instance));
    }

    pub fn add_secret(&mut self, subscription: &str, vault: &str, secret: SecretRecord) {
        self.secrets
            .push((subscription.to_string(), vault.to_string(), secret));
    }

    pub fn add_cluster(&mut self, subscription: &str, cluster: ClusterRecord) {
        self.clusters.push((subscription.to_string(), cluster));
    }
}

#[async_trait]
impl CacheService for InMemoryCatalog {
    async fn list_instances(
        &self,
        subscription: &str,
    ) -> Result<Vec<CacheInstance>, CollaboratorError> {
        Ok(self
            .caches
            .iter()
            .filter(|(sub, _)| sub == subscription)
            .map(|(_, instance)| instance.clone())
            .collect())
    }
}

#[async_trait]
impl VaultService for InMemoryCatalog {
    async fn list_secrets(
        &self,
        subscription: &str,
        vault: &str,
    ) -> Result<Vec<SecretRecord>, CollaboratorError> {
        Ok(self
            .secrets
            .iter()
            .filter(|(sub, v, _)| sub == subscription && v == vault)
            .map(|(_, _, secret)| SecretRecord {
                value: None,
                ..secret.clone()
            })
            .collect())
    }

    async fn get_secret(
        &self,
        subscription: &str,
        vault: &str,
        name: &str,
    ) -> Result<SecretRecord, CollaboratorError> {
        self.secrets
            .iter()
            .find(|(sub, v, secret)| sub == subscription && v == vault && secret.name == name)
            .map(|(_, _, secret)| secret.clone())
            .ok_or_else(|| CollaboratorError::NotFound {
                resource: format!("secret '{name}' in vault '{vault}'"),
            })
    }
}

#[async_trait]
impl ClusterService for InMemoryCatalog {
    async fn list_clusters(
        &self,
        subscription: &str,
        resource_group: Option<&str>,
    ) -> Result<Vec<ClusterRecord>, CollaboratorError> {
        Ok(self
            .clusters
            .iter()
            .filter(|(sub, _)| sub == subscription)
            .filter(|(_, cluster)| {
                resource_group.is_none_or(|rg| cluster.resource_group == rg)
            })
            .map(|(_, cluster)| cluster.clone())
            .collect())
    }

    async fn get_cluster(
        &self,
        subscription: &str,
        name: &str,
    ) -> Result<ClusterRecord, CollaboratorError> {
        self.clusters
            .iter()
            .find(|(sub, cluster)| sub == subscription && cluster.name == name)
            .map(|(_, cluster)| cluster.clone())
            .ok_or_else(|| CollaboratorError::NotFound {
                resource: format!("cluster '{name}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_is_subscription_scoped() {
        let catalog = InMemoryCatalog::with_sample_data();
        let sub1 = catalog.list_instances("sub-1").await.unwrap();
        let sub2 = catalog.list_instances("sub-2").await.unwrap();
        assert_eq!(sub1.len(), 2);
        assert_eq!(sub2.len(), 1);
        assert!(catalog.list_instances("sub-9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_secret_listing_strips_values() {
        let catalog = InMemoryCatalog::with_sample_data();
        let secrets = catalog.list_secrets("sub-1", "kv-prod").await.unwrap();
        assert_eq!(secrets.len(), 3);
        assert!(secrets.iter().all(|secret| secret.value.is_none()));
    }

    #[tokio::test]
    async fn test_get_secret_includes_value_or_misses() {
        let catalog = InMemoryCatalog::with_sample_data();
        let secret = catalog
            .get_secret("sub-1", "kv-prod", "db-password")
            .await
            .unwrap();
        assert_eq!(secret.value.as_deref(), Some("s3cr3t-db"));

        let miss = catalog
            .get_secret("sub-1", "kv-prod", "nope")
            .await
            .unwrap_err();
        assert!(matches!(miss, CollaboratorError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cluster_listing_honors_resource_group_filter() {
        let catalog = InMemoryCatalog::with_sample_data();
        let all = catalog.list_clusters("sub-1", None).await.unwrap();
        assert_eq!(all.len(), 2);
        let staging = catalog
            .list_clusters("sub-1", Some("rg-staging"))
            .await
            .unwrap();
        assert_eq!(staging.len(), 1);
        assert_eq!(staging[0].name, "aks-staging");
    }
}
