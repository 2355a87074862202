//! Cluster area

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::bind::BoundParameters;
use crate::engine::context::ToolContext;
use crate::engine::errors::{CollaboratorError, StartupError};
use crate::engine::group::OperationGroup;
use crate::engine::operation::CommandOperation;
use crate::engine::option::{OptionFragment, OptionSchema};
use crate::tools::{resource_fragment, retry_fragment, scope_fragment};

/// Register the `cluster` subtree
pub fn register(root: &mut OperationGroup) -> Result<(), StartupError> {
    let mut cluster = OperationGroup::new("cluster", "Managed cluster operations");
    cluster.push_operation(ClusterListOperation)?;
    cluster.push_operation(ClusterGetOperation)?;
    root.push_group(cluster)
}

/// `cluster list`
pub struct ClusterListOperation;

#[async_trait]
impl CommandOperation for ClusterListOperation {
    fn name(&self) -> &'static str {
        "list"
    }

    fn title(&self) -> &'static str {
        "List clusters"
    }

    fn description(&self) -> &'static str {
        "List managed clusters, optionally restricted to one resource group"
    }

    fn fragments(&self) -> Vec<&'static OptionFragment> {
        vec![scope_fragment(), retry_fragment(), resource_fragment()]
    }

    async fn execute(
        &self,
        params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        let clusters = context
            .services
            .cluster()?
            .list_clusters(
                params.require_str("subscription")?,
                params.get_str("resource-group"),
            )
            .await?;
        serde_json::to_value(clusters)
            .map(Some)
            .map_err(|e| CollaboratorError::Other(e.to_string()))
    }
}

/// `cluster get`
pub struct ClusterGetOperation;

#[async_trait]
impl CommandOperation for ClusterGetOperation {
    fn name(&self) -> &'static str {
        "get"
    }

    fn title(&self) -> &'static str {
        "Get a cluster"
    }

    fn description(&self) -> &'static str {
        "Show one managed cluster"
    }

    fn fragments(&self) -> Vec<&'static OptionFragment> {
        vec![scope_fragment(), retry_fragment()]
    }

    fn options(&self) -> Vec<OptionSchema> {
        vec![OptionSchema::string("name", "Name of the cluster").required()]
    }

    async fn execute(
        &self,
        params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        let cluster = context
            .services
            .cluster()?
            .get_cluster(
                params.require_str("subscription")?,
                params.require_str("name")?,
            )
            .await?;
        serde_json::to_value(cluster)
            .map(Some)
            .map_err(|e| CollaboratorError::Other(e.to_string()))
    }

    fn classify_error(&self, error: &CollaboratorError) -> Option<(u16, String)> {
        match error {
            CollaboratorError::NotFound { .. } => Some((404, error.to_string())),
            _ => None,
        }
    }
}
