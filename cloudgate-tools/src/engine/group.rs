//! The operation tree
//!
//! Areas contribute subtrees of [`OperationGroup`]s at registry build time.
//! The tree is built once, checked for sibling-name collisions as it grows,
//! and never mutated afterwards. Child ordering is declaration order
//! throughout, which is what the CLI help and tool listings show.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::engine::errors::StartupError;
use crate::engine::operation::CommandOperation;

/// An interior node of the operation tree
#[derive(Default)]
pub struct OperationGroup {
    name: String,
    description: String,
    hidden: bool,
    subgroups: IndexMap<String, OperationGroup>,
    operations: IndexMap<String, Arc<dyn CommandOperation>>,
}

impl OperationGroup {
    /// Create an empty group
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// The root node; its name never appears in paths
    pub(crate) fn root() -> Self {
        Self::default()
    }

    /// Hide the group and everything beneath it from listings and help
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Group name (kebab-case path segment)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text for the group
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the group itself is marked hidden
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Child groups in declaration order
    pub fn subgroups(&self) -> impl Iterator<Item = &OperationGroup> {
        self.subgroups.values()
    }

    /// Child operations in declaration order
    pub fn operations(&self) -> impl Iterator<Item = &Arc<dyn CommandOperation>> {
        self.operations.values()
    }

    /// Look up a direct child group by name
    pub fn subgroup(&self, name: &str) -> Option<&OperationGroup> {
        self.subgroups.get(name)
    }

    /// Attach a child group, rejecting sibling-name collisions
    pub fn push_group(&mut self, group: OperationGroup) -> Result<(), StartupError> {
        let name = group.name.clone();
        if self.subgroups.contains_key(&name) || self.operations.contains_key(&name) {
            return Err(StartupError::DuplicateSibling {
                parent: self.parent_label(),
                name,
            });
        }
        self.subgroups.insert(name, group);
        Ok(())
    }

    /// Attach a leaf operation, rejecting sibling-name collisions
    pub fn push_operation<T>(&mut self, operation: T) -> Result<(), StartupError>
    where
        T: CommandOperation + 'static,
    {
        let name = operation.name().to_string();
        if self.operations.contains_key(&name) || self.subgroups.contains_key(&name) {
            return Err(StartupError::DuplicateSibling {
                parent: self.parent_label(),
                name,
            });
        }
        self.operations.insert(name, Arc::new(operation));
        Ok(())
    }

    fn parent_label(&self) -> String {
        if self.name.is_empty() {
            "root".to_string()
        } else {
            self.name.clone()
        }
    }
}

impl std::fmt::Debug for OperationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationGroup")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("subgroups", &self.subgroups.keys().collect::<Vec<_>>())
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}
