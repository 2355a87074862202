//! Command registry: the built, indexed operation tree
//!
//! Areas register their subtrees through plain registrar functions; the
//! registry walks the finished tree once, computes each leaf's effective
//! option list and effective visibility, and indexes every leaf by its flat
//! path. Construction fails fast on any integrity problem so a broken tree
//! can never serve traffic.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::engine::errors::StartupError;
use crate::engine::group::OperationGroup;
use crate::engine::operation::CommandOperation;
use crate::engine::option::{effective_options, OptionSchema};

/// Separator used in flat operation paths, e.g. `vault secret get`
pub const PATH_SEPARATOR: &str = " ";

/// Separator used in advertised per-operation tool names, e.g.
/// `vault_secret_get`
pub const ADVERTISED_SEPARATOR: &str = "_";

/// A registrar contributes one area's subtree to the root group
pub type AreaRegistrar = fn(&mut OperationGroup) -> Result<(), StartupError>;

/// A leaf with its build-time derived metadata
pub struct RegisteredOperation {
    /// Path segments from the root to the leaf
    pub path: Vec<String>,
    /// The operation implementation
    pub operation: Arc<dyn CommandOperation>,
    /// De-duplicated effective option list (fragments then own options)
    pub options: Vec<OptionSchema>,
    /// Hidden on the leaf itself or inherited from any ancestor group
    pub hidden: bool,
}

impl RegisteredOperation {
    /// Space-joined flat path; round-trips through [`CommandRegistry::resolve`]
    pub fn flat_path(&self) -> String {
        self.path.join(PATH_SEPARATOR)
    }

    /// Underscore-joined name used when each operation is advertised as its
    /// own tool
    pub fn advertised_name(&self) -> String {
        self.path.join(ADVERTISED_SEPARATOR)
    }
}

impl std::fmt::Debug for RegisteredOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredOperation")
            .field("path", &self.path)
            .field("hidden", &self.hidden)
            .field("options", &self.options.len())
            .finish()
    }
}

/// The immutable, fully-indexed operation tree
pub struct CommandRegistry {
    root: OperationGroup,
    index: IndexMap<String, Arc<RegisteredOperation>>,
}

impl CommandRegistry {
    /// Build the registry by running every registrar against an empty root,
    /// then walking and indexing the tree.
    ///
    /// Fails on the first duplicate sibling name or flat-path collision.
    pub fn build(registrars: &[AreaRegistrar]) -> Result<Self, StartupError> {
        let mut root = OperationGroup::root();
        for registrar in registrars {
            registrar(&mut root)?;
        }

        let mut index = IndexMap::new();
        Self::walk(&root, &mut Vec::new(), false, &mut index)?;
        debug!(operations = index.len(), "command registry built");
        Ok(Self { root, index })
    }

    fn walk(
        group: &OperationGroup,
        path: &mut Vec<String>,
        inherited_hidden: bool,
        index: &mut IndexMap<String, Arc<RegisteredOperation>>,
    ) -> Result<(), StartupError> {
        let hidden = inherited_hidden || group.is_hidden();

        for operation in group.operations() {
            path.push(operation.name().to_string());
            let registered = RegisteredOperation {
                path: path.clone(),
                options: effective_options(&operation.fragments(), &operation.options()),
                hidden: hidden || operation.hidden(),
                operation: Arc::clone(operation),
            };
            let flat = registered.flat_path();
            if index.insert(flat.clone(), Arc::new(registered)).is_some() {
                return Err(StartupError::DuplicatePath { path: flat });
            }
            path.pop();
        }

        for subgroup in group.subgroups() {
            path.push(subgroup.name().to_string());
            Self::walk(subgroup, path, hidden, index)?;
            path.pop();
        }
        Ok(())
    }

    /// The root of the tree, for help generation and introspection
    pub fn root(&self) -> &OperationGroup {
        &self.root
    }

    /// Look up a leaf by flat path.
    ///
    /// Hidden operations resolve like any other; hiding only affects
    /// listings.
    pub fn resolve(&self, flat_path: &str) -> Option<&Arc<RegisteredOperation>> {
        self.index.get(flat_path)
    }

    /// Every registered leaf, hidden or not, in tree order
    pub fn operations(&self) -> impl Iterator<Item = &Arc<RegisteredOperation>> {
        self.index.values()
    }

    /// The leaves that appear in listings and generated help
    pub fn visible_operations(&self) -> impl Iterator<Item = &Arc<RegisteredOperation>> {
        self.index.values().filter(|op| !op.hidden)
    }

    /// Number of registered leaves
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no registrar contributed anything
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("paths", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}
