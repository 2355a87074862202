//! The operation trait every leaf implements

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::bind::BoundParameters;
use crate::engine::context::ToolContext;
use crate::engine::errors::CollaboratorError;
use crate::engine::option::{OptionFragment, OptionSchema};

/// A leaf in the operation tree
///
/// Implementations are registered once at startup and shared immutably
/// afterwards; `execute` must be reentrant. Business logic lives behind the
/// service traits reached through the context, so an operation is usually a
/// thin translation between bound parameters and one collaborator call.
#[async_trait]
pub trait CommandOperation: Send + Sync {
    /// Leaf name, unique among its siblings (kebab-case)
    fn name(&self) -> &'static str;

    /// Short human-readable title
    fn title(&self) -> &'static str;

    /// Help text shown in CLI help and tool listings
    fn description(&self) -> &'static str;

    /// Shared option fragments, most generic first
    fn fragments(&self) -> Vec<&'static OptionFragment> {
        Vec::new()
    }

    /// Options specific to this operation; same-name entries override
    /// fragment entries in place
    fn options(&self) -> Vec<OptionSchema> {
        Vec::new()
    }

    /// Hidden operations are excluded from listings and help but stay
    /// invocable by explicit path
    fn hidden(&self) -> bool {
        false
    }

    /// Run the operation against bound, validated parameters.
    ///
    /// `Ok(None)` means success with nothing to report; the envelope omits
    /// its results field. Errors are returned, never panicked.
    async fn execute(
        &self,
        params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError>;

    /// Map a collaborator error to an envelope status and message.
    ///
    /// `None` falls back to 500 with the error's display text. Override to
    /// surface collaborator-specific conditions (a lookup miss as 404, say)
    /// without teaching the engine about any collaborator.
    fn classify_error(&self, _error: &CollaboratorError) -> Option<(u16, String)> {
        None
    }
}
