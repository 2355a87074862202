//! Hidden introspection area
//!
//! `tools list` reports the visible command surface as data. The group is
//! hidden, so nothing here appears in listings or generated help, but the
//! operation stays invocable by its explicit path.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::engine::bind::BoundParameters;
use crate::engine::context::ToolContext;
use crate::engine::errors::{CollaboratorError, StartupError};
use crate::engine::group::OperationGroup;
use crate::engine::operation::CommandOperation;

/// Register the hidden `tools` subtree
pub fn register(root: &mut OperationGroup) -> Result<(), StartupError> {
    let mut tools = OperationGroup::new("tools", "Command surface introspection").hidden();
    tools.push_operation(ToolsListOperation)?;
    root.push_group(tools)
}

/// `tools list`
pub struct ToolsListOperation;

#[async_trait]
impl CommandOperation for ToolsListOperation {
    fn name(&self) -> &'static str {
        "list"
    }

    fn title(&self) -> &'static str {
        "List operations"
    }

    fn description(&self) -> &'static str {
        "Describe every visible operation and its options"
    }

    async fn execute(
        &self,
        _params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        let listing: Vec<Value> = context
            .registry
            .visible_operations()
            .map(|op| {
                let options: Vec<Value> = op
                    .options
                    .iter()
                    .filter(|schema| !schema.hidden)
                    .map(|schema| {
                        json!({
                            "name": schema.name,
                            "description": schema.description,
                            "required": schema.required,
                        })
                    })
                    .collect();
                json!({
                    "name": op.operation.name(),
                    "title": op.operation.title(),
                    "description": op.operation.description(),
                    "command": op.flat_path(),
                    "options": options,
                })
            })
            .collect();
        Ok(Some(Value::Array(listing)))
    }
}
