//! Exposure-mode router
//!
//! The operation tree is one fixed structure; how it is flattened into
//! externally advertised tools is a deployment decision made once at server
//! start. Three modes are supported: every visible operation as its own tool,
//! one tool per visible top-level group with a path selector argument, or a
//! single proxy tool that routes to any leaf by full path.
//!
//! The invariant the tests pin down: `list_tools` advertises exactly the
//! names `resolve` accepts, except that hidden operations are never listed
//! yet stay reachable through an explicit path selector.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::debug;

use crate::engine::context::ToolContext;
use crate::engine::envelope::ResponseEnvelope;
use crate::engine::errors::RoutingError;
use crate::engine::invoke::{invoke, InvocationInput};
use crate::engine::registry::{CommandRegistry, RegisteredOperation, PATH_SEPARATOR};

/// Reserved argument key carrying the operation-path selector in the
/// per-group and single-proxy modes
pub const SELECTOR_KEY: &str = "command";

/// Advertised name of the single proxy tool
pub const PROXY_TOOL_NAME: &str = "cloudgate";

/// How the tree is flattened into advertised tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExposureMode {
    /// One tool per visible operation
    #[default]
    PerOperation,
    /// One tool per visible top-level group, sub-path in the selector
    PerGroup,
    /// One proxy tool, full path in the selector
    SingleProxy,
}

impl std::str::FromStr for ExposureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-operation" => Ok(Self::PerOperation),
            "per-group" => Ok(Self::PerGroup),
            "single-proxy" => Ok(Self::SingleProxy),
            other => Err(format!(
                "unknown exposure mode '{other}' (expected per-operation, per-group, or single-proxy)"
            )),
        }
    }
}

impl std::fmt::Display for ExposureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PerOperation => "per-operation",
            Self::PerGroup => "per-group",
            Self::SingleProxy => "single-proxy",
        };
        f.write_str(name)
    }
}

/// One advertised tool, derived on demand from the tree
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Name callers invoke the tool by
    pub advertised_name: String,
    /// Tool description shown to callers
    pub description: String,
    /// JSON schema of the tool's argument object
    pub input_schema: serde_json::Map<String, Value>,
}

/// Routes inbound tool calls to registry leaves according to the active mode
pub struct ExposureRouter {
    registry: Arc<CommandRegistry>,
    mode: ExposureMode,
}

impl ExposureRouter {
    pub fn new(registry: Arc<CommandRegistry>, mode: ExposureMode) -> Self {
        Self { registry, mode }
    }

    pub fn mode(&self) -> ExposureMode {
        self.mode
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// The advertised tool set for the active mode
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        match self.mode {
            ExposureMode::PerOperation => self
                .registry
                .visible_operations()
                .map(|op| ToolDescriptor {
                    advertised_name: op.advertised_name(),
                    description: op.operation.description().to_string(),
                    input_schema: Self::operation_schema(op),
                })
                .collect(),
            ExposureMode::PerGroup => self
                .visible_groups()
                .map(|(name, description)| ToolDescriptor {
                    advertised_name: name.clone(),
                    description,
                    input_schema: Self::selector_schema(&format!(
                        "Operation path under '{name}', e.g. 'secret get'"
                    )),
                })
                .collect(),
            ExposureMode::SingleProxy => vec![ToolDescriptor {
                advertised_name: PROXY_TOOL_NAME.to_string(),
                description: "Invoke any CloudGate operation by its full path".to_string(),
                input_schema: Self::selector_schema(
                    "Full operation path, e.g. 'vault secret get'",
                ),
            }],
        }
    }

    /// Resolve an advertised name plus optional selector to a leaf
    pub fn resolve(
        &self,
        advertised: &str,
        selector: Option<&str>,
    ) -> Result<Arc<RegisteredOperation>, RoutingError> {
        match self.mode {
            ExposureMode::PerOperation => self
                .registry
                .visible_operations()
                .find(|op| op.advertised_name() == advertised)
                .cloned()
                .ok_or_else(|| RoutingError::UnknownTool {
                    name: advertised.to_string(),
                }),
            ExposureMode::PerGroup => {
                if !self.visible_groups().any(|(name, _)| name == advertised) {
                    return Err(RoutingError::UnknownTool {
                        name: advertised.to_string(),
                    });
                }
                let selector = self.require_selector(advertised, selector)?;
                let path = format!("{advertised}{PATH_SEPARATOR}{selector}");
                self.resolve_path(&path)
            }
            ExposureMode::SingleProxy => {
                if advertised != PROXY_TOOL_NAME {
                    return Err(RoutingError::UnknownTool {
                        name: advertised.to_string(),
                    });
                }
                let selector = self.require_selector(advertised, selector)?;
                self.resolve_path(selector)
            }
        }
    }

    /// Route one tool call end to end.
    ///
    /// Routing misses resolve here to a 404 envelope; nothing escapes as an
    /// error.
    pub async fn dispatch(
        &self,
        advertised: &str,
        mut arguments: serde_json::Map<String, Value>,
        context: &ToolContext,
    ) -> ResponseEnvelope {
        let started = Instant::now();
        let selector = match self.mode {
            // Direct dispatch has no selector; an argument named like the
            // reserved key must reach the binder untouched.
            ExposureMode::PerOperation => None,
            ExposureMode::PerGroup | ExposureMode::SingleProxy => {
                match arguments.remove(SELECTOR_KEY) {
                    Some(Value::String(path)) => Some(path),
                    Some(other) => {
                        debug!(value = %other, "non-string selector treated as absent");
                        None
                    }
                    None => None,
                }
            }
        };

        match self.resolve(advertised, selector.as_deref()) {
            Ok(operation) => invoke(&operation, InvocationInput::Map(&arguments), context).await,
            Err(miss) => {
                debug!(tool = %advertised, error = %miss, "routing failed");
                let duration = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                ResponseEnvelope::failure(miss.status(), miss.to_string(), duration)
            }
        }
    }

    fn resolve_path(&self, path: &str) -> Result<Arc<RegisteredOperation>, RoutingError> {
        self.registry
            .resolve(path)
            .cloned()
            .ok_or_else(|| RoutingError::UnknownOperationPath {
                path: path.to_string(),
            })
    }

    fn require_selector<'a>(
        &self,
        advertised: &str,
        selector: Option<&'a str>,
    ) -> Result<&'a str, RoutingError> {
        selector
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RoutingError::MissingSelector {
                tool: advertised.to_string(),
                key: SELECTOR_KEY,
            })
    }

    /// Top-level groups that contain at least one visible operation
    fn visible_groups(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.registry
            .root()
            .subgroups()
            .filter(|group| !group.is_hidden())
            .filter(|group| {
                self.registry
                    .visible_operations()
                    .any(|op| op.path.first().map(String::as_str) == Some(group.name()))
            })
            .map(|group| (group.name().to_string(), group.description().to_string()))
    }

    fn operation_schema(operation: &RegisteredOperation) -> serde_json::Map<String, Value> {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for schema in &operation.options {
            if schema.hidden {
                continue;
            }
            properties.insert(schema.name.clone(), schema.property_schema());
            if schema.required {
                required.push(Value::String(schema.name.clone()));
            }
        }
        let mut root = serde_json::Map::new();
        root.insert("type".to_string(), Value::String("object".to_string()));
        root.insert("properties".to_string(), Value::Object(properties));
        root.insert("required".to_string(), Value::Array(required));
        root
    }

    fn selector_schema(description: &str) -> serde_json::Map<String, Value> {
        let mut root = serde_json::Map::new();
        root.insert("type".to_string(), Value::String("object".to_string()));
        root.insert(
            "properties".to_string(),
            serde_json::json!({
                SELECTOR_KEY: {
                    "type": "string",
                    "description": description,
                }
            }),
        );
        root.insert(
            "required".to_string(),
            Value::Array(vec![Value::String(SELECTOR_KEY.to_string())]),
        );
        root.insert("additionalProperties".to_string(), Value::Bool(true));
        root
    }
}
