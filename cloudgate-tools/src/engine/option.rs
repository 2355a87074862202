//! Option schemas and shared option fragments
//!
//! Every operation declares its surface as a list of [`OptionSchema`]s, most
//! of which arrive through named [`OptionFragment`]s shared across areas
//! (subscription scoping, tenant overrides, auth selection). The effective
//! list for an operation is computed once at registry build time by
//! [`effective_options`]: fragments fold in declaration order, then the
//! operation's own options, with later same-name entries replacing earlier
//! ones in place so the option order stays stable while the most specific
//! definition wins.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Value shape of a single option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    /// Free-form string value
    String,
    /// Bare flag on the CLI, boolean in a map
    Bool,
    /// 64-bit signed integer
    Int,
    /// Repeatable string value
    StringArray,
    /// RFC 3339 timestamp
    DateTime,
}

/// Declaration of one named option
///
/// Immutable once built; construct with the kind-specific helpers and chain
/// `required`/`hidden`/`default_value` as needed.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSchema {
    /// Flag name without the leading dashes (kebab-case)
    pub name: String,
    /// Help text shown in CLI help and tool listings
    pub description: String,
    /// Whether binding fails when the option is absent
    pub required: bool,
    /// Hidden options bind normally but are excluded from help and listings
    pub hidden: bool,
    /// Value shape
    pub kind: OptionKind,
    /// Applied when the option is absent from the input
    pub default_value: Option<Value>,
}

impl OptionSchema {
    fn new(name: &str, description: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            hidden: false,
            kind,
            default_value: None,
        }
    }

    /// A string-valued option
    pub fn string(name: &str, description: &str) -> Self {
        Self::new(name, description, OptionKind::String)
    }

    /// A boolean flag
    pub fn boolean(name: &str, description: &str) -> Self {
        Self::new(name, description, OptionKind::Bool)
    }

    /// An integer-valued option
    pub fn integer(name: &str, description: &str) -> Self {
        Self::new(name, description, OptionKind::Int)
    }

    /// A repeatable string option
    pub fn string_array(name: &str, description: &str) -> Self {
        Self::new(name, description, OptionKind::StringArray)
    }

    /// An RFC 3339 timestamp option
    pub fn datetime(name: &str, description: &str) -> Self {
        Self::new(name, description, OptionKind::DateTime)
    }

    /// Mark the option as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Hide the option from help and tool listings
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Value applied when the option is absent
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// JSON schema fragment for this option, used in advertised tool schemas
    pub fn property_schema(&self) -> Value {
        let type_name = match self.kind {
            OptionKind::String | OptionKind::DateTime => "string",
            OptionKind::Bool => "boolean",
            OptionKind::Int => "integer",
            OptionKind::StringArray => "array",
        };
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), Value::String(type_name.to_string()));
        schema.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        if self.kind == OptionKind::StringArray {
            schema.insert(
                "items".to_string(),
                serde_json::json!({ "type": "string" }),
            );
        }
        if self.kind == OptionKind::DateTime {
            schema.insert(
                "format".to_string(),
                Value::String("date-time".to_string()),
            );
        }
        if let Some(default) = &self.default_value {
            schema.insert("default".to_string(), default.clone());
        }
        Value::Object(schema)
    }
}

/// A named set of options shared across operations
///
/// Fragments are declared once as statics and referenced by every operation
/// that carries the concern, so a help-text fix lands everywhere at once.
#[derive(Debug)]
pub struct OptionFragment {
    /// Identifies the fragment in logs and docs
    pub name: &'static str,
    /// The options the fragment contributes, in declaration order
    pub options: Vec<OptionSchema>,
}

/// Fold a fragment chain and an operation's own options into one
/// de-duplicated list.
///
/// Later definitions of the same name replace earlier ones without moving
/// them, so a fragment fixes the position and the operation fixes the
/// content.
pub fn effective_options(
    fragments: &[&'static OptionFragment],
    own: &[OptionSchema],
) -> Vec<OptionSchema> {
    let mut merged: IndexMap<String, OptionSchema> = IndexMap::new();
    for fragment in fragments {
        for option in &fragment.options {
            merged.insert(option.name.clone(), option.clone());
        }
    }
    for option in own {
        merged.insert(option.name.clone(), option.clone());
    }
    merged.into_values().collect()
}
