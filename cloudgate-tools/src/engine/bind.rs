//! Dual-input binder
//!
//! Invocations arrive as either a CLI token vector (`--name value ...`) or a
//! flat JSON map of option names to values. Both shapes converge on a single
//! clap parse: the map is first rewritten into the token vector it would
//! have been on a command line, so every downstream rule (value parsing,
//! defaults, required-option checking) exists exactly once and the two
//! shapes cannot drift apart.
//!
//! Arguments are declared non-required in the generated parser; the binder
//! checks required options itself after parsing so one failure reports every
//! missing name at once instead of the first.

use chrono::{DateTime, Utc};
use clap::{Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::engine::errors::{BindingFailure, CollaboratorError};
use crate::engine::option::{OptionKind, OptionSchema};
use crate::engine::registry::RegisteredOperation;

/// A single bound option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    Int(i64),
    StringArray(Vec<String>),
    DateTime(DateTime<Utc>),
}

/// The normalized, validated parameter bag handed to an operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    values: IndexMap<String, OptionValue>,
}

impl BoundParameters {
    /// String value, if the option was bound as a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// String value of an option the schema marks required.
    ///
    /// The binder guarantees presence, so a miss here means the operation
    /// asked for an option it never declared.
    pub fn require_str(&self, name: &str) -> Result<&str, CollaboratorError> {
        self.get_str(name).ok_or_else(|| {
            CollaboratorError::Other(format!("option '{name}' was not bound"))
        })
    }

    /// Boolean value; absent flags read as false
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(true)))
    }

    /// Integer value, if bound
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(OptionValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Array value, if bound
    pub fn get_str_array(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(OptionValue::StringArray(items)) => Some(items),
            _ => None,
        }
    }

    /// Timestamp value, if bound
    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.values.get(name) {
            Some(OptionValue::DateTime(stamp)) => Some(*stamp),
            _ => None,
        }
    }

    /// JSON view of the bound values, used when logging a failed invocation
    pub fn snapshot(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.values {
            let json = match value {
                OptionValue::String(s) => Value::String(s.clone()),
                OptionValue::Bool(b) => Value::Bool(*b),
                OptionValue::Int(i) => Value::from(*i),
                OptionValue::StringArray(items) => {
                    Value::Array(items.iter().cloned().map(Value::String).collect())
                }
                OptionValue::DateTime(stamp) => Value::String(stamp.to_rfc3339()),
            };
            map.insert(name.clone(), json);
        }
        Value::Object(map)
    }

    /// Number of bound options
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing was bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Converts raw input into [`BoundParameters`] against an operation's
/// effective option list
pub struct Binder;

impl Binder {
    /// A clap argument for one option schema.
    ///
    /// Shared with the CLI builder so generated help and binding agree on
    /// every flag. Required checking is done by the binder, not clap.
    pub fn argument_for(schema: &OptionSchema) -> Arg {
        let mut arg = Arg::new(schema.name.clone())
            .long(schema.name.clone())
            .help(schema.description.clone())
            .hide(schema.hidden);
        arg = match schema.kind {
            OptionKind::Bool => arg.action(ArgAction::SetTrue),
            OptionKind::StringArray => arg.action(ArgAction::Append),
            _ => arg.action(ArgAction::Set),
        };
        arg
    }

    fn parser_for(operation: &RegisteredOperation) -> Command {
        let mut command = Command::new("bind")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true);
        for schema in &operation.options {
            command = command.arg(Self::argument_for(schema));
        }
        command
    }

    /// Bind a CLI-shaped token vector
    pub fn bind_tokens(
        operation: &RegisteredOperation,
        tokens: &[String],
    ) -> Result<BoundParameters, BindingFailure> {
        let matches = Self::parser_for(operation)
            .try_get_matches_from(tokens)
            .map_err(|e| BindingFailure::InvalidArguments {
                message: e.to_string(),
            })?;
        Self::bind_matches(operation, &matches)
    }

    /// Bind a flat JSON name→value map by rewriting it into the token vector
    /// it would have been on the command line.
    ///
    /// Nulls are dropped, scalars become literal token text, arrays repeat
    /// the flag. Keys the operation does not declare are ignored so callers
    /// built against an older or wider surface keep working.
    pub fn bind_map(
        operation: &RegisteredOperation,
        map: &serde_json::Map<String, Value>,
    ) -> Result<BoundParameters, BindingFailure> {
        let tokens = Self::map_to_tokens(&operation.options, map);
        Self::bind_tokens(operation, &tokens)
    }

    /// Extract bound values from an already-parsed match set.
    ///
    /// The CLI calls this directly with the leaf subcommand's matches.
    pub fn bind_matches(
        operation: &RegisteredOperation,
        matches: &ArgMatches,
    ) -> Result<BoundParameters, BindingFailure> {
        let mut values = IndexMap::new();
        for schema in &operation.options {
            if let Some(value) = Self::extract(matches, schema)? {
                values.insert(schema.name.clone(), value);
            } else if let Some(default) = &schema.default_value {
                if let Some(value) = Self::value_from_json(schema, default) {
                    values.insert(schema.name.clone(), value);
                }
            }
        }

        let missing: Vec<String> = operation
            .options
            .iter()
            .filter(|schema| schema.required && !values.contains_key(&schema.name))
            .map(|schema| schema.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(BindingFailure::MissingRequired { missing });
        }
        Ok(BoundParameters { values })
    }

    fn extract(
        matches: &ArgMatches,
        schema: &OptionSchema,
    ) -> Result<Option<OptionValue>, BindingFailure> {
        let name = schema.name.as_str();
        let value = match schema.kind {
            OptionKind::Bool => {
                if matches.get_flag(name) {
                    Some(OptionValue::Bool(true))
                } else {
                    None
                }
            }
            OptionKind::String => matches
                .get_one::<String>(name)
                .map(|s| OptionValue::String(s.clone())),
            OptionKind::Int => match matches.get_one::<String>(name) {
                Some(raw) => Some(OptionValue::Int(raw.parse().map_err(|_| {
                    BindingFailure::InvalidArguments {
                        message: format!("invalid value '{raw}' for --{name}: expected an integer"),
                    }
                })?)),
                None => None,
            },
            OptionKind::StringArray => matches
                .get_many::<String>(name)
                .map(|items| OptionValue::StringArray(items.cloned().collect())),
            OptionKind::DateTime => match matches.get_one::<String>(name) {
                Some(raw) => {
                    let stamp = DateTime::parse_from_rfc3339(raw).map_err(|_| {
                        BindingFailure::InvalidArguments {
                            message: format!(
                                "invalid value '{raw}' for --{name}: expected an RFC 3339 timestamp"
                            ),
                        }
                    })?;
                    Some(OptionValue::DateTime(stamp.with_timezone(&Utc)))
                }
                None => None,
            },
        };
        Ok(value)
    }

    fn value_from_json(schema: &OptionSchema, json: &Value) -> Option<OptionValue> {
        match (schema.kind, json) {
            (OptionKind::String, Value::String(s)) => Some(OptionValue::String(s.clone())),
            (OptionKind::Bool, Value::Bool(b)) => Some(OptionValue::Bool(*b)),
            (OptionKind::Int, Value::Number(n)) => n.as_i64().map(OptionValue::Int),
            (OptionKind::StringArray, Value::Array(items)) => Some(OptionValue::StringArray(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            (OptionKind::DateTime, Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|stamp| OptionValue::DateTime(stamp.with_timezone(&Utc))),
            _ => None,
        }
    }

    /// Rewrite a JSON argument map into the equivalent token vector
    pub fn map_to_tokens(
        options: &[OptionSchema],
        map: &serde_json::Map<String, Value>,
    ) -> Vec<String> {
        let mut tokens = Vec::new();
        for schema in options {
            let Some(value) = map.get(&schema.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let flag = format!("--{}", schema.name);
            match schema.kind {
                OptionKind::Bool => {
                    if Self::truthy(value) {
                        tokens.push(flag);
                    }
                }
                OptionKind::StringArray => {
                    let items: Vec<&Value> = match value {
                        Value::Array(items) => items.iter().collect(),
                        other => vec![other],
                    };
                    for item in items {
                        if let Some(token) = Self::scalar_token(item) {
                            tokens.push(flag.clone());
                            tokens.push(token);
                        }
                    }
                }
                _ => {
                    if let Some(token) = Self::scalar_token(value) {
                        tokens.push(flag);
                        tokens.push(token);
                    }
                }
            }
        }

        for key in map.keys() {
            if !options.iter().any(|schema| schema.name == *key) {
                debug!(key = %key, "ignoring unknown argument key");
            }
        }
        tokens
    }

    fn scalar_token(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            other => serde_json::to_string(other).ok(),
        }
    }

    fn truthy(value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true",
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::registered_with;
    use serde_json::json;

    fn sample_operation() -> RegisteredOperation {
        registered_with(vec![
            OptionSchema::string("subscription", "Subscription").required(),
            OptionSchema::string("vault", "Vault name").required(),
            OptionSchema::boolean("include-disabled", "Include disabled entries"),
            OptionSchema::string_array("tag", "Tag filter"),
            OptionSchema::integer("top", "Page size").default_value(json!(25)),
            OptionSchema::datetime("created-after", "Creation lower bound"),
        ])
    }

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_token_and_map_input_bind_identically() {
        let op = sample_operation();
        let from_tokens = Binder::bind_tokens(
            &op,
            &tokens(&[
                "--subscription",
                "sub-1",
                "--vault",
                "kv-prod",
                "--include-disabled",
                "--tag",
                "env",
                "--tag",
                "team",
                "--top",
                "10",
                "--created-after",
                "2026-01-15T00:00:00Z",
            ]),
        )
        .unwrap();
        let from_map = Binder::bind_map(
            &op,
            json!({
                "subscription": "sub-1",
                "vault": "kv-prod",
                "include-disabled": true,
                "tag": ["env", "team"],
                "top": 10,
                "created-after": "2026-01-15T00:00:00Z",
            })
            .as_object()
            .unwrap(),
        )
        .unwrap();

        assert_eq!(from_tokens, from_map);
        assert_eq!(from_tokens.get_str("vault"), Some("kv-prod"));
        assert!(from_tokens.flag("include-disabled"));
        assert_eq!(
            from_tokens.get_str_array("tag"),
            Some(&["env".to_string(), "team".to_string()][..])
        );
        assert_eq!(from_tokens.get_int("top"), Some(10));
        assert!(from_tokens.get_datetime("created-after").is_some());
    }

    #[test]
    fn test_all_missing_required_reported_at_once() {
        let op = sample_operation();
        let err = Binder::bind_tokens(&op, &tokens(&["--tag", "env"])).unwrap_err();
        assert_eq!(
            err,
            BindingFailure::MissingRequired {
                missing: vec!["subscription".to_string(), "vault".to_string()],
            }
        );
    }

    #[test]
    fn test_unknown_map_keys_are_ignored() {
        let op = sample_operation();
        let bound = Binder::bind_map(
            &op,
            json!({
                "subscription": "sub-1",
                "vault": "kv-prod",
                "color": "blue",
            })
            .as_object()
            .unwrap(),
        )
        .unwrap();
        assert_eq!(bound.get_str("subscription"), Some("sub-1"));
        assert!(bound.get_str("color").is_none());
    }

    #[test]
    fn test_unknown_token_flag_is_rejected() {
        let op = sample_operation();
        let err = Binder::bind_tokens(
            &op,
            &tokens(&["--subscription", "sub-1", "--vault", "kv", "--color", "blue"]),
        )
        .unwrap_err();
        assert!(matches!(err, BindingFailure::InvalidArguments { .. }));
    }

    #[test]
    fn test_null_and_false_map_values_are_omitted() {
        let op = sample_operation();
        let bound = Binder::bind_map(
            &op,
            json!({
                "subscription": "sub-1",
                "vault": "kv-prod",
                "include-disabled": false,
                "created-after": null,
            })
            .as_object()
            .unwrap(),
        )
        .unwrap();
        assert!(!bound.flag("include-disabled"));
        assert!(bound.get_datetime("created-after").is_none());
    }

    #[test]
    fn test_default_applies_when_absent() {
        let op = sample_operation();
        let bound =
            Binder::bind_tokens(&op, &tokens(&["--subscription", "s", "--vault", "v"])).unwrap();
        assert_eq!(bound.get_int("top"), Some(25));

        let bound = Binder::bind_tokens(
            &op,
            &tokens(&["--subscription", "s", "--vault", "v", "--top", "99"]),
        )
        .unwrap();
        assert_eq!(bound.get_int("top"), Some(99));
    }

    #[test]
    fn test_invalid_int_and_timestamp_values() {
        let op = sample_operation();
        let err = Binder::bind_tokens(
            &op,
            &tokens(&["--subscription", "s", "--vault", "v", "--top", "lots"]),
        )
        .unwrap_err();
        assert!(matches!(err, BindingFailure::InvalidArguments { message } if message.contains("--top")));

        let err = Binder::bind_tokens(
            &op,
            &tokens(&[
                "--subscription",
                "s",
                "--vault",
                "v",
                "--created-after",
                "yesterday",
            ]),
        )
        .unwrap_err();
        assert!(
            matches!(err, BindingFailure::InvalidArguments { message } if message.contains("--created-after"))
        );
    }

    #[test]
    fn test_snapshot_reflects_bound_values() {
        let op = sample_operation();
        let bound = Binder::bind_tokens(
            &op,
            &tokens(&["--subscription", "s", "--vault", "v", "--tag", "env"]),
        )
        .unwrap();
        let snapshot = bound.snapshot();
        assert_eq!(snapshot["subscription"], "s");
        assert_eq!(snapshot["tag"], json!(["env"]));
        assert_eq!(snapshot["top"], 25);
    }
}
