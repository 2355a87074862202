//! The invoker: bind, execute, envelope
//!
//! Every per-call failure is resolved here into a well-formed envelope;
//! nothing below this layer leaks an error across a process boundary. The
//! duration covers binding through envelope construction, so binding
//! failures are timed too.

use std::time::Instant;

use clap::ArgMatches;
use serde_json::Value;
use tracing::{debug, error};

use crate::engine::bind::Binder;
use crate::engine::context::ToolContext;
use crate::engine::envelope::ResponseEnvelope;
use crate::engine::registry::RegisteredOperation;

/// The two raw input shapes, plus pre-parsed CLI matches
pub enum InvocationInput<'a> {
    /// CLI-shaped `--name value` tokens
    Tokens(&'a [String]),
    /// Flat JSON name→value map from a tool call
    Map(&'a serde_json::Map<String, Value>),
    /// Matches already parsed by the CLI's generated command tree
    Matches(&'a ArgMatches),
}

/// Run one operation end to end and produce its envelope.
///
/// Never returns an error: binding failures become 400, collaborator
/// failures go through the operation's classifier (500 by default).
pub async fn invoke(
    operation: &RegisteredOperation,
    input: InvocationInput<'_>,
    context: &ToolContext,
) -> ResponseEnvelope {
    let started = Instant::now();
    let path = operation.flat_path();

    let bound = match input {
        InvocationInput::Tokens(tokens) => Binder::bind_tokens(operation, tokens),
        InvocationInput::Map(map) => Binder::bind_map(operation, map),
        InvocationInput::Matches(matches) => Binder::bind_matches(operation, matches),
    };
    let params = match bound {
        Ok(params) => params,
        Err(failure) => {
            debug!(operation = %path, error = %failure, "binding failed");
            return ResponseEnvelope::failure(400, failure.to_string(), elapsed_ms(started));
        }
    };

    match operation.operation.execute(&params, context).await {
        Ok(results) => ResponseEnvelope::success(results, elapsed_ms(started)),
        Err(cause) => {
            error!(
                operation = %path,
                parameters = %params.snapshot(),
                error = %cause,
                "operation failed"
            );
            let (status, message) = operation
                .operation
                .classify_error(&cause)
                .unwrap_or_else(|| (500, cause.to_string()));
            ResponseEnvelope::failure(status, message, elapsed_ms(started))
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
