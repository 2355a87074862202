use std::process;
use std::sync::Arc;

use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

mod dynamic_cli;
mod error;
mod exit_codes;

use cloudgate_tools::engine::envelope::ResponseEnvelope;
use cloudgate_tools::engine::exposure::{ExposureMode, ExposureRouter};
use cloudgate_tools::engine::invoke::{invoke, InvocationInput};
use cloudgate_tools::engine::registry::{CommandRegistry, PATH_SEPARATOR};
use cloudgate_tools::mcp::{run_mcp_server, McpServer, McpServerMode};
use cloudgate_tools::{build_default_registry, default_context};
use dynamic_cli::CliBuilder;
use error::{handle_cli_result, CliError, CliResult};
use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

/// Logs go to stderr so stdout carries nothing but envelope JSON
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    // A broken tree must never serve traffic; refuse to start.
    let registry = match build_default_registry() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            eprintln!("Failed to build command registry: {e}");
            process::exit(EXIT_ERROR);
        }
    };

    let cli = CliBuilder::new(registry.clone()).build_cli();
    let matches = match cli.try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            use clap::error::ErrorKind;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{e}");
                    process::exit(EXIT_SUCCESS);
                }
                _ => {
                    eprintln!("{e}");
                    process::exit(EXIT_ERROR);
                }
            }
        }
    };

    let exit_code = handle_matches(matches, registry).await;
    process::exit(exit_code);
}

async fn handle_matches(matches: ArgMatches, registry: Arc<CommandRegistry>) -> i32 {
    match matches.subcommand() {
        Some(("serve", serve_matches)) => {
            handle_cli_result(run_serve(serve_matches, registry).await)
        }
        Some((group, group_matches)) => run_operation(group, group_matches, registry).await,
        None => EXIT_ERROR,
    }
}

/// Descend the parsed subcommand chain to the leaf, invoke it, and print the
/// envelope
async fn run_operation(
    first: &str,
    matches: &ArgMatches,
    registry: Arc<CommandRegistry>,
) -> i32 {
    let mut path = vec![first.to_string()];
    let mut current = matches;
    while let Some((child, child_matches)) = current.subcommand() {
        path.push(child.to_string());
        current = child_matches;
    }
    let flat = path.join(PATH_SEPARATOR);

    let envelope = match registry.resolve(&flat) {
        Some(operation) => {
            let context = default_context(registry.clone());
            invoke(operation, InvocationInput::Matches(current), &context).await
        }
        None => ResponseEnvelope::failure(404, format!("Unknown operation path: {flat}"), 0),
    };
    print_envelope(&envelope)
}

fn print_envelope(envelope: &ResponseEnvelope) -> i32 {
    match serde_json::to_string_pretty(envelope) {
        Ok(rendered) => {
            println!("{rendered}");
            if envelope.is_success() {
                EXIT_SUCCESS
            } else {
                EXIT_ERROR
            }
        }
        Err(e) => {
            eprintln!("Failed to render response: {e}");
            EXIT_ERROR
        }
    }
}

async fn run_serve(matches: &ArgMatches, registry: Arc<CommandRegistry>) -> CliResult<()> {
    let mode = if matches.get_flag("http") {
        McpServerMode::Http {
            port: matches.get_one::<u16>("port").copied(),
        }
    } else {
        McpServerMode::Stdio
    };

    let expose: ExposureMode = matches
        .get_one::<String>("expose")
        .map(String::as_str)
        .unwrap_or("per-operation")
        .parse()
        .map_err(|e: String| CliError::new(e, EXIT_ERROR))?;

    tracing::info!(mode = ?mode, expose = %expose, "starting cloudgate server");

    let router = Arc::new(ExposureRouter::new(registry.clone(), expose));
    let context = Arc::new(default_context(registry));
    let server = McpServer::new(router, context);
    run_mcp_server(mode, server)
        .await
        .map_err(|e| CliError::with_source("MCP server failed", e))
}
