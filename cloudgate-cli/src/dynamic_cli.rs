//! Dynamic CLI builder
//!
//! The clap command tree is generated from the command registry, so the CLI
//! surface and the tool-call surface are the same structure read two ways.
//! One static command (`serve`) sits alongside the generated tree.
//!
//! Hidden groups and operations are built into the tree with `hide(true)`:
//! they never show in help but parse normally, which keeps them invocable by
//! explicit path.

use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use cloudgate_tools::engine::bind::Binder;
use cloudgate_tools::engine::group::OperationGroup;
use cloudgate_tools::engine::registry::{CommandRegistry, PATH_SEPARATOR};

/// Builds the complete cloudgate CLI from the registry
pub struct CliBuilder {
    registry: Arc<CommandRegistry>,
}

impl CliBuilder {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// The full command tree: metadata, `serve`, then one subcommand per
    /// top-level group
    pub fn build_cli(&self) -> Command {
        let mut cli = Command::new("cloudgate")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Cloud resource operations behind one façade")
            .long_about(
                "\ncloudgate exposes cloud-resource operations through a CLI and an MCP\n\
                 tool server backed by the same command tree.\n\n\
                 Example usage:\n\
                 \x20 cloudgate cache list --subscription sub-1\n\
                 \x20 cloudgate serve --http --port 8080   # Run as MCP server\n",
            )
            .subcommand_required(true)
            .arg_required_else_help(true);

        cli = cli.subcommand(Self::serve_command());
        for group in self.registry.root().subgroups() {
            cli = cli.subcommand(self.group_command(group, &[]));
        }
        cli
    }

    fn serve_command() -> Command {
        Command::new("serve")
            .about("Run the MCP server")
            .arg(
                Arg::new("http")
                    .long("http")
                    .help("Use the HTTP transport instead of stdio")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("port")
                    .long("port")
                    .help("Port for the HTTP transport (random when omitted)")
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("expose")
                    .long("expose")
                    .help("Tool exposure mode: per-operation, per-group, or single-proxy")
                    .default_value("per-operation"),
            )
    }

    fn group_command(&self, group: &OperationGroup, prefix: &[String]) -> Command {
        let mut path: Vec<String> = prefix.to_vec();
        path.push(group.name().to_string());

        let mut command = Command::new(group.name().to_string())
            .about(group.description().to_string())
            .hide(group.is_hidden())
            .subcommand_required(true)
            .arg_required_else_help(true);

        for subgroup in group.subgroups() {
            command = command.subcommand(self.group_command(subgroup, &path));
        }
        for operation in group.operations() {
            let mut leaf_path = path.clone();
            leaf_path.push(operation.name().to_string());
            let flat = leaf_path.join(PATH_SEPARATOR);
            if let Some(registered) = self.registry.resolve(&flat) {
                let mut leaf = Command::new(operation.name().to_string())
                    .about(operation.description().to_string())
                    .hide(registered.hidden);
                for schema in &registered.options {
                    leaf = leaf.arg(Binder::argument_for(schema));
                }
                command = command.subcommand(leaf);
            }
        }
        command
    }
}
