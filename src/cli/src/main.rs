//! Bufete CLI - inspect and validate the ERP's role permission table.
//!
//! Provides role, access, matrix and policy commands.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::policy::PolicyCommands;
use commands::{access, matrix, policy, roles};
use output::OutputFormat;

/// Bufete - role and permission inspector
#[derive(Parser)]
#[command(
    name = "bufete",
    version,
    about = "Bufete - role and permission inspector",
    long_about = "CLI tool for inspecting the Bufete permission table and validating policy files.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Policy file layered over the built-in table
    #[arg(long, global = true, env = "BUFETE_POLICY_FILE")]
    policy: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Role listing and descriptions
    #[command(subcommand)]
    Roles(roles::RolesCommands),

    /// Access level and allowed actions of a role in a module
    Access(access::AccessArgs),

    /// Whether a role may perform an action in a module
    Can(access::CanArgs),

    /// Print the role × module matrix
    Matrix(matrix::MatrixArgs),

    /// Policy file operations
    #[command(subcommand)]
    Policy(policy::PolicyCommands),
}

fn run(cli: Cli) -> Result<()> {
    let policy = cli.policy.or_else(commands::default_policy_path);
    let table = || commands::load_table(policy.as_deref());
    let format = cli.output;

    match cli.command {
        Commands::Roles(cmd) => roles::execute(cmd, &table()?, format),
        Commands::Access(args) => access::access(args, &table()?, format),
        Commands::Can(args) => access::can(args, &table()?, format),
        Commands::Matrix(args) => matrix::execute(args, &table()?, format),
        Commands::Policy(PolicyCommands::Validate { file }) => policy::validate(&file, format),
        Commands::Policy(PolicyCommands::Export { out }) => policy::export(&table()?, out.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
