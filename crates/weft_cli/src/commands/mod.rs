//! CLI command definitions.
//!
//! Each subcommand lives in its own module with an `execute` entry point
//! that runs against the current directory, and a `run` function taking an
//! explicit base directory for tests.

use clap::{Parser, Subcommand};

pub mod generate;
pub mod init;
pub mod provisioners;

/// weft - workload-to-infrastructure manifest generator
#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about = "weft - workload-to-infrastructure manifest generator")]
#[command(long_about = r#"
weft converts declarative workload specifications (containers, service
ports, abstract resource dependencies) into Bicep manifests.

WORKFLOWS:
  init          → Initialize the state directory and a sample workload spec
  generate      → Provision resources and render the manifest document
  provisioners  → Inspect the registered resource provisioners

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the state directory and a sample workload spec
    Init(init::InitArgs),

    /// Provision resources and render the manifest document
    Generate(generate::GenerateArgs),

    /// Subcommands related to resource provisioners
    Provisioners(provisioners::ProvisionersArgs),
}
