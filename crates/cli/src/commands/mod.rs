use clap::Subcommand;
use std::path::PathBuf;

pub mod fqn;
pub mod inspect;

use self::fqn::FqnCommands;

#[derive(Subcommand)]
pub enum Commands {
    /// Bootstrap a cache from a configuration file and print its state
    Inspect {
        /// Configuration file (defaults to the user configuration directory)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Parse and compose hierarchical names
    Fqn {
        #[command(subcommand)]
        command: FqnCommands,
    },
}

impl Commands {
    /// Run the command, returning what should be printed on stdout
    pub fn execute(self) -> anyhow::Result<String> {
        match self {
            Commands::Inspect { config } => inspect::execute(config),
            Commands::Fqn { command } => command.execute(),
        }
    }
}
