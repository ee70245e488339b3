use clap::Parser;

mod commands;
mod logging;

use commands::Commands;

#[derive(Parser)]
#[command(name = "treecache")]
#[command(about = "Inspect treecache configurations and hierarchical names", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    let output = cli.command.execute()?;
    print!("{output}");
    Ok(())
}
