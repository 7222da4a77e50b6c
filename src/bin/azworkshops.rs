use clap::Parser;
use std::io::IsTerminal;

use azworkshops::cli::{commands, Cli, Commands};
use azworkshops::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    if !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Init(args) => commands::execute_init(args)?,
        Commands::Create(args) => commands::execute_create(args).await?,
        Commands::Plan(args) => commands::execute_plan(args)?,
        Commands::Status(args) => commands::execute_status(args).await?,
        Commands::Destroy(args) => commands::execute_destroy(args).await?,
    }

    Ok(())
}
