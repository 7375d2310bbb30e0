mod cli;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose; default is warnings only.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    let result = match cli.command {
        Commands::Check { ledger } => cli::check::run(ledger.as_deref()),
        Commands::Payees { prefix, source } => cli::suggest::payees(&prefix, &source),
        Commands::Accounts { prefix, source } => cli::suggest::accounts(&prefix, &source),
        Commands::Templates { payee, source } => cli::suggest::templates(&payee, &source),
        Commands::Commit { source } => cli::commit::run(&source),
        Commands::Config { ledger, session } => cli::config::run(ledger.as_deref(), session.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
