pub mod check;
pub mod commit;
pub mod config;
pub mod suggest;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use teller::error::Result;
use teller::index::BuildReport;
use teller::intelligence::Intelligence;
use teller::models::Transaction;
use teller::parser::{parse_file, ParseResult};
use teller::session::load_batch;
use teller::settings::{expand_home, load_settings, resolve_ledger};
use tracing::warn;

#[derive(Parser)]
#[command(name = "teller", about = "Ledger transaction entry with payee, account and template suggestions.")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where suggestions come from: the ledger file and the in-progress batch.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// Ledger file (default: configured ledger)
    #[arg(long)]
    pub ledger: Option<String>,
    /// Session batch file (default: configured session file)
    #[arg(long)]
    pub batch: Option<String>,
}

impl SourceArgs {
    pub fn ledger_path(&self) -> Result<PathBuf> {
        resolve_ledger(self.ledger.as_deref())
    }

    pub fn batch_path(&self) -> PathBuf {
        let path = self
            .batch
            .clone()
            .unwrap_or_else(|| load_settings().session_file);
        expand_home(&path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a ledger, build the index and report any issues.
    Check {
        /// Ledger file (default: configured ledger)
        ledger: Option<String>,
    },
    /// List payees starting with a prefix.
    Payees {
        /// Case-insensitive prefix
        #[arg(default_value = "")]
        prefix: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List accounts starting with a prefix.
    Accounts {
        /// Case-insensitive prefix
        #[arg(default_value = "")]
        prefix: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show ranked posting templates for a payee.
    Templates {
        /// Exact payee name
        payee: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Append the session batch to the ledger and clear the session.
    Commit {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show or change the default ledger and session files.
    Config {
        /// Default ledger file
        #[arg(long)]
        ledger: Option<String>,
        /// Default session batch file
        #[arg(long)]
        session: Option<String>,
    },
}

pub(crate) fn load_ledger(path: &std::path::Path) -> Result<(ParseResult, Intelligence, BuildReport)> {
    let parsed = parse_file(path)?;
    let (intel, report) = Intelligence::load(&parsed.transactions);
    let issues = parsed.issues.len() + report.issues.len();
    if issues > 0 {
        warn!(path = %path.display(), issues, "ledger loaded with issues; run `teller check` for details");
    }
    Ok((parsed, intel, report))
}

/// Ledger index plus runtime index over the session batch.
pub(crate) fn load_intelligence(source: &SourceArgs) -> Result<Intelligence> {
    let (_, mut intel, _) = load_ledger(&source.ledger_path()?)?;
    let batch: Vec<Transaction> = load_batch(&source.batch_path())?;
    intel.rebuild_from_batch(&batch);
    Ok(intel)
}
