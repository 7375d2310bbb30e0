use teller::amount::Amount;
use teller::error::Result;
use teller::fmt::money;
use teller::ledger::append_transactions;
use teller::session::{delete_session, load_batch};

use super::SourceArgs;

pub fn run(source: &SourceArgs) -> Result<()> {
    let ledger = source.ledger_path()?;
    let batch_path = source.batch_path();
    let batch = load_batch(&batch_path)?;

    if batch.is_empty() {
        println!("Nothing to commit.");
        return Ok(());
    }

    let ambiguous = batch.iter().filter(|tx| tx.elided_count() > 1).count();
    if ambiguous > 0 {
        println!("Warning: {ambiguous} transaction(s) have more than one posting without an amount.");
    }

    append_transactions(&ledger, &batch)?;
    delete_session(&batch_path)?;
    for tx in &batch {
        let debits: Vec<Amount> = tx
            .resolved_amounts()
            .into_iter()
            .flatten()
            .filter(|a| !a.is_negative())
            .collect();
        let total = Amount::checked_sum(&debits).map_or_else(|| "overflow".to_string(), money);
        println!("  {}  {:<30} {:>12}", tx.date.format("%Y-%m-%d"), tx.payee, total);
    }
    println!("Committed {} transaction(s) to {}", batch.len(), ledger.display());
    Ok(())
}
