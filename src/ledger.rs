use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::fmt::tab_to_column;
use crate::models::Transaction;

const AMOUNT_COLUMN: usize = 44;
const COMMENT_COLUMN: usize = 56;

/// Render a transaction in ledger format: tab-indented postings, amounts
/// decimal-aligned at column 44 and posting comments at column 56.
pub fn format_transaction(tx: &Transaction) -> String {
    let date = tx.date.format("%Y/%m/%d");
    let mut header = if tx.cleared {
        format!("{date} * {}", tx.payee)
    } else {
        format!("{date}   {}", tx.payee)
    };
    if let Some(comment) = tx.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        tab_to_column(&mut header, AMOUNT_COLUMN);
        header.push_str(&format!("; {comment}"));
    }

    let mut out = header;
    out.push('\n');

    let amounts = aligned_amounts(tx);
    for (posting, amount) in tx.postings.iter().zip(amounts) {
        let mut line = format!("\t{}", posting.account);
        if let Some(amount) = amount {
            tab_to_column(&mut line, AMOUNT_COLUMN);
            line.push_str(&amount);
        }
        if let Some(comment) = posting.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            tab_to_column(&mut line, COMMENT_COLUMN);
            line.push_str(&format!("; {comment}"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// `$ ` followed by the amount, left-padded so the decimal points line up.
fn aligned_amounts(tx: &Transaction) -> Vec<Option<String>> {
    let rendered: Vec<Option<String>> = tx
        .postings
        .iter()
        .map(|p| p.amount.map(|a| a.to_string()))
        .collect();
    let width = rendered
        .iter()
        .flatten()
        .map(|s| s.split('.').next().unwrap_or(s).len())
        .max()
        .unwrap_or(0);
    rendered
        .into_iter()
        .map(|r| {
            r.map(|s| {
                let int_width = s.split('.').next().unwrap_or(&s).len();
                format!("$ {}{s}", " ".repeat(width - int_width))
            })
        })
        .collect()
}

/// Append transactions to a ledger file, each preceded by a blank line.
pub fn append_transactions(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut buf = String::new();
    for tx in transactions {
        buf.push('\n');
        buf.push_str(&format_transaction(tx));
    }
    file.write_all(buf.as_bytes())?;
    info!(path = %path.display(), count = transactions.len(), "appended transactions");
    Ok(())
}
